//! Chunk-sizing policy.

use crate::error::{Result, WavstretchError};

/// Largest multiple of `channels` that fits in `capacity` samples.
///
/// Every read of this size holds whole frames, whatever the channel count.
pub fn read_size(capacity: usize, channels: usize) -> Result<usize> {
    if channels == 0 {
        return Err(WavstretchError::invalid_stream("channel count is zero"));
    }
    if channels > capacity {
        return Err(WavstretchError::invalid_stream(format!(
            "{} channels do not fit in a {}-sample buffer",
            channels, capacity
        )));
    }
    Ok(capacity - capacity % channels)
}

/// Frames in `samples` interleaved samples. Fails if a frame is split.
pub fn frames_in(samples: usize, channels: usize) -> Result<usize> {
    if channels == 0 || samples % channels != 0 {
        return Err(WavstretchError::invalid_stream(format!(
            "{} samples is not a whole number of {}-channel frames",
            samples, channels
        )));
    }
    Ok(samples / channels)
}
