use crate::error::{Result, WavstretchError};

/// Sample encoding of a stream, carried through so the output matches the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Int,
    Float,
}

/// Immutable description of an opened audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
}

impl StreamDescriptor {
    /// 16-bit integer PCM descriptor.
    pub fn pcm16(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Reject descriptors the pipeline cannot process.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(WavstretchError::invalid_stream("channel count is zero"));
        }
        if self.sample_rate == 0 {
            return Err(WavstretchError::invalid_stream("sample rate is zero"));
        }
        match (self.sample_format, self.bits_per_sample) {
            (SampleFormat::Int, 8 | 16 | 24 | 32) | (SampleFormat::Float, 32) => Ok(()),
            (format, bits) => Err(WavstretchError::invalid_stream(format!(
                "unsupported sample representation: {:?} {} bit",
                format, bits
            ))),
        }
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }
}

/// Trait for sequential sample providers.
///
/// Samples are interleaved `f32` in `[-1.0, 1.0]`. Implementations must be
/// rewindable so a full analysis pass can be followed by a processing pass.
pub trait SampleSource {
    /// Format of the stream. Never changes after the source is opened.
    fn descriptor(&self) -> StreamDescriptor;

    /// True once every sample has been returned by `read`.
    fn is_at_end(&self) -> bool;

    /// Fill `buffer` with up to `buffer.len()` interleaved samples.
    ///
    /// # Returns
    /// Number of samples written. Short only on the final read.
    fn read(&mut self, buffer: &mut [f32]) -> Result<usize>;

    /// Reposition to the first sample.
    fn rewind(&mut self) -> Result<()>;
}

/// In-memory source over an interleaved sample buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    descriptor: StreamDescriptor,
    samples: Vec<f32>,
    position: usize,
    reads: usize,
}

impl MemorySource {
    pub fn new(descriptor: StreamDescriptor, samples: Vec<f32>) -> Self {
        Self {
            descriptor,
            samples,
            position: 0,
            reads: 0,
        }
    }

    /// Number of `read` calls served so far, across rewinds.
    pub fn read_count(&self) -> usize {
        self.reads
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl SampleSource for MemorySource {
    fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.samples.len()
    }

    fn read(&mut self, buffer: &mut [f32]) -> Result<usize> {
        self.reads += 1;
        let end = std::cmp::min(self.position + buffer.len(), self.samples.len());
        let count = end - self.position;
        buffer[..count].copy_from_slice(&self.samples[self.position..end]);
        self.position = end;
        Ok(count)
    }

    fn rewind(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}
