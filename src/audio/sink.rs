use crate::audio::source::StreamDescriptor;
use crate::error::Result;

/// Pluggable output for transformed audio.
/// Pairs with `SampleSource` for input.
pub trait SampleSink {
    /// Append interleaved samples. Length is always a whole number of frames.
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Called once after the last write. Flushes headers and buffers.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that collects every sample in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    descriptor: StreamDescriptor,
    samples: Vec<f32>,
    writes: usize,
    finalized: bool,
}

impl MemorySink {
    pub fn new(descriptor: StreamDescriptor) -> Self {
        Self {
            descriptor,
            samples: Vec::new(),
            writes: 0,
            finalized: false,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of complete frames collected.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.descriptor.channel_count().max(1)
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }
}

impl SampleSink for MemorySink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.writes += 1;
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}
