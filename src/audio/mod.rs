//! Sample sources and sinks.
//!
//! The pipeline only sees the `SampleSource` / `SampleSink` traits; WAV and
//! in-memory implementations live here.

pub mod sink;
pub mod source;
pub mod wav;

pub use sink::{MemorySink, SampleSink};
pub use source::{MemorySource, SampleFormat, SampleSource, StreamDescriptor};
pub use wav::{SpooledWavSink, WavSink, WavSource};
