//! Streaming pipeline for tempo / pitch / rate transformation.
//!
//! A single-threaded state machine: optional tempo pre-pass and rewind,
//! one-time engine configuration, then read → push → pull-until-zero over the
//! whole source, and finally flush → pull-until-zero.

pub mod chunk;
pub mod controller;
pub mod params;
pub mod report;
pub mod tempo;

pub use chunk::{frames_in, read_size};
pub use controller::{Pipeline, PipelineState, RunSummary};
pub use params::{BpmRequest, InputSelector, OutputSelector, RunParameters};
pub use report::{CollectingReporter, NullReporter, StatusEvent, StatusReporter};
pub use tempo::{TempoOutcome, analyze_tempo, derive_tempo_delta};
