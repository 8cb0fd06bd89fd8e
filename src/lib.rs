//! wavstretch - tempo, pitch and playback rate changes for WAV audio
//!
//! Streams samples through a time-stretch and resampling engine, with an
//! optional BPM detection pass that can drive the tempo change.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
#[cfg(feature = "cli")]
pub mod output;
pub mod pipeline;
pub mod stretch;

// Composition root - needs everything
#[cfg(feature = "cli")]
pub mod app;

// Core traits (source → engine → sink)
pub use analysis::{BpmDetector, TempoEstimator};
pub use audio::{SampleSink, SampleSource, StreamDescriptor};
pub use stretch::{StretchEngine, TransformEngine};

// Pipeline
pub use pipeline::{Pipeline, PipelineState, RunParameters, RunSummary, StatusReporter};

// Error handling
pub use error::{Result, WavstretchError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
