//! Signal analysis run before transformation.

pub mod bpm;

pub use bpm::{BpmDetector, TempoEstimator};
