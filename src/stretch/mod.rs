//! Tempo, pitch and rate transformation.
//!
//! `StretchEngine` drives a SoundTouch processor behind the push/pull
//! `TransformEngine` trait. Pitch changes are a stretch followed by a
//! resample of the inverse factor.

pub mod engine;
pub mod settings;

pub use engine::{StretchEngine, TransformEngine};
pub use settings::{AdjustmentParameters, EngineSettings, SegmentTiming, StretchRatios};
