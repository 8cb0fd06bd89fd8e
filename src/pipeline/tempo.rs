//! Tempo pre-pass and goal-BPM adjustment.

use crate::analysis::TempoEstimator;
use crate::audio::SampleSource;
use crate::error::Result;
use crate::pipeline::chunk;
use crate::pipeline::params::BpmRequest;

/// Result of the optional tempo analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TempoOutcome {
    /// Analysis was not requested; the source was read once.
    NotRequested,
    /// A tempo was found. `tempo_delta_percent` is set when a goal was given.
    Detected {
        bpm: f32,
        tempo_delta_percent: Option<f32>,
    },
    /// No confident estimate; the tempo delta was left unchanged.
    Undetermined,
}

impl TempoOutcome {
    pub fn bpm(&self) -> Option<f32> {
        match self {
            Self::Detected { bpm, .. } => Some(*bpm),
            _ => None,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::Undetermined)
    }
}

/// Feed the rest of `source` into `estimator` in chunks of `read_size`.
///
/// Leaves the source at end-of-stream; rewinding is the caller's job.
///
/// # Returns
/// The estimator's BPM; zero or less means undetermined.
pub fn analyze_tempo(
    source: &mut dyn SampleSource,
    estimator: &mut dyn TempoEstimator,
    read_size: usize,
) -> Result<f32> {
    let channels = source.descriptor().channel_count();
    let mut buffer = vec![0.0f32; read_size];

    while !source.is_at_end() {
        let count = source.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        let frames = chunk::frames_in(count, channels)?;
        estimator.input_samples(&buffer[..count], frames);
    }

    Ok(estimator.bpm())
}

/// Tempo change in percent that moves `detected_bpm` to `goal_bpm`.
///
/// `None` when either value is not positive.
pub fn derive_tempo_delta(goal_bpm: f32, detected_bpm: f32) -> Option<f32> {
    if goal_bpm > 0.0 && detected_bpm > 0.0 {
        Some((goal_bpm / detected_bpm - 1.0) * 100.0)
    } else {
        None
    }
}

/// Interpret an estimate for `request`, overwriting `tempo_delta_percent`
/// when a goal can be reached.
pub fn resolve_outcome(
    request: BpmRequest,
    detected_bpm: f32,
    tempo_delta_percent: &mut f32,
) -> TempoOutcome {
    if detected_bpm <= 0.0 {
        return TempoOutcome::Undetermined;
    }

    let delta = request
        .goal()
        .and_then(|goal| derive_tempo_delta(goal, detected_bpm));
    if let Some(delta) = delta {
        *tempo_delta_percent = delta;
    }
    TempoOutcome::Detected {
        bpm: detected_bpm,
        tempo_delta_percent: delta,
    }
}
