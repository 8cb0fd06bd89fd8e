//! Adjustment parameters and engine settings.

use crate::defaults;
use crate::error::{Result, WavstretchError};
use serde::{Deserialize, Serialize};

/// Caller-facing tempo / pitch / rate changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjustmentParameters {
    /// Tempo change in percent; +10 plays 10% faster at the same pitch.
    pub tempo_delta_percent: f32,
    /// Pitch change in semitones at the same tempo.
    pub pitch_semitones: f32,
    /// Playback rate change in percent; changes tempo and pitch together.
    pub rate_delta_percent: f32,
}

impl AdjustmentParameters {
    pub fn validate(&self) -> Result<()> {
        check_range("tempo", self.tempo_delta_percent, defaults::TEMPO_RANGE)?;
        check_range("pitch", self.pitch_semitones, defaults::PITCH_RANGE)?;
        check_range("rate", self.rate_delta_percent, defaults::RATE_RANGE)?;
        Ok(())
    }

    /// Tempo multiplier; 1.1 for +10%.
    pub fn tempo_factor(&self) -> f64 {
        1.0 + self.tempo_delta_percent as f64 / 100.0
    }

    /// Pitch multiplier; 2.0 for +12 semitones.
    pub fn pitch_factor(&self) -> f64 {
        2f64.powf(self.pitch_semitones as f64 / 12.0)
    }

    /// Playback rate multiplier.
    pub fn rate_factor(&self) -> f64 {
        1.0 + self.rate_delta_percent as f64 / 100.0
    }

    /// Compose the three changes into the engine's two processing factors.
    ///
    /// Pitch is a time-stretch by `1/p` followed by a resample by `p`, so the
    /// tempo and rate deltas multiply rather than add.
    pub fn ratios(&self) -> StretchRatios {
        let pitch = self.pitch_factor();
        StretchRatios {
            tempo: self.tempo_factor() / pitch,
            rate: pitch * self.rate_factor(),
        }
    }
}

fn check_range(key: &str, value: f32, (min, max): (f32, f32)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(WavstretchError::configuration(
            key,
            format!("{} is outside {}..={}", value, min, max),
        ));
    }
    Ok(())
}

/// The two factors the engine actually applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchRatios {
    /// Time-stretch factor; input frames consumed per output frame.
    pub tempo: f64,
    /// Resampling factor; >1 shortens the signal and raises pitch.
    pub rate: f64,
}

impl StretchRatios {
    /// Output frames produced per input frame.
    #[inline]
    pub fn output_per_input(&self) -> f64 {
        1.0 / (self.tempo * self.rate)
    }

    #[inline]
    pub fn tempo_is_unity(&self) -> bool {
        (self.tempo - 1.0).abs() < 1e-9
    }

    #[inline]
    pub fn rate_is_unity(&self) -> bool {
        (self.rate - 1.0).abs() < 1e-9
    }
}

/// WSOLA segment timing in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTiming {
    /// Length of each processed sequence.
    pub sequence_ms: u32,
    /// Range searched for the best overlap position.
    pub seek_window_ms: u32,
    /// Cross-fade length between sequences.
    pub overlap_ms: u32,
}

impl SegmentTiming {
    /// Shorter segments that keep speech intelligible.
    pub const SPEECH: Self = Self {
        sequence_ms: defaults::SPEECH_SEQUENCE_MS,
        seek_window_ms: defaults::SPEECH_SEEK_WINDOW_MS,
        overlap_ms: defaults::SPEECH_OVERLAP_MS,
    };

    pub fn validate(&self) -> Result<()> {
        if self.overlap_ms == 0 {
            return Err(WavstretchError::configuration("overlap_ms", "must be positive"));
        }
        if self.seek_window_ms == 0 {
            return Err(WavstretchError::configuration(
                "seek_window_ms",
                "must be positive",
            ));
        }
        if self.sequence_ms < 2 * self.overlap_ms {
            return Err(WavstretchError::configuration(
                "sequence_ms",
                format!("must be at least twice overlap_ms ({})", self.overlap_ms),
            ));
        }
        Ok(())
    }
}

/// Quality / mode switches of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Coarse-to-fine overlap search instead of an exhaustive one.
    pub quick_seek: bool,
    /// Anti-alias low-pass filter in the rate transposer.
    pub anti_alias: bool,
    /// Fixed segment timing; `None` lets the processor pick it from the tempo.
    pub timing: Option<SegmentTiming>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            quick_seek: false,
            anti_alias: true,
            timing: None,
        }
    }
}

impl EngineSettings {
    /// Apply the speech profile's segment timing.
    pub fn with_speech_profile(mut self) -> Self {
        self.timing = Some(SegmentTiming::SPEECH);
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.timing {
            Some(timing) => timing.validate(),
            None => Ok(()),
        }
    }
}
