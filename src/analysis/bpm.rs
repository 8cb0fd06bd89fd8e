//! Streaming tempo estimation.

use soundtouch::BPMDetect;

/// Whole-stream tempo estimator.
pub trait TempoEstimator {
    /// Accumulate `frames` frames of interleaved samples.
    fn input_samples(&mut self, samples: &[f32], frames: usize);

    /// Current estimate in BPM; zero or less means undetermined.
    fn bpm(&mut self) -> f32;
}

/// SoundTouch beat detector.
///
/// Decimates the signal to an energy envelope and autocorrelates it over
/// the 45-190 BPM range, so memory stays bounded however long the stream.
pub struct BpmDetector {
    channels: usize,
    inner: BPMDetect,
}

impl BpmDetector {
    pub fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels: usize::from(channels).max(1),
            inner: BPMDetect::new(u32::from(channels), sample_rate),
        }
    }
}

impl TempoEstimator for BpmDetector {
    fn input_samples(&mut self, samples: &[f32], frames: usize) {
        let frames = frames.min(samples.len() / self.channels);
        if frames > 0 {
            self.inner
                .input_samples(&samples[..frames * self.channels]);
        }
    }

    fn bpm(&mut self) -> f32 {
        self.inner.get_bpm()
    }
}
