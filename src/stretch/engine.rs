//! Push/pull transform engine backed by SoundTouch.

use crate::audio::StreamDescriptor;
use crate::defaults;
use crate::error::{Result, WavstretchError};
use crate::stretch::settings::{AdjustmentParameters, EngineSettings, StretchRatios};
use soundtouch::{Setting, SoundTouch};

/// Stateful block transformer with variable latency.
///
/// Input and output counts are decoupled: a push may make zero or many
/// frames available, so callers pull until a pull returns zero. After the
/// last push, `flush` releases everything still held internally.
pub trait TransformEngine {
    /// One-time setup before the first push.
    fn configure(
        &mut self,
        descriptor: StreamDescriptor,
        adjustments: &AdjustmentParameters,
        settings: &EngineSettings,
    ) -> Result<()>;

    /// Feed `frames` frames of interleaved samples.
    fn push(&mut self, samples: &[f32], frames: usize) -> Result<()>;

    /// Copy up to `max_frames` ready frames into `out`.
    ///
    /// # Returns
    /// Frames copied; zero means nothing is ready right now.
    fn pull(&mut self, out: &mut [f32], max_frames: usize) -> usize;

    /// Signal end of input.
    fn flush(&mut self) -> Result<()>;
}

enum Backend {
    /// Unadjusted stream; samples wait here until pulled.
    Passthrough(Vec<f32>),
    Processor(SoundTouch),
}

struct Session {
    channels: usize,
    ratios: StretchRatios,
    backend: Backend,
    frames_in: u64,
    frames_out: u64,
    flushed: bool,
}

impl Session {
    fn expected_output_frames(&self) -> u64 {
        (self.frames_in as f64 * self.ratios.output_per_input()).round() as u64
    }

    fn pull(&mut self, out: &mut [f32], max_frames: usize) -> usize {
        let channels = self.channels;
        let max_frames = max_frames.min(out.len() / channels);
        let expected = self.expected_output_frames();
        let frames = match &mut self.backend {
            Backend::Passthrough(pending) => {
                let frames = max_frames.min(pending.len() / channels);
                let len = frames * channels;
                out[..len].copy_from_slice(&pending[..len]);
                pending.drain(..len);
                frames
            }
            Backend::Processor(processor) => {
                // After flush the stream is cut or padded to its nominal length.
                let limit = if self.flushed {
                    max_frames.min(expected.saturating_sub(self.frames_out) as usize)
                } else {
                    max_frames
                };
                if limit == 0 {
                    return 0;
                }
                let received = processor.receive_samples(out, limit);
                if received == 0 && self.flushed {
                    out[..limit * channels].fill(0.0);
                    limit
                } else {
                    received
                }
            }
        };
        self.frames_out += frames as u64;
        frames
    }
}

/// SoundTouch time-stretcher and rate transposer.
///
/// With every factor at exactly one the processor is skipped, so an
/// unadjusted engine passes samples through unchanged.
#[derive(Default)]
pub struct StretchEngine {
    session: Option<Session>,
}

impl StretchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factors in effect, once configured.
    pub fn ratios(&self) -> Option<StretchRatios> {
        self.session.as_ref().map(|session| session.ratios)
    }

    /// True when configured without any adjustment.
    pub fn is_passthrough(&self) -> bool {
        matches!(
            self.session.as_ref().map(|session| &session.backend),
            Some(Backend::Passthrough(_))
        )
    }

    /// Frames accepted so far.
    pub fn frames_pushed(&self) -> u64 {
        self.session.as_ref().map_or(0, |session| session.frames_in)
    }

    fn processor(
        descriptor: StreamDescriptor,
        adjustments: &AdjustmentParameters,
        settings: &EngineSettings,
    ) -> SoundTouch {
        let mut processor = SoundTouch::new();
        processor.set_sample_rate(descriptor.sample_rate);
        processor.set_channels(u32::from(descriptor.channels));
        processor.set_tempo(adjustments.tempo_factor());
        processor.set_pitch(adjustments.pitch_factor());
        processor.set_rate(adjustments.rate_factor());

        processor.set_setting(Setting::UseQuickseek, u8::from(settings.quick_seek).into());
        processor.set_setting(Setting::UseAaFilter, u8::from(settings.anti_alias).into());
        if let Some(timing) = settings.timing {
            processor.set_setting(Setting::SequenceMs, timing.sequence_ms as _);
            processor.set_setting(Setting::SeekwindowMs, timing.seek_window_ms as _);
            processor.set_setting(Setting::OverlapMs, timing.overlap_ms as _);
        }
        processor
    }
}

impl TransformEngine for StretchEngine {
    fn configure(
        &mut self,
        descriptor: StreamDescriptor,
        adjustments: &AdjustmentParameters,
        settings: &EngineSettings,
    ) -> Result<()> {
        if self.session.is_some() {
            return Err(WavstretchError::configuration(
                "engine",
                "already configured",
            ));
        }
        descriptor.validate()?;
        if descriptor.channels > defaults::MAX_CHANNELS {
            return Err(WavstretchError::invalid_stream(format!(
                "{} channels exceeds the supported maximum of {}",
                descriptor.channels,
                defaults::MAX_CHANNELS
            )));
        }
        adjustments.validate()?;
        settings.validate()?;

        let ratios = adjustments.ratios();
        let backend = if ratios.tempo_is_unity() && ratios.rate_is_unity() {
            Backend::Passthrough(Vec::new())
        } else {
            Backend::Processor(Self::processor(descriptor, adjustments, settings))
        };
        self.session = Some(Session {
            channels: descriptor.channel_count(),
            ratios,
            backend,
            frames_in: 0,
            frames_out: 0,
            flushed: false,
        });
        Ok(())
    }

    fn push(&mut self, samples: &[f32], frames: usize) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(WavstretchError::configuration(
                "engine",
                "samples pushed before configure",
            ));
        };
        if session.flushed {
            return Err(WavstretchError::configuration(
                "engine",
                "samples pushed after flush",
            ));
        }
        let len = frames * session.channels;
        if len > samples.len() {
            return Err(WavstretchError::invalid_stream(format!(
                "{} frames requested but only {} samples supplied",
                frames,
                samples.len()
            )));
        }
        if frames == 0 {
            return Ok(());
        }

        session.frames_in += frames as u64;
        match &mut session.backend {
            Backend::Passthrough(pending) => pending.extend_from_slice(&samples[..len]),
            Backend::Processor(processor) => processor.put_samples(&samples[..len], frames),
        }
        Ok(())
    }

    fn pull(&mut self, out: &mut [f32], max_frames: usize) -> usize {
        match self.session.as_mut() {
            Some(session) => session.pull(out, max_frames),
            None => 0,
        }
    }

    fn flush(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(WavstretchError::configuration(
                "engine",
                "flush before configure",
            ));
        };
        if !session.flushed {
            if let Backend::Processor(processor) = &mut session.backend
                && session.frames_in > 0
            {
                processor.flush();
            }
            session.flushed = true;
        }
        Ok(())
    }
}
