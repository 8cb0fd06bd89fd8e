//! Pipeline controller: analysis, configuration, streaming and draining.

use crate::analysis::{BpmDetector, TempoEstimator};
use crate::audio::{SampleSink, SampleSource, StreamDescriptor};
use crate::error::{Result, WavstretchError};
use crate::pipeline::chunk;
use crate::pipeline::params::{BpmRequest, RunParameters};
use crate::pipeline::report::{StatusEvent, StatusReporter};
use crate::pipeline::tempo::{self, TempoOutcome};
use crate::stretch::{AdjustmentParameters, EngineSettings, StretchEngine, TransformEngine};
use std::fmt;

/// Linear lifecycle of one run. No state is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Unconfigured,
    Analyzing,
    Configuring,
    Streaming,
    Draining,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::Analyzing => "analyzing",
            Self::Configuring => "configuring",
            Self::Streaming => "streaming",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub descriptor: StreamDescriptor,
    /// Frames read during the processing pass (the analysis pass is not counted).
    pub frames_read: u64,
    /// Frames pulled from the engine, whether or not a sink received them.
    pub frames_output: u64,
    /// Frames handed to the sink; zero without a sink.
    pub frames_written: u64,
    pub tempo: TempoOutcome,
    /// Adjustments the engine was configured with, after any goal-BPM change.
    pub adjustments: AdjustmentParameters,
    pub final_state: PipelineState,
}

/// Drives one source through a transform engine into an optional sink.
///
/// Owns the engine and the chunk buffer; borrows the source and sink for
/// the duration of `run`.
pub struct Pipeline<'r, E: TransformEngine = StretchEngine> {
    engine: E,
    adjustments: AdjustmentParameters,
    settings: EngineSettings,
    bpm: Option<BpmRequest>,
    buffer_capacity: usize,
    reporter: &'r dyn StatusReporter,
    state: PipelineState,
}

impl<'r> Pipeline<'r, StretchEngine> {
    pub fn new(params: &RunParameters, reporter: &'r dyn StatusReporter) -> Self {
        Self::with_engine(StretchEngine::new(), params, reporter)
    }
}

impl<'r, E: TransformEngine> Pipeline<'r, E> {
    pub fn with_engine(engine: E, params: &RunParameters, reporter: &'r dyn StatusReporter) -> Self {
        Self {
            engine,
            adjustments: params.adjustments,
            settings: params.settings,
            bpm: params.bpm,
            buffer_capacity: params.buffer_capacity,
            reporter,
            state: PipelineState::Unconfigured,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run with the built-in BPM detector for tempo analysis.
    pub fn run(
        &mut self,
        source: &mut dyn SampleSource,
        sink: Option<&mut dyn SampleSink>,
    ) -> Result<RunSummary> {
        self.run_with_estimator(source, sink, |descriptor| {
            BpmDetector::new(descriptor.channels, descriptor.sample_rate)
        })
    }

    /// Run the whole state machine.
    ///
    /// `make_estimator` is only called when tempo analysis was requested.
    /// Any error aborts the run and leaves `state()` where it failed.
    pub fn run_with_estimator<T, F>(
        &mut self,
        source: &mut dyn SampleSource,
        mut sink: Option<&mut dyn SampleSink>,
        make_estimator: F,
    ) -> Result<RunSummary>
    where
        T: TempoEstimator,
        F: FnOnce(StreamDescriptor) -> T,
    {
        if self.state != PipelineState::Unconfigured {
            return Err(WavstretchError::configuration(
                "pipeline",
                format!("cannot run again from state {}", self.state),
            ));
        }

        let descriptor = source.descriptor();
        descriptor.validate()?;
        let channels = descriptor.channel_count();
        let read_size = chunk::read_size(self.buffer_capacity, channels)?;
        self.reporter
            .report(&StatusEvent::StreamOpened { descriptor });

        let mut adjustments = self.adjustments;
        let tempo = match self.bpm {
            Some(request) => {
                self.transition(PipelineState::Analyzing);
                let mut estimator = make_estimator(descriptor);
                let detected = tempo::analyze_tempo(source, &mut estimator, read_size)?;
                source.rewind()?;
                let outcome = tempo::resolve_outcome(
                    request,
                    detected,
                    &mut adjustments.tempo_delta_percent,
                );
                self.report_tempo(request, outcome);
                outcome
            }
            None => TempoOutcome::NotRequested,
        };

        self.transition(PipelineState::Configuring);
        self.engine
            .configure(descriptor, &adjustments, &self.settings)?;
        self.reporter.report(&StatusEvent::Configured {
            adjustments,
            settings: self.settings,
        });
        if sink.is_none() {
            self.reporter.report(&StatusEvent::NoOutput);
        }

        self.transition(PipelineState::Streaming);
        let mut buffer = vec![0.0f32; read_size];
        let max_frames = read_size / channels;
        let mut frames_read = 0u64;
        let mut frames_output = 0u64;

        while !source.is_at_end() {
            let count = source.read(&mut buffer)?;
            if count == 0 {
                break;
            }
            let frames = chunk::frames_in(count, channels)?;
            frames_read += frames as u64;
            self.engine.push(&buffer[..count], frames)?;
            frames_output += self.drain(&mut buffer, max_frames, channels, &mut sink)?;
        }

        self.transition(PipelineState::Draining);
        self.engine.flush()?;
        frames_output += self.drain(&mut buffer, max_frames, channels, &mut sink)?;

        let frames_written = match sink {
            Some(sink) => {
                sink.finalize()?;
                frames_output
            }
            None => 0,
        };

        self.transition(PipelineState::Done);
        self.reporter.report(&StatusEvent::Finished {
            frames_read,
            frames_output,
        });

        Ok(RunSummary {
            descriptor,
            frames_read,
            frames_output,
            frames_written,
            tempo,
            adjustments,
            final_state: self.state,
        })
    }

    /// Pull until the engine returns zero frames, writing each batch.
    fn drain(
        &mut self,
        buffer: &mut [f32],
        max_frames: usize,
        channels: usize,
        sink: &mut Option<&mut dyn SampleSink>,
    ) -> Result<u64> {
        let mut total = 0u64;
        loop {
            let frames = self.engine.pull(buffer, max_frames);
            if frames == 0 {
                return Ok(total);
            }
            total += frames as u64;
            if let Some(sink) = sink.as_mut() {
                sink.write(&buffer[..frames * channels])?;
            }
        }
    }

    fn report_tempo(&self, request: BpmRequest, outcome: TempoOutcome) {
        match outcome {
            TempoOutcome::Detected {
                bpm,
                tempo_delta_percent,
            } => {
                self.reporter.report(&StatusEvent::TempoDetected { bpm });
                if let (Some(goal_bpm), Some(tempo_delta_percent)) =
                    (request.goal(), tempo_delta_percent)
                {
                    self.reporter.report(&StatusEvent::TempoAdjusted {
                        detected_bpm: bpm,
                        goal_bpm,
                        tempo_delta_percent,
                    });
                }
            }
            TempoOutcome::Undetermined => self.reporter.report(&StatusEvent::TempoUndetermined),
            TempoOutcome::NotRequested => {}
        }
    }

    fn transition(&mut self, to: PipelineState) {
        debug_assert!(to > self.state, "{} -> {}", self.state, to);
        let from = self.state;
        self.state = to;
        self.reporter.report(&StatusEvent::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MemorySink, MemorySource};
    use crate::pipeline::params::InputSelector;
    use crate::pipeline::report::{CollectingReporter, NullReporter};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Configure(AdjustmentParameters),
        Push(usize),
        Pull(usize),
        Flush,
    }

    /// Engine that releases its input in small pieces and only after a delay,
    /// recording every call.
    struct ScriptedEngine {
        channels: usize,
        latency_frames: usize,
        piece_frames: usize,
        held: Vec<f32>,
        flushed: bool,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl ScriptedEngine {
        fn new(latency_frames: usize, piece_frames: usize) -> (Self, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let engine = Self {
                channels: 0,
                latency_frames,
                piece_frames,
                held: Vec::new(),
                flushed: false,
                calls: Rc::clone(&calls),
            };
            (engine, calls)
        }
    }

    impl TransformEngine for ScriptedEngine {
        fn configure(
            &mut self,
            descriptor: StreamDescriptor,
            adjustments: &AdjustmentParameters,
            _settings: &EngineSettings,
        ) -> Result<()> {
            self.channels = descriptor.channel_count();
            self.calls
                .borrow_mut()
                .push(Call::Configure(*adjustments));
            Ok(())
        }

        fn push(&mut self, samples: &[f32], frames: usize) -> Result<()> {
            assert_eq!(samples.len(), frames * self.channels);
            self.held.extend_from_slice(samples);
            self.calls.borrow_mut().push(Call::Push(frames));
            Ok(())
        }

        fn pull(&mut self, out: &mut [f32], max_frames: usize) -> usize {
            let held_frames = self.held.len() / self.channels;
            let ready = if self.flushed {
                held_frames
            } else {
                held_frames.saturating_sub(self.latency_frames)
            };
            let frames = ready.min(self.piece_frames).min(max_frames);
            let samples = frames * self.channels;
            out[..samples].copy_from_slice(&self.held[..samples]);
            self.held.drain(..samples);
            self.calls.borrow_mut().push(Call::Pull(frames));
            frames
        }

        fn flush(&mut self) -> Result<()> {
            self.flushed = true;
            self.calls.borrow_mut().push(Call::Flush);
            Ok(())
        }
    }

    struct FixedEstimator(f32);

    impl TempoEstimator for FixedEstimator {
        fn input_samples(&mut self, _samples: &[f32], _frames: usize) {}

        fn bpm(&mut self) -> f32 {
            self.0
        }
    }

    fn ramp_source(channels: u16, frames: usize) -> MemorySource {
        let samples = (0..frames * channels as usize)
            .map(|i| (i % 1000) as f32 / 1000.0)
            .collect();
        MemorySource::new(StreamDescriptor::pcm16(channels, 44100), samples)
    }

    fn params() -> RunParameters {
        RunParameters::new(InputSelector::Stdin, None)
    }

    #[test]
    fn test_identity_run_copies_every_frame() {
        let mut source = ramp_source(2, 20_000);
        let expected = source.samples().to_vec();
        let mut sink = MemorySink::new(source.descriptor());

        let mut pipeline = Pipeline::new(&params(), &NullReporter);
        let summary = pipeline.run(&mut source, Some(&mut sink)).unwrap();

        assert_eq!(sink.samples(), expected.as_slice());
        assert!(sink.is_finalized());
        assert_eq!(summary.frames_read, 20_000);
        assert_eq!(summary.frames_written, 20_000);
        assert_eq!(summary.final_state, PipelineState::Done);
        assert_eq!(summary.tempo, TempoOutcome::NotRequested);
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[test]
    fn test_pulls_until_zero_after_every_push_and_flush() {
        let (engine, calls) = ScriptedEngine::new(500, 700);
        let mut source = ramp_source(2, 12_345);
        let mut sink = MemorySink::new(source.descriptor());

        let mut pipeline = Pipeline::with_engine(engine, &params(), &NullReporter);
        let summary = pipeline.run(&mut source, Some(&mut sink)).unwrap();

        let calls = calls.borrow();
        // Every push and the flush are followed by pulls ending in a zero pull
        for (i, call) in calls.iter().enumerate() {
            if matches!(call, Call::Push(_) | Call::Flush) {
                let next_zero = calls[i + 1..]
                    .iter()
                    .position(|c| *c == Call::Pull(0))
                    .map(|p| p + i + 1);
                let next_other = calls[i + 1..]
                    .iter()
                    .position(|c| !matches!(c, Call::Pull(_)))
                    .map(|p| p + i + 1);
                match (next_zero, next_other) {
                    (Some(zero), Some(other)) => assert!(zero < other),
                    (Some(_), None) => {}
                    _ => panic!("call {} not drained to zero", i),
                }
            }
        }
        assert_eq!(calls.last(), Some(&Call::Pull(0)));
        assert_eq!(summary.frames_written, 12_345);
        assert_eq!(sink.samples(), source.samples());
    }

    #[test]
    fn test_chunks_are_frame_aligned_for_odd_channel_counts() {
        let (engine, calls) = ScriptedEngine::new(0, usize::MAX);
        let mut source = ramp_source(3, 5_000);
        let mut pipeline = Pipeline::with_engine(engine, &params(), &NullReporter);
        pipeline.run(&mut source, None).unwrap();

        let pushes: Vec<usize> = calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Push(frames) => Some(*frames),
                _ => None,
            })
            .collect();
        // 6720 / 3 = 2240 frames per full chunk
        assert_eq!(pushes, vec![2240, 2240, 520]);
    }

    #[test]
    fn test_missing_sink_still_reaches_done() {
        let mut source = ramp_source(2, 8_000);
        let reporter = CollectingReporter::new();
        let mut pipeline = Pipeline::new(&params(), &reporter);

        let summary = pipeline.run(&mut source, None).unwrap();

        assert_eq!(summary.final_state, PipelineState::Done);
        assert_eq!(summary.frames_written, 0);
        assert_eq!(summary.frames_output, 8_000);
        assert!(reporter.contains(|e| *e == StatusEvent::NoOutput));
    }

    #[test]
    fn test_goal_bpm_sets_tempo_before_configure() {
        let (engine, calls) = ScriptedEngine::new(0, usize::MAX);
        let mut run = params();
        run.adjustments.tempo_delta_percent = 3.0;
        run.bpm = Some(BpmRequest::Goal(140.0));
        let mut source = ramp_source(2, 4_000);

        let mut pipeline = Pipeline::with_engine(engine, &run, &NullReporter);
        let summary = pipeline
            .run_with_estimator(&mut source, None, |_| FixedEstimator(120.0))
            .unwrap();

        let calls = calls.borrow();
        let Call::Configure(configured) = &calls[0] else {
            panic!("first call was {:?}", calls[0]);
        };
        assert!((configured.tempo_delta_percent - 16.666_667).abs() < 1e-3);
        assert_eq!(summary.adjustments, *configured);
        assert_eq!(summary.tempo.bpm(), Some(120.0));
        // Source was rewound: the processing pass saw every frame
        assert_eq!(summary.frames_read, 4_000);
    }

    #[test]
    fn test_undetermined_tempo_keeps_prior_delta_and_reports() {
        let (engine, calls) = ScriptedEngine::new(0, usize::MAX);
        let mut run = params();
        run.adjustments.tempo_delta_percent = 3.0;
        run.bpm = Some(BpmRequest::Goal(140.0));
        let reporter = CollectingReporter::new();
        let mut source = ramp_source(1, 1_000);

        let mut pipeline = Pipeline::with_engine(engine, &run, &reporter);
        let summary = pipeline
            .run_with_estimator(&mut source, None, |_| FixedEstimator(0.0))
            .unwrap();

        assert!(summary.tempo.is_undetermined());
        assert_eq!(summary.adjustments.tempo_delta_percent, 3.0);
        assert_eq!(
            calls.borrow()[0],
            Call::Configure(AdjustmentParameters {
                tempo_delta_percent: 3.0,
                ..Default::default()
            })
        );
        assert!(reporter.contains(|e| *e == StatusEvent::TempoUndetermined));
        assert_eq!(summary.final_state, PipelineState::Done);
    }

    #[test]
    fn test_without_analysis_source_is_read_once() {
        let mut source = ramp_source(2, 6_720);
        let mut pipeline = Pipeline::new(&params(), &NullReporter);
        pipeline.run(&mut source, None).unwrap();
        // 13440 samples in 6720-sample chunks
        assert_eq!(source.read_count(), 2);
    }

    #[test]
    fn test_analysis_reads_source_twice() {
        let mut source = ramp_source(2, 6_720);
        let mut run = params();
        run.bpm = Some(BpmRequest::DetectOnly);
        let mut pipeline = Pipeline::new(&run, &NullReporter);
        pipeline
            .run_with_estimator(&mut source, None, |_| FixedEstimator(100.0))
            .unwrap();
        assert_eq!(source.read_count(), 4);
    }

    #[test]
    fn test_state_transitions_are_linear() {
        let mut source = ramp_source(1, 100);
        let mut run = params();
        run.bpm = Some(BpmRequest::DetectOnly);
        let reporter = CollectingReporter::new();
        let mut pipeline = Pipeline::new(&run, &reporter);
        pipeline
            .run_with_estimator(&mut source, None, |_| FixedEstimator(0.0))
            .unwrap();

        let states: Vec<PipelineState> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::StateChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                PipelineState::Analyzing,
                PipelineState::Configuring,
                PipelineState::Streaming,
                PipelineState::Draining,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_second_run_is_rejected() {
        let mut source = ramp_source(1, 100);
        let mut pipeline = Pipeline::new(&params(), &NullReporter);
        pipeline.run(&mut source, None).unwrap();
        source.rewind().unwrap();
        assert!(pipeline.run(&mut source, None).is_err());
    }

    #[test]
    fn test_invalid_stream_aborts_before_configure() {
        let (engine, calls) = ScriptedEngine::new(0, 1);
        let mut source = MemorySource::new(StreamDescriptor::pcm16(0, 44100), Vec::new());
        let mut pipeline = Pipeline::with_engine(engine, &params(), &NullReporter);
        let err = pipeline.run(&mut source, None).unwrap_err();
        assert!(matches!(err, WavstretchError::InvalidStream { .. }));
        assert!(calls.borrow().is_empty());
        assert_eq!(pipeline.state(), PipelineState::Unconfigured);
    }

    #[test]
    fn test_configuration_error_stops_before_streaming() {
        let mut run = params();
        run.adjustments.pitch_semitones = 99.0;
        let mut source = ramp_source(2, 100);
        let mut pipeline = Pipeline::new(&run, &NullReporter);
        let err = pipeline.run(&mut source, None).unwrap_err();
        assert!(matches!(err, WavstretchError::Configuration { .. }));
        assert_eq!(pipeline.state(), PipelineState::Configuring);
        assert_eq!(source.read_count(), 0);
    }

    #[test]
    fn test_tempo_change_through_real_engine() {
        let mut run = params();
        run.adjustments.tempo_delta_percent = 10.0;
        let mut source = ramp_source(2, 44_100);
        let mut sink = MemorySink::new(source.descriptor());
        let mut pipeline = Pipeline::new(&run, &NullReporter);
        let summary = pipeline.run(&mut source, Some(&mut sink)).unwrap();
        assert_eq!(summary.frames_written, 40_091);
        assert_eq!(sink.frames(), 40_091);
    }
}
