//! Status notices emitted during a run.

use crate::audio::StreamDescriptor;
use crate::pipeline::controller::PipelineState;
use crate::stretch::{AdjustmentParameters, EngineSettings};
use std::cell::RefCell;

/// Something observable happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// The source was opened and validated.
    StreamOpened { descriptor: StreamDescriptor },
    /// The pre-pass found a tempo.
    TempoDetected { bpm: f32 },
    /// The pre-pass could not settle on a tempo; the goal was not applied.
    TempoUndetermined,
    /// The tempo delta was derived from a goal tempo.
    TempoAdjusted {
        detected_bpm: f32,
        goal_bpm: f32,
        tempo_delta_percent: f32,
    },
    /// The engine was configured with these values.
    Configured {
        adjustments: AdjustmentParameters,
        settings: EngineSettings,
    },
    /// No sink: the run processes audio but writes nothing.
    NoOutput,
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    Finished {
        frames_read: u64,
        frames_output: u64,
    },
}

impl StatusEvent {
    /// Lowest verbosity at which the event is shown (0 = default).
    pub fn verbosity(&self) -> u8 {
        match self {
            Self::TempoDetected { .. }
            | Self::TempoUndetermined
            | Self::TempoAdjusted { .. }
            | Self::NoOutput => 0,
            Self::StreamOpened { .. } | Self::Configured { .. } => 1,
            Self::StateChanged { .. } | Self::Finished { .. } => 2,
        }
    }

    /// Notices the user should see even without asking for detail.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::TempoUndetermined | Self::NoOutput)
    }
}

/// Receives status events from the pipeline.
pub trait StatusReporter {
    fn report(&self, event: &StatusEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn report(&self, _event: &StatusEvent) {}
}

/// Keeps every event, for tests and callers that render afterwards.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: RefCell<Vec<StatusEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.borrow().clone()
    }

    pub fn contains(&self, predicate: impl Fn(&StatusEvent) -> bool) -> bool {
        self.events.borrow().iter().any(predicate)
    }
}

impl StatusReporter for CollectingReporter {
    fn report(&self, event: &StatusEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
