//! Parameters of a single run.

use crate::defaults;
use crate::stretch::{AdjustmentParameters, EngineSettings};
use std::fmt;
use std::path::PathBuf;

/// Where samples come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelector {
    Path(PathBuf),
    Stdin,
}

impl InputSelector {
    /// `stdin` selects standard input; anything else is a path.
    pub fn parse(name: &str) -> Self {
        if name == defaults::STDIN_NAME {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(name))
        }
    }
}

impl fmt::Display for InputSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str(defaults::STDIN_NAME),
        }
    }
}

/// Where transformed samples go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSelector {
    Path(PathBuf),
    Stdout,
}

impl OutputSelector {
    /// `stdout` selects standard output; anything else is a path.
    pub fn parse(name: &str) -> Self {
        if name == defaults::STDOUT_NAME {
            Self::Stdout
        } else {
            Self::Path(PathBuf::from(name))
        }
    }
}

impl fmt::Display for OutputSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Stdout => f.write_str(defaults::STDOUT_NAME),
        }
    }
}

/// Tempo analysis requested for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BpmRequest {
    /// Report the detected tempo, leave the tempo delta alone.
    DetectOnly,
    /// Adjust the tempo delta so the output plays at this BPM.
    Goal(f32),
}

impl BpmRequest {
    pub fn goal(&self) -> Option<f32> {
        match self {
            Self::Goal(goal) if *goal > 0.0 => Some(*goal),
            _ => None,
        }
    }
}

/// Everything the controller needs to run, independent of how it was parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub input: InputSelector,
    /// `None` analyzes and processes without writing anything.
    pub output: Option<OutputSelector>,
    pub adjustments: AdjustmentParameters,
    pub bpm: Option<BpmRequest>,
    pub settings: EngineSettings,
    /// Chunk capacity in interleaved samples.
    pub buffer_capacity: usize,
}

impl RunParameters {
    pub fn new(input: InputSelector, output: Option<OutputSelector>) -> Self {
        Self {
            input,
            output,
            adjustments: AdjustmentParameters::default(),
            bpm: None,
            settings: EngineSettings::default(),
            buffer_capacity: defaults::BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_and_stdout_names_are_reserved() {
        assert_eq!(InputSelector::parse("stdin"), InputSelector::Stdin);
        assert_eq!(OutputSelector::parse("stdout"), OutputSelector::Stdout);
        assert_eq!(
            InputSelector::parse("song.wav"),
            InputSelector::Path(PathBuf::from("song.wav"))
        );
        assert_eq!(
            OutputSelector::parse("./stdin"),
            OutputSelector::Path(PathBuf::from("./stdin"))
        );
    }

    #[test]
    fn test_selectors_display_their_names() {
        assert_eq!(InputSelector::Stdin.to_string(), "stdin");
        assert_eq!(
            OutputSelector::Path(PathBuf::from("/tmp/out.wav")).to_string(),
            "/tmp/out.wav"
        );
    }

    #[test]
    fn test_goal_ignores_non_positive_values() {
        assert_eq!(BpmRequest::Goal(128.0).goal(), Some(128.0));
        assert_eq!(BpmRequest::Goal(0.0).goal(), None);
        assert_eq!(BpmRequest::DetectOnly.goal(), None);
    }

    #[test]
    fn test_new_run_uses_defaults() {
        let params = RunParameters::new(InputSelector::Stdin, None);
        assert_eq!(params.buffer_capacity, 6720);
        assert_eq!(params.adjustments, AdjustmentParameters::default());
        assert!(params.bpm.is_none());
        assert!(params.settings.anti_alias);
    }
}
