//! Terminal rendering of pipeline status events.
//!
//! Everything goes to stderr: stdout may be carrying WAV data.

use crate::audio::SampleFormat;
use crate::pipeline::{StatusEvent, StatusReporter};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Plain-text line for an event.
pub fn render_event(event: &StatusEvent) -> String {
    match event {
        StatusEvent::StreamOpened { descriptor } => {
            let format = match descriptor.sample_format {
                SampleFormat::Int => "int",
                SampleFormat::Float => "float",
            };
            format!(
                "Input: {} Hz, {} channel{}, {}-bit {}",
                descriptor.sample_rate,
                descriptor.channels,
                if descriptor.channels == 1 { "" } else { "s" },
                descriptor.bits_per_sample,
                format
            )
        }
        StatusEvent::TempoDetected { bpm } => format!("Detected BPM rate {:.1}", bpm),
        StatusEvent::TempoUndetermined => {
            "Couldn't detect BPM rate; tempo left unchanged".to_string()
        }
        StatusEvent::TempoAdjusted {
            detected_bpm,
            goal_bpm,
            tempo_delta_percent,
        } => format!(
            "Tempo {:+.2}% to go from {:.1} to {:.1} BPM",
            tempo_delta_percent, detected_bpm, goal_bpm
        ),
        StatusEvent::Configured {
            adjustments,
            settings,
        } => {
            let mut line = format!(
                "Tempo change {:+.2}%, pitch change {:+.2} semitones, rate change {:+.2}%",
                adjustments.tempo_delta_percent,
                adjustments.pitch_semitones,
                adjustments.rate_delta_percent
            );
            if settings.quick_seek {
                line.push_str(", quick seek");
            }
            if !settings.anti_alias {
                line.push_str(", no anti-alias");
            }
            if let Some(timing) = settings.timing {
                line.push_str(&format!(
                    ", sequence {} ms / seek {} ms / overlap {} ms",
                    timing.sequence_ms, timing.seek_window_ms, timing.overlap_ms
                ));
            }
            line
        }
        StatusEvent::NoOutput => {
            "No output file given: processing without writing anything".to_string()
        }
        StatusEvent::StateChanged { from, to } => format!("[pipeline] {} -> {}", from, to),
        StatusEvent::Finished {
            frames_read,
            frames_output,
        } => format!(
            "[pipeline] {} frames in, {} frames out",
            frames_read, frames_output
        ),
    }
}

/// True when stderr is a terminal and may carry colour.
pub fn stderr_color() -> bool {
    std::io::stderr().is_terminal()
}

/// Top-level error message, red when `color` is set.
pub fn error_line(message: &str, color: bool) -> String {
    let line = format!("Error: {}", message);
    if color { line.red().to_string() } else { line }
}

/// Secondary note, dimmed when `color` is set.
pub fn note_line(message: &str, color: bool) -> String {
    if color {
        message.dimmed().to_string()
    } else {
        message.to_string()
    }
}

/// Writes events to stderr, filtered by quiet mode and verbosity.
#[derive(Debug, Clone, Copy)]
pub struct StderrReporter {
    quiet: bool,
    verbosity: u8,
    color: bool,
}

impl StderrReporter {
    /// Colour is used only when stderr is a terminal.
    pub fn new(quiet: bool, verbosity: u8) -> Self {
        Self {
            quiet,
            verbosity,
            color: stderr_color(),
        }
    }

    /// Whether `event` would be printed.
    pub fn shows(&self, event: &StatusEvent) -> bool {
        !self.quiet && event.verbosity() <= self.verbosity
    }

    fn format(&self, event: &StatusEvent) -> String {
        let line = render_event(event);
        if !self.color {
            return line;
        }
        if event.is_warning() {
            line.yellow().to_string()
        } else if event.verbosity() >= 2 {
            line.dimmed().to_string()
        } else if matches!(event, StatusEvent::TempoDetected { .. }) {
            line.green().to_string()
        } else {
            line
        }
    }
}

impl StatusReporter for StderrReporter {
    fn report(&self, event: &StatusEvent) {
        if self.shows(event) {
            eprintln!("{}", self.format(event));
        }
    }
}
