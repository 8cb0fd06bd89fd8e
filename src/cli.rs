//! Command-line interface for wavstretch
//!
//! Provides argument parsing using clap derive macros.

use crate::pipeline::BpmRequest;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Change the tempo, pitch and playback rate of WAV audio
#[derive(Parser, Debug)]
#[command(
    name = "wavstretch",
    version,
    about = "Change the tempo, pitch and playback rate of WAV audio",
    subcommand_negates_reqs = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input WAV file, or "stdin"
    #[arg(required = true, value_name = "INPUT")]
    pub input: Option<String>,

    /// Output WAV file, or "stdout". Omit to process without writing
    #[arg(value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: settings, -vv: pipeline states and frame counts)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Tempo change in percent (-95..5000), pitch unchanged
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true, default_value = "0")]
    pub tempo: f32,

    /// Pitch change in semitones (-60..60), tempo unchanged
    #[arg(long, value_name = "SEMITONES", allow_negative_numbers = true, default_value = "0")]
    pub pitch: f32,

    /// Playback rate change in percent (-95..5000), tempo and pitch together
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true, default_value = "0")]
    pub rate: f32,

    /// Detect the BPM first; with =GOAL, set the tempo so the output plays at GOAL BPM
    #[arg(
        long,
        value_name = "GOAL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "0",
        value_parser = parse_goal_bpm
    )]
    pub bpm: Option<f32>,

    /// Faster, lower quality overlap search
    #[arg(long)]
    pub quick: bool,

    /// Disable the anti-alias filter
    #[arg(long)]
    pub naa: bool,

    /// Segment timing tuned for speech instead of music
    #[arg(long)]
    pub speech: bool,
}

/// Parse a goal tempo. Zero means detect only.
fn parse_goal_bpm(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} is not a valid BPM", s));
    }
    Ok(value)
}

impl Cli {
    /// Tempo analysis requested by `--bpm`.
    pub fn bpm_request(&self) -> Option<BpmRequest> {
        self.bpm.map(|goal| {
            if goal > 0.0 {
                BpmRequest::Goal(goal)
            } else {
                BpmRequest::DetectOnly
            }
        })
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Dump,
    /// Print the configuration file location
    Path,
}
