//! Default configuration constants for wavstretch.
//!
//! Shared by the pipeline, the engine and the configuration file so the
//! same numbers are used everywhere.

/// Processing chunk capacity in interleaved samples.
///
/// Divisible by 2, 4, 6, 8, 10, 12, 14 and 16, so every common channel
/// layout reads whole frames without trimming.
pub const BUFFER_CAPACITY: usize = 6720;

/// Speech profile: sequence length in milliseconds.
pub const SPEECH_SEQUENCE_MS: u32 = 40;

/// Speech profile: seek window length in milliseconds.
pub const SPEECH_SEEK_WINDOW_MS: u32 = 15;

/// Speech profile: overlap length in milliseconds.
pub const SPEECH_OVERLAP_MS: u32 = 8;

/// Most channels the transform engine accepts.
pub const MAX_CHANNELS: u16 = 16;

/// Allowed tempo change range in percent.
pub const TEMPO_RANGE: (f32, f32) = (-95.0, 5000.0);

/// Allowed pitch change range in semitones.
pub const PITCH_RANGE: (f32, f32) = (-60.0, 60.0);

/// Allowed rate change range in percent.
pub const RATE_RANGE: (f32, f32) = (-95.0, 5000.0);

/// Name used on the command line for standard input / output.
pub const STDIN_NAME: &str = "stdin";
pub const STDOUT_NAME: &str = "stdout";
