//! Error types for wavstretch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavstretchError {
    // Stream errors
    #[error("Invalid audio stream: {message}")]
    InvalidStream { message: String },

    #[error("WAV error: {message}")]
    Wav { message: String },

    #[error("Source cannot be rewound: {message}")]
    NotRewindable { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    Configuration { key: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WavstretchError {
    pub(crate) fn invalid_stream(message: impl Into<String>) -> Self {
        Self::InvalidStream {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(key: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<hound::Error> for WavstretchError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => WavstretchError::Io(e),
            other => WavstretchError::Wav {
                message: other.to_string(),
            },
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WavstretchError>;
