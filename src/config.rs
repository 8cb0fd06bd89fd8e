use crate::defaults;
use crate::error::{Result, WavstretchError};
use crate::pipeline::{InputSelector, OutputSelector};
use crate::stretch::EngineSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub paths: PathsConfig,
}

/// Engine quality switches and chunk sizing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    pub quick_seek: bool,
    pub anti_alias: bool,
    pub speech: bool,
    pub buffer_capacity: usize,
}

/// Base directories for relative file names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            quick_seek: false,
            anti_alias: true,
            speech: false,
            buffer_capacity: defaults::BUFFER_CAPACITY,
        }
    }
}

impl ProcessingConfig {
    /// Engine settings described by this section.
    pub fn engine_settings(&self) -> EngineSettings {
        let settings = EngineSettings {
            quick_seek: self.quick_seek,
            anti_alias: self.anti_alias,
            timing: None,
        };
        if self.speech {
            settings.with_speech_profile()
        } else {
            settings
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML or invalid values.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(WavstretchError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/wavstretch/config.toml on Linux, `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wavstretch").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let capacity = self.processing.buffer_capacity;
        if capacity == 0 || capacity % 2 != 0 {
            return Err(WavstretchError::configuration(
                "processing.buffer_capacity",
                format!("{} is not a positive multiple of 2", capacity),
            ));
        }
        self.processing.engine_settings().validate()
    }

    /// Render as TOML, as written to the config file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| WavstretchError::configuration("config", e.to_string()))
    }

    /// Input selector for a command-line name, relative to `paths.input_dir`.
    pub fn resolve_input(&self, name: &str) -> InputSelector {
        match InputSelector::parse(name) {
            InputSelector::Path(path) => {
                InputSelector::Path(under(self.paths.input_dir.as_deref(), path))
            }
            InputSelector::Stdin => InputSelector::Stdin,
        }
    }

    /// Output selector for a command-line name, relative to `paths.output_dir`.
    pub fn resolve_output(&self, name: &str) -> OutputSelector {
        match OutputSelector::parse(name) {
            OutputSelector::Path(path) => {
                OutputSelector::Path(under(self.paths.output_dir.as_deref(), path))
            }
            OutputSelector::Stdout => OutputSelector::Stdout,
        }
    }
}

fn under(base: Option<&Path>, path: PathBuf) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
