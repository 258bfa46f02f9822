// TOML config adapter - Configuration management using TOML files
//
// Precedence: CLI > environment (VEDIT_*) > file > defaults. The CLI layer is
// applied by the caller after `load`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::tracing_log::{LogFormat, LogLevel};
use crate::domain::errors::*;

/// Files searched when no config path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["vedit.toml", "config/vedit.toml"];

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// `ffmpeg` binary used by the transcode engine
    pub ffmpeg_path: PathBuf,
    pub encoder_threads: usize,
    /// Directory receiving generated `VID_*` and `TH_*` files
    pub output_dir: PathBuf,
    /// Cancel jobs that run longer than this
    pub engine_timeout_secs: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            encoder_threads: num_cpus::get(),
            output_dir: std::env::temp_dir().join("vedit"),
            engine_timeout_secs: None,
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn load_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then file, then environment, then validation
    ///
    /// An explicit `path` must exist; otherwise the default locations are
    /// tried and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::load_file(path)?
            }
            None => match DEFAULT_CONFIG_PATHS
                .iter()
                .map(Path::new)
                .find(|candidate| candidate.is_file())
            {
                Some(found) => {
                    info!(path = %found.display(), "Loading configuration");
                    Self::load_file(found)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VEDIT_*` overrides from `vars`
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "VEDIT_LOG_LEVEL" => self.log_level = LogLevel::parse(&value)?,
                "VEDIT_LOG_FORMAT" => self.log_format = LogFormat::parse(&value)?,
                "VEDIT_FFMPEG_PATH" => self.ffmpeg_path = PathBuf::from(value),
                "VEDIT_OUTPUT_DIR" => self.output_dir = PathBuf::from(value),
                "VEDIT_ENCODER_THREADS" => {
                    self.encoder_threads = value.trim().parse().map_err(|e| {
                        DomainError::Config(format!("Invalid VEDIT_ENCODER_THREADS: {}", e))
                    })?;
                }
                "VEDIT_ENGINE_TIMEOUT_SECS" => {
                    let value = value.trim();
                    self.engine_timeout_secs = if value.is_empty() || value == "0" {
                        None
                    } else {
                        Some(value.parse().map_err(|e| {
                            DomainError::Config(format!(
                                "Invalid VEDIT_ENGINE_TIMEOUT_SECS: {}",
                                e
                            ))
                        })?)
                    };
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.encoder_threads == 0 {
            return Err(DomainError::Config(
                "encoder_threads must be at least 1".to_string(),
            ));
        }
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(DomainError::Config("ffmpeg_path cannot be empty".to_string()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(DomainError::Config("output_dir cannot be empty".to_string()));
        }
        if self.engine_timeout_secs == Some(0) {
            return Err(DomainError::Config(
                "engine_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_secs.map(Duration::from_secs)
    }
}
