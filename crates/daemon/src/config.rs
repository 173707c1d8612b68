//! Daemon configuration from environment variables
//!
//! - `BUFFERLINE_OUTPUT_PATH`: record file (default `output.txt`, `~` expanded)
//! - `BUFFERLINE_PRODUCERS` / `BUFFERLINE_CONSUMERS`: skip the interactive prompt
//! - `BUFFERLINE_LOG_FORMAT`: `pretty` (default) or `json`

use bufferline_core::domain::{parse_count, WorkerCount};
use bufferline_core::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_OUTPUT_PATH: &str = "output.txt";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "unknown log format {:?} (expected pretty or json)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub output_path: PathBuf,
    pub log_format: LogFormat,
    pub producers: Option<WorkerCount>,
    pub consumers: Option<WorkerCount>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let output_path = lookup("BUFFERLINE_OUTPUT_PATH")
            .map(|raw| shellexpand::tilde(&raw).into_owned())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let log_format = match lookup("BUFFERLINE_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            output_path: PathBuf::from(output_path),
            log_format,
            producers: count_from(&lookup, "BUFFERLINE_PRODUCERS")?,
            consumers: count_from(&lookup, "BUFFERLINE_CONSUMERS")?,
        })
    }
}

fn count_from(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<WorkerCount>> {
    lookup(key)
        .map(|raw| {
            parse_count(&raw).map_err(|e| AppError::Config(format!("{}: {}", key, e)))
        })
        .transpose()
}
