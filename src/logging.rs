//! Logging System
//!
//! Structured logging on top of `tracing`. `LoggingConfig` is plain strings so
//! it layers through the config sources; it is parsed into `LogFormat` and
//! `LogOutput` when the subscriber is installed. `CIDNAV_LOG*` environment
//! variables win over the config.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "CIDNAV_LOG";
const ENV_MODULES: &str = "CIDNAV_LOG_MODULES";
const ENV_FORMAT: &str = "CIDNAV_LOG_FORMAT";
const ENV_OUTPUT: &str = "CIDNAV_LOG_OUTPUT";
const ENV_FILE: &str = "CIDNAV_LOG_FILE";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// trace, debug, info, warn, error, off
    pub level: String,
    /// text or json
    pub format: String,
    /// stdout, stderr, file, file+stderr, both
    pub output: String,
    /// Log file when output includes a file; unset means the state dir default
    pub file: Option<PathBuf>,
    /// ANSI colours for terminal text output
    pub color: bool,
    /// Per-module levels (`cidnav::upload = "debug"`)
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "warn".to_string(),
            format: "text".to_string(),
            output: "stderr".to_string(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format: {} (expected text or json)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
    FileAndStderr,
    Both,
}

impl LogOutput {
    pub fn writes_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::Both),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (expected stdout, stderr, file, file+stderr or both)",
                other
            ))),
        }
    }
}

/// Log file path: explicit argument, then `CIDNAV_LOG_FILE`, then config, then the state dir
pub fn resolve_log_file_path(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let from_env = std::env::var(ENV_FILE).ok().map(PathBuf::from);
    let chosen = [explicit, from_env, configured]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty());
    match chosen {
        Some(path) => Ok(path),
        None => default_log_file_path(),
    }
}

fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let dirs = directories::ProjectDirs::from("", "cidnav", "cidnav").ok_or_else(|| {
        ApiError::ConfigError("No home directory to place the log file in".to_string())
    })?;
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Ok(dir.join("cidnav.log"))
}

/// Install the global subscriber
///
/// Fails when a subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    let installed = if !config.enabled {
        Registry::default().with(EnvFilter::new("off")).try_init()
    } else {
        let filter = env_filter(config)?;
        let format = env_or(ENV_FORMAT, &config.format).parse::<LogFormat>()?;
        let output = env_or(ENV_OUTPUT, &config.output).parse::<LogOutput>()?;
        let writer = make_writer(output, config)?;
        let layer = fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer);
        let registry = Registry::default().with(filter);
        match format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Text => registry
                .with(layer.with_ansi(config.color && !output.writes_file()))
                .try_init(),
        }
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn env_or(var: &str, configured: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| configured.to_string())
}

fn make_writer(output: LogOutput, config: &LoggingConfig) -> Result<BoxMakeWriter, ApiError> {
    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Both => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File => BoxMakeWriter::new(Arc::new(open_log_file(config)?)),
        LogOutput::FileAndStderr => {
            BoxMakeWriter::new(Arc::new(open_log_file(config)?).and(std::io::stderr))
        }
    };
    Ok(writer)
}

fn open_log_file(config: &LoggingConfig) -> Result<std::fs::File, ApiError> {
    let path = resolve_log_file_path(None, config.file.clone())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Cannot create log dir {}: {}", parent.display(), e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| ApiError::ConfigError(format!("Cannot open log file {}: {}", path.display(), e)))
}

/// `CIDNAV_LOG` replaces the whole filter; otherwise level plus module directives
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    let level = config.level.parse::<LevelFilter>().map_err(|_| {
        ApiError::ConfigError(format!(
            "Invalid log level: {} (expected trace, debug, info, warn, error or off)",
            config.level
        ))
    })?;
    if level == LevelFilter::OFF {
        return Ok(EnvFilter::new("off"));
    }

    let from_env = std::env::var(ENV_MODULES).unwrap_or_default();
    let env_pairs = from_env
        .split(',')
        .filter_map(|spec| spec.split_once('='))
        .map(|(module, level)| (module.trim().to_string(), level.trim().to_string()));
    let configured = config.modules.iter().map(|(m, l)| (m.clone(), l.clone()));

    let base = EnvFilter::default().add_directive(level.into());
    configured
        .chain(env_pairs)
        .try_fold(base, |filter, (module, module_level)| {
            let directive = format!("{}={}", module, module_level)
                .parse()
                .map_err(|e| ApiError::ConfigError(format!("Invalid log directive {}: {}", module, e)))?;
            Ok(filter.add_directive(directive))
        })
}
