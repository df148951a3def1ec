//! Logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (CR_LOG, CR_LOG_FORMAT, CR_LOG_TIMESTAMPS, RUST_LOG)
//! - CLI flags (--log-level, --log-format, -v, -q)

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "CR_LOG";
/// Environment variable holding the log format.
pub const ENV_LOG_FORMAT: &str = "CR_LOG_FORMAT";
/// Set to `0` to drop timestamps from human output.
pub const ENV_LOG_TIMESTAMPS: &str = "CR_LOG_TIMESTAMPS";

/// Log output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log level filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Completely silent.
    Off,
}

impl LogLevel {
    const NAMED: [(LogLevel, &'static str, LevelFilter); 6] = [
        (LogLevel::Trace, "trace", LevelFilter::TRACE),
        (LogLevel::Debug, "debug", LevelFilter::DEBUG),
        (LogLevel::Info, "info", LevelFilter::INFO),
        (LogLevel::Warn, "warn", LevelFilter::WARN),
        (LogLevel::Error, "error", LevelFilter::ERROR),
        (LogLevel::Off, "off", LevelFilter::OFF),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(level, _, _)| *level == self)
            .map_or("info", |(_, name, _)| name)
    }

    /// Most verbose level mentioned in a `RUST_LOG` directive string.
    ///
    /// Module targets are ignored; `cr_core=debug,hyper=warn` yields `Debug`.
    fn from_directives(directives: &str) -> Option<Self> {
        directives
            .split(',')
            .filter_map(|d| d.rsplit('=').next())
            .filter_map(|d| d.trim().parse::<LogLevel>().ok())
            .min_by_key(|level| *level as u8)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let canonical = match lowered.as_str() {
            "warning" => "warn",
            "none" | "quiet" => "off",
            other => other,
        };
        Self::NAMED
            .iter()
            .find(|(_, name, _)| *name == canonical)
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("unknown log level: {s}"))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        LogLevel::NAMED
            .iter()
            .find(|(l, _, _)| *l == level)
            .map_or(LevelFilter::INFO, |(_, _, filter)| *filter)
    }
}

/// Resolved logging settings for one `cr-core` invocation.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output lines with a timestamp. Off with `CR_LOG_TIMESTAMPS=0`.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, then apply CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Same as [`LogConfig::from_env`] with an injectable variable lookup.
    ///
    /// Precedence, lowest first: defaults, `RUST_LOG`, `CR_LOG` / `CR_LOG_FORMAT`, CLI.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let env_level = lookup(ENV_LOG_LEVEL)
            .and_then(|v| v.parse::<LogLevel>().ok())
            .or_else(|| lookup("RUST_LOG").and_then(|v| LogLevel::from_directives(&v)));
        let env_format = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse::<LogFormat>().ok());
        let timestamps = lookup(ENV_LOG_TIMESTAMPS)
            .map_or(true, |v| !matches!(v.trim(), "0" | "false" | "no" | "off"));

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
            timestamps,
        }
    }
}
