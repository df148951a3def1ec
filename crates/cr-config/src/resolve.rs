//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → preset.

use std::path::{Path, PathBuf};

/// Discovered analysis file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the analysis file (None means "use a preset").
    pub analysis: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using a built-in preset.
    #[default]
    Preset,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::Preset => write!(f, "builtin preset"),
        }
    }
}

/// Environment variable naming an analysis file directly.
pub const ENV_CONFIG_PATH: &str = "CAPTURE_RECAPTURE_CONFIG";
/// Environment variable naming a directory holding `analysis.json`.
pub const ENV_CONFIG_DIR: &str = "CAPTURE_RECAPTURE_CONFIG_DIR";

/// Standard analysis file name.
pub const ANALYSIS_FILENAME: &str = "analysis.json";

/// Application name for XDG directories.
const APP_NAME: &str = "capture-recapture";

/// Resolve the analysis file path.
///
/// Resolution order:
/// 1. Explicit CLI path (returned even if missing, so the load reports it)
/// 2. `CAPTURE_RECAPTURE_CONFIG`
/// 3. `CAPTURE_RECAPTURE_CONFIG_DIR` + `analysis.json`
/// 4. XDG config directory (~/.config/capture-recapture/analysis.json)
/// 5. None: the caller falls back to a preset
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    if let Some(path) = cli_path {
        return ConfigPaths {
            analysis: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ConfigPaths {
                analysis: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(ANALYSIS_FILENAME);
        if path.exists() {
            return ConfigPaths {
                analysis: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(ANALYSIS_FILENAME);
        if path.exists() {
            return ConfigPaths {
                analysis: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    ConfigPaths::default()
}

/// Get the XDG config directory for capture-recapture.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
