//! Configuration loading for cr-core.
//!
//! Resolution order:
//! 1. `--config PATH`
//! 2. `--preset NAME`
//! 3. `CAPTURE_RECAPTURE_CONFIG` / `CAPTURE_RECAPTURE_CONFIG_DIR`
//! 4. `$XDG_CONFIG_HOME/capture-recapture/analysis.json`
//! 5. The built-in `two-stage` preset
//!
//! Whatever the source, the loaded analysis is validated before it is
//! returned.

use std::path::{Path, PathBuf};

use cr_config::{
    get_preset, resolve_config, validate_analysis, AnalysisConfig, ConfigPaths, ConfigSnapshot,
    ConfigSource, PresetError, PresetName, ValidationError,
};
use thiserror::Error;

/// Preset used when nothing else is configured.
pub const DEFAULT_PRESET: PresetName = PresetName::TwoStage;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Preset(#[from] PresetError),
}

impl From<ConfigError> for cr_common::Error {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::Validation(ValidationError::IoError(msg)) => {
                cr_common::Error::Io(std::io::Error::other(msg.clone()))
            }
            _ => cr_common::Error::Config(err.to_string()),
        }
    }
}

/// Where to look for the analysis and what to override.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub config_path: Option<PathBuf>,
    pub preset: Option<String>,
    /// Replaces the file's coverage before validation.
    pub coverage: Option<f64>,
}

/// A validated analysis with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub analysis: AnalysisConfig,
    pub paths: ConfigPaths,
    pub preset: Option<PresetName>,
}

impl ResolvedConfig {
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(
            &self.analysis,
            &self.paths,
            self.preset.map(|p| p.as_str()),
        )
    }
}

pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let (mut analysis, paths, preset) = if let Some(path) = &options.config_path {
        let paths = ConfigPaths {
            analysis: Some(path.clone()),
            source: ConfigSource::CliArgument,
        };
        (load_file(path)?, paths, None)
    } else if let Some(name) = &options.preset {
        let preset: PresetName = name.parse()?;
        (get_preset(preset), ConfigPaths::default(), Some(preset))
    } else {
        let paths = resolve_config(None);
        match &paths.analysis {
            Some(path) => (load_file(path)?, paths.clone(), None),
            None => (get_preset(DEFAULT_PRESET), paths, Some(DEFAULT_PRESET)),
        }
    };

    if let Some(coverage) = options.coverage {
        analysis.coverage = coverage;
    }
    validate_analysis(&analysis)?;

    Ok(ResolvedConfig {
        analysis,
        paths,
        preset,
    })
}

fn load_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(AnalysisConfig::from_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_preset_is_loaded() {
        let resolved = load_config(&ConfigOptions {
            preset: Some("lp".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolved.preset, Some(PresetName::LincolnPetersen));
        assert_eq!(resolved.paths.source, ConfigSource::Preset);
        assert_eq!(
            resolved.snapshot().preset.as_deref(),
            Some("lincoln-petersen")
        );
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let err = load_config(&ConfigOptions {
            preset: Some("bogus".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Preset(_)));
        assert!(err.to_string().contains("two-stage"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&ConfigOptions {
            config_path: Some(dir.path().join("missing.json")),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert_eq!(cr_common::Error::from(err).code(), 10);
    }

    #[test]
    fn coverage_override_is_validated() {
        let err = load_config(&ConfigOptions {
            preset: Some("two-test".to_string()),
            coverage: Some(1.5),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let ok = load_config(&ConfigOptions {
            preset: Some("two-test".to_string()),
            coverage: Some(0.8),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.analysis.coverage, 0.8);
    }

    #[test]
    fn file_from_cli_is_loaded_and_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(
            &path,
            get_preset(PresetName::LincolnPetersen).to_json().unwrap(),
        )
        .unwrap();
        let resolved = load_config(&ConfigOptions {
            config_path: Some(path.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolved.paths.source, ConfigSource::CliArgument);
        assert_eq!(resolved.paths.analysis.as_deref(), Some(path.as_path()));
        assert!(resolved.snapshot().preset.is_none());

        fs::write(&path, r#"{"schema_version": "9.9.9", "grid": {"kind": "integers", "start": 1, "end": 5}, "model": {"kind": "hypergeometric", "stages": [{"sample_size": 1, "recaptured": 0}]}}"#).unwrap();
        let err = load_config(&ConfigOptions {
            config_path: Some(path),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::VersionMismatch { .. })
        ));
    }
}
