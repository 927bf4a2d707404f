use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::domain::{Label, LocatorEntry};
use crate::error::DatasetError;

pub const CONFIG_FILE_NAME: &str = "timbre-ds.json";
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_COEFFICIENT_COUNT: usize = 20;
pub const DEFAULT_OUTPUT_DIR: &str = "songs";
pub const DEFAULT_YTDLP_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";
/// Coefficients are taken from the mel bands, so there can be no more of them.
pub const MAX_COEFFICIENT_COUNT: usize = crate::mfcc::N_MELS;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub coefficient_count: Option<usize>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub ytdlp_format: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<CategoryEntry>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryEntry {
    pub label: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Settings the Feature Extractor is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionSettings {
    pub sample_rate: u32,
    pub coefficient_count: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            coefficient_count: DEFAULT_COEFFICIENT_COUNT,
        }
    }
}

impl ExtractionSettings {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.sample_rate == 0 {
            return Err(DatasetError::InvalidConfig(
                "sample_rate must be positive".to_string(),
            ));
        }
        if self.coefficient_count == 0 || self.coefficient_count > MAX_COEFFICIENT_COUNT {
            return Err(DatasetError::InvalidConfig(format!(
                "coefficient_count must be in 1..={MAX_COEFFICIENT_COUNT}"
            )));
        }
        Ok(())
    }
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sample_rate: Option<u32>,
    pub coefficient_count: Option<usize>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub extraction: ExtractionSettings,
    pub output_dir: Utf8PathBuf,
    pub ytdlp_format: String,
    pub entries: Vec<LocatorEntry>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the config file if one can be found and applies `overrides`.
    ///
    /// An explicit `path` must exist. Without one, `timbre-ds.json` in the
    /// working directory is tried, then the per-user config directory, and
    /// finally the built-in defaults and catalog are used.
    pub fn resolve(
        path: Option<&str>,
        overrides: &ConfigOverrides,
    ) -> Result<ResolvedConfig, DatasetError> {
        let config = match Self::locate(path) {
            Some(config_path) => Self::read(&config_path)?,
            None => Config::default(),
        };
        Self::resolve_config(config, overrides)
    }

    pub fn read(config_path: &Path) -> Result<Config, DatasetError> {
        let content = fs::read_to_string(config_path)
            .map_err(|_| DatasetError::ConfigRead(config_path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| DatasetError::ConfigParse(err.to_string()))
    }

    fn locate(path: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "timbre-dataset")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.exists())
    }

    pub fn resolve_config(
        config: Config,
        overrides: &ConfigOverrides,
    ) -> Result<ResolvedConfig, DatasetError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let extraction = ExtractionSettings {
            sample_rate: overrides
                .sample_rate
                .or(config.sample_rate)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            coefficient_count: overrides
                .coefficient_count
                .or(config.coefficient_count)
                .unwrap_or(DEFAULT_COEFFICIENT_COUNT),
        };
        extraction.validate()?;

        let output_dir = overrides
            .output_dir
            .clone()
            .or(config.output_dir)
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
        if output_dir.trim().is_empty() {
            return Err(DatasetError::InvalidConfig(
                "output_dir must not be empty".to_string(),
            ));
        }

        let entries = match config.categories {
            Some(categories) => categories
                .into_iter()
                .map(|category| {
                    let label = Label::new(category.label)?;
                    category
                        .sources
                        .into_iter()
                        .map(|source| Ok(LocatorEntry::new(source.parse()?, label)))
                        .collect::<Result<Vec<_>, DatasetError>>()
                })
                .collect::<Result<Vec<_>, DatasetError>>()?
                .into_iter()
                .flatten()
                .collect(),
            None => catalog::builtin_entries()?,
        };

        Ok(ResolvedConfig {
            schema_version,
            extraction,
            output_dir: Utf8PathBuf::from(output_dir),
            ytdlp_format: config
                .ytdlp_format
                .unwrap_or_else(|| DEFAULT_YTDLP_FORMAT.to_string()),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_use_builtin_catalog() {
        let resolved =
            ConfigLoader::resolve_config(Config::default(), &ConfigOverrides::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.extraction, ExtractionSettings::default());
        assert_eq!(resolved.output_dir, Utf8PathBuf::from("songs"));
        assert_eq!(resolved.entries.len(), 127);
    }

    #[test]
    fn overrides_win_over_file() {
        let config = Config {
            sample_rate: Some(22_050),
            coefficient_count: Some(13),
            output_dir: Some("features".to_string()),
            ..Config::default()
        };
        let overrides = ConfigOverrides {
            sample_rate: Some(16_000),
            coefficient_count: None,
            output_dir: None,
        };
        let resolved = ConfigLoader::resolve_config(config, &overrides).unwrap();
        assert_eq!(resolved.extraction.sample_rate, 16_000);
        assert_eq!(resolved.extraction.coefficient_count, 13);
        assert_eq!(resolved.output_dir, Utf8PathBuf::from("features"));
    }

    #[test]
    fn rejects_too_many_coefficients() {
        let overrides = ConfigOverrides {
            coefficient_count: Some(MAX_COEFFICIENT_COUNT + 1),
            ..ConfigOverrides::default()
        };
        let err = ConfigLoader::resolve_config(Config::default(), &overrides).unwrap_err();
        assert_matches!(err, DatasetError::InvalidConfig(_));
    }
}
