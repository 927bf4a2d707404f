use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("invalid locator: {0:?}")]
    InvalidLocator(String),

    #[error("invalid label {0}: labels must be in 0..=63")]
    InvalidLabel(u32),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("failed to acquire {locator}: {message}")]
    Acquisition { locator: String, message: String },

    #[error("download returned status {status}: {message}")]
    DownloadStatus { status: u16, message: String },

    #[error("failed to extract features from {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("no features computed for {0}")]
    NoFeatures(PathBuf),

    #[error("failed to write {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl DatasetError {
    pub fn acquisition(locator: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Acquisition {
            locator: locator.to_string(),
            message: message.to_string(),
        }
    }

    pub fn extraction(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn persistence(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::Persistence {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Classifies an item-scoped failure by the pipeline stage it belongs to.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            DatasetError::Acquisition { .. }
            | DatasetError::DownloadStatus { .. }
            | DatasetError::MissingTool(_)
            | DatasetError::InvalidLocator(_) => SkipReason::Acquisition,
            DatasetError::Extraction { .. } => SkipReason::Extraction,
            DatasetError::NoFeatures(_) => SkipReason::NoFeatures,
            DatasetError::Persistence { .. } | DatasetError::Filesystem(_) => {
                SkipReason::Persistence
            }
            DatasetError::InvalidLabel(_)
            | DatasetError::ConfigRead(_)
            | DatasetError::ConfigParse(_)
            | DatasetError::InvalidConfig(_) => SkipReason::Other,
        }
    }
}

/// Why an item was left out of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Acquisition,
    Extraction,
    NoFeatures,
    Persistence,
    Other,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Acquisition => write!(f, "acquisition"),
            SkipReason::Extraction => write!(f, "extraction"),
            SkipReason::NoFeatures => write!(f, "no_features"),
            SkipReason::Persistence => write!(f, "persistence"),
            SkipReason::Other => write!(f, "other"),
        }
    }
}
