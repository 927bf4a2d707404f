//! Item Pipeline: one locator in, one feature file and summary row out.
//!
//! The downloaded audio lives in a scratch directory owned by a single
//! [`ItemPipeline::process`] call; the directory is removed before the
//! call returns, whichever step failed.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::acquire::Acquirer;
use crate::domain::{Label, Locator, ManifestRecord};
use crate::error::{DatasetError, SkipReason};
use crate::features::FeatureExtractor;
use crate::store::DatasetStore;

/// Result of processing one locator. Item failures never surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed(ManifestRecord),
    Skipped(SkippedItem),
}

impl ItemOutcome {
    pub fn record(&self) -> Option<&ManifestRecord> {
        match self {
            ItemOutcome::Completed(record) => Some(record),
            ItemOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub index: usize,
    pub locator: Locator,
    pub label: Label,
    pub reason: SkipReason,
    pub message: String,
}

pub struct ItemPipeline<A: Acquirer, F: FeatureExtractor> {
    acquirer: A,
    extractor: F,
}

impl<A: Acquirer, F: FeatureExtractor> ItemPipeline<A, F> {
    pub fn new(acquirer: A, extractor: F) -> Self {
        Self {
            acquirer,
            extractor,
        }
    }

    pub fn acquirer(&self) -> &A {
        &self.acquirer
    }

    pub fn extractor(&self) -> &F {
        &self.extractor
    }

    /// Acquires, extracts and persists item `index` (1-based) into `store`.
    pub fn process(
        &self,
        store: &DatasetStore,
        locator: &Locator,
        index: usize,
        label: Label,
    ) -> ItemOutcome {
        let start = Instant::now();
        match self.try_process(store, locator, index, label) {
            Ok(record) => {
                info!(
                    index,
                    %locator,
                    %label,
                    pathname = %record.pathname,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "item completed"
                );
                ItemOutcome::Completed(record)
            }
            Err(err) => {
                let reason = err.skip_reason();
                warn!(index, %locator, %reason, error = %err, "item skipped");
                ItemOutcome::Skipped(SkippedItem {
                    index,
                    locator: locator.clone(),
                    label,
                    reason,
                    message: err.to_string(),
                })
            }
        }
    }

    fn try_process(
        &self,
        store: &DatasetStore,
        locator: &Locator,
        index: usize,
        label: Label,
    ) -> Result<ManifestRecord, DatasetError> {
        let scratch = store.scratch_dir(index)?;
        let result = self.process_in(store, locator, index, label, scratch.path());

        let scratch_path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            warn!(index, path = %scratch_path.display(), error = %err, "failed to remove scratch directory");
        }
        result
    }

    fn process_in(
        &self,
        store: &DatasetStore,
        locator: &Locator,
        index: usize,
        label: Label,
        scratch: &Path,
    ) -> Result<ManifestRecord, DatasetError> {
        let stem = format!("item_{index}");
        let audio = self.acquirer.acquire(locator, &stem, scratch)?;
        debug!(index, path = %audio.path.display(), "audio acquired");

        let matrix = self.extractor.extract(&audio.path)?;
        if matrix.is_empty() {
            return Err(DatasetError::NoFeatures(audio.path));
        }

        let feature_path = store.write_feature_matrix(index, &matrix)?;
        let name = audio
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("song_{index}"));

        Ok(ManifestRecord {
            name,
            label,
            pathname: store.relative_pathname(&feature_path),
        })
    }
}
