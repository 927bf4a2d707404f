use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::acquire::Acquirer;
use crate::catalog;
use crate::config::ExtractionSettings;
use crate::domain::{LocatorEntry, ManifestRecord, SourceKind};
use crate::error::DatasetError;
use crate::features::{FeatureExtractor, FeatureShape};
use crate::pipeline::{ItemOutcome, ItemPipeline, SkippedItem};
use crate::store::{self, DatasetStore, RunMetadata, SkippedEntry};

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub output_dir: String,
    pub summary_path: String,
    pub metadata_path: String,
    pub attempted: usize,
    pub records: Vec<ManifestRecord>,
    pub skipped: Vec<SkippedItem>,
}

impl BuildReport {
    pub fn completed(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub entries: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub index: usize,
    pub label: u8,
    pub category: Option<String>,
    pub source_kind: SourceKind,
    pub locator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResult {
    pub input: String,
    pub output: Option<String>,
    pub sample_rate: u32,
    pub shape: FeatureShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearResult {
    pub output_dir: String,
    pub cleared: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// State of one build: where files go and the records collected so far.
/// Created when a run starts and consumed when it finishes.
pub struct RunContext {
    store: DatasetStore,
    records: Vec<ManifestRecord>,
    skipped: Vec<SkippedItem>,
    attempted: usize,
    started_at: String,
}

impl RunContext {
    pub fn new(store: DatasetStore) -> Self {
        Self {
            store,
            records: Vec::new(),
            skipped: Vec::new(),
            attempted: 0,
            started_at: now_rfc3339(),
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn records(&self) -> &[ManifestRecord] {
        &self.records
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Completed(record) => self.records.push(record),
            ItemOutcome::Skipped(item) => self.skipped.push(item),
        }
    }

    /// Writes the summary table and the run metadata.
    pub fn finish(self, settings: ExtractionSettings) -> Result<BuildReport, DatasetError> {
        let summary_path = self.store.write_summary(&self.records)?;
        let metadata = RunMetadata {
            tool: format!("timbre-ds {}", env!("CARGO_PKG_VERSION")),
            started_at: self.started_at,
            finished_at: now_rfc3339(),
            sample_rate: settings.sample_rate,
            coefficient_count: settings.coefficient_count,
            attempted: self.attempted,
            completed: self.records.len(),
            skipped: self
                .skipped
                .iter()
                .map(|item| {
                    SkippedEntry::new(item.index, item.locator.as_str(), item.reason, &item.message)
                })
                .collect(),
        };
        let metadata_path = self.store.write_metadata(&metadata)?;

        Ok(BuildReport {
            output_dir: self.store.output_dir().to_string(),
            summary_path: summary_path.to_string(),
            metadata_path: metadata_path.to_string(),
            attempted: self.attempted,
            records: self.records,
            skipped: self.skipped,
        })
    }
}

/// The Manifest Builder.
pub struct App<A: Acquirer, F: FeatureExtractor> {
    pipeline: ItemPipeline<A, F>,
    settings: ExtractionSettings,
}

impl<A: Acquirer, F: FeatureExtractor> App<A, F> {
    pub fn new(acquirer: A, extractor: F, settings: ExtractionSettings) -> Self {
        Self {
            pipeline: ItemPipeline::new(acquirer, extractor),
            settings,
        }
    }

    /// Processes `entries` in order, numbering them from 1, and writes the
    /// summary of the items that completed.
    pub fn run(
        &self,
        store: DatasetStore,
        entries: &[LocatorEntry],
        sink: &dyn ProgressSink,
    ) -> Result<BuildReport, DatasetError> {
        store.ensure_output_dir()?;
        let run_start = Instant::now();
        let total = entries.len();
        info!(total, output_dir = %store.output_dir(), "build started");

        let mut context = RunContext::new(store);
        for (position, entry) in entries.iter().enumerate() {
            let index = position + 1;
            sink.event(ProgressEvent {
                message: format!("[{index}/{total}] {}", entry.locator),
                elapsed: None,
            });
            let start = Instant::now();
            let outcome =
                self.pipeline
                    .process(context.store(), &entry.locator, index, entry.label);
            let message = match &outcome {
                ItemOutcome::Completed(record) => {
                    format!("[{index}/{total}] saved {} ({})", record.pathname, record.name)
                }
                ItemOutcome::Skipped(item) => {
                    format!("[{index}/{total}] skipped ({})", item.reason)
                }
            };
            sink.event(ProgressEvent {
                message,
                elapsed: Some(start.elapsed()),
            });
            context.push(outcome);
        }

        let report = context.finish(self.settings)?;
        info!(
            attempted = report.attempted,
            completed = report.completed(),
            skipped = report.skipped.len(),
            summary = %report.summary_path,
            "build finished"
        );
        sink.event(ProgressEvent {
            message: format!(
                "summary written to {} ({} of {} items)",
                report.summary_path,
                report.completed(),
                report.attempted
            ),
            elapsed: Some(run_start.elapsed()),
        });
        Ok(report)
    }

    /// Runs only the Feature Extractor on a local file. The CSV goes to
    /// `output` when given, otherwise to stdout.
    pub fn extract(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ExtractResult, DatasetError> {
        let matrix = self.pipeline.extractor().extract(input)?;
        if matrix.is_empty() {
            return Err(DatasetError::NoFeatures(input.to_path_buf()));
        }

        match output {
            Some(path) => {
                let file = File::create(path).map_err(|err| DatasetError::persistence(path, err))?;
                store::write_matrix(BufWriter::new(file), &matrix)
                    .map_err(|err| DatasetError::persistence(path, err))?;
            }
            None => {
                store::write_matrix(std::io::stdout().lock(), &matrix)
                    .map_err(|err| DatasetError::persistence("<stdout>", err))?;
            }
        }

        Ok(ExtractResult {
            input: input.display().to_string(),
            output: output.map(|path| path.display().to_string()),
            sample_rate: self.settings.sample_rate,
            shape: matrix.shape(),
        })
    }
}

/// Describes the Locator List with the 1-based indices a build would use.
pub fn list_entries(entries: &[LocatorEntry]) -> ListResult {
    ListResult {
        entries: entries
            .iter()
            .enumerate()
            .map(|(position, entry)| ListEntry {
                index: position + 1,
                label: entry.label.value(),
                category: catalog::category_name(entry.label).map(str::to_string),
                source_kind: entry.locator.source_kind(),
                locator: entry.locator.to_string(),
            })
            .collect(),
    }
}

pub fn clear(store: &DatasetStore, sink: &dyn ProgressSink) -> Result<ClearResult, DatasetError> {
    sink.event(ProgressEvent {
        message: format!("clearing {}", store.output_dir()),
        elapsed: None,
    });
    let cleared = store.clear()?;
    Ok(ClearResult {
        output_dir: store.output_dir().to_string(),
        cleared,
    })
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
