use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::{Builder, NamedTempFile, TempDir};

use crate::domain::ManifestRecord;
use crate::error::{DatasetError, SkipReason};
use crate::features::FeatureMatrix;

pub const SUMMARY_FILE_NAME: &str = "songs_summary.csv";
pub const METADATA_FILE_NAME: &str = "run_metadata.json";
pub const SUMMARY_COLUMNS: [&str; 3] = ["name", "label", "pathname"];

/// Layout of the dataset on disk.
///
/// `root` is the directory summary paths are relative to; the output
/// directory holds the feature files, the summary and the run metadata.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: Utf8PathBuf,
    output_dir: Utf8PathBuf,
}

impl DatasetStore {
    pub fn new(output_dir: &Utf8Path) -> Result<Self, DatasetError> {
        let cwd = std::env::current_dir().map_err(|err| DatasetError::Filesystem(err.to_string()))?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| DatasetError::Filesystem("invalid working directory".to_string()))?;
        Ok(Self::new_with_root(root, output_dir))
    }

    /// An output directory outside `root` (an absolute path, usually)
    /// makes its parent the root, so summary paths stay relative.
    pub fn new_with_root(root: Utf8PathBuf, output_dir: &Utf8Path) -> Self {
        let output_dir = root.join(output_dir);
        let root = if output_dir.starts_with(&root) {
            root
        } else {
            output_dir
                .parent()
                .map(Utf8Path::to_path_buf)
                .unwrap_or(root)
        };
        Self { root, output_dir }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn feature_path(&self, index: usize) -> Utf8PathBuf {
        self.output_dir.join(format!("item_{index}_mfcc.csv"))
    }

    pub fn summary_path(&self) -> Utf8PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }

    pub fn metadata_path(&self) -> Utf8PathBuf {
        self.output_dir.join(METADATA_FILE_NAME)
    }

    /// `path` relative to the dataset root, as written into the summary.
    pub fn relative_pathname(&self, path: &Utf8Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => relative.as_str().replace('\\', "/"),
            Err(_) => path.file_name().unwrap_or(path.as_str()).to_string(),
        }
    }

    pub fn ensure_output_dir(&self) -> Result<(), DatasetError> {
        fs::create_dir_all(self.output_dir.as_std_path())
            .map_err(|err| DatasetError::Filesystem(err.to_string()))
    }

    pub fn clear(&self) -> Result<bool, DatasetError> {
        if !self.output_dir.as_std_path().exists() {
            return Ok(false);
        }
        fs::remove_dir_all(self.output_dir.as_std_path())
            .map_err(|err| DatasetError::Filesystem(err.to_string()))?;
        Ok(true)
    }

    /// Private directory the audio for item `index` is downloaded into.
    /// It is removed, with everything in it, when the returned guard drops.
    pub fn scratch_dir(&self, index: usize) -> Result<TempDir, DatasetError> {
        Builder::new()
            .prefix(&format!(".item_{index}-"))
            .tempdir_in(self.output_dir.as_std_path())
            .map_err(|err| DatasetError::Filesystem(err.to_string()))
    }

    /// Writes the feature matrix of item `index` in place atomically.
    pub fn write_feature_matrix(
        &self,
        index: usize,
        matrix: &FeatureMatrix,
    ) -> Result<Utf8PathBuf, DatasetError> {
        let path = self.feature_path(index);
        let mut temp = self.temp_file_in_output(&path)?;
        write_matrix(temp.as_file_mut(), matrix)
            .map_err(|err| DatasetError::persistence(&path, err))?;
        persist(temp, &path)?;
        Ok(path)
    }

    /// Writes the summary table; the header is present even with no rows.
    pub fn write_summary(&self, records: &[ManifestRecord]) -> Result<Utf8PathBuf, DatasetError> {
        let path = self.summary_path();
        let mut temp = self.temp_file_in_output(&path)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file_mut());
            writer
                .write_record(SUMMARY_COLUMNS)
                .map_err(|err| DatasetError::persistence(&path, err))?;
            for record in records {
                writer
                    .serialize(record)
                    .map_err(|err| DatasetError::persistence(&path, err))?;
            }
            writer
                .flush()
                .map_err(|err| DatasetError::persistence(&path, err))?;
        }
        persist(temp, &path)?;
        Ok(path)
    }

    pub fn read_summary(&self) -> Result<Vec<ManifestRecord>, DatasetError> {
        let path = self.summary_path();
        let mut reader = csv::Reader::from_path(path.as_std_path())
            .map_err(|err| DatasetError::persistence(&path, err))?;
        reader
            .deserialize()
            .collect::<Result<Vec<ManifestRecord>, _>>()
            .map_err(|err| DatasetError::persistence(&path, err))
    }

    pub fn write_metadata(&self, metadata: &RunMetadata) -> Result<Utf8PathBuf, DatasetError> {
        let path = self.metadata_path();
        let content = serde_json::to_vec_pretty(metadata)
            .map_err(|err| DatasetError::persistence(&path, err))?;
        let mut temp = self.temp_file_in_output(&path)?;
        temp.write_all(&content)
            .map_err(|err| DatasetError::persistence(&path, err))?;
        persist(temp, &path)?;
        Ok(path)
    }

    fn temp_file_in_output(&self, target: &Utf8Path) -> Result<NamedTempFile, DatasetError> {
        Builder::new()
            .prefix(".timbre-ds-write")
            .tempfile_in(self.output_dir.as_std_path())
            .map_err(|err| DatasetError::persistence(target, err))
    }
}

/// Writes `matrix` as CSV: a header row of frame indices, then one row per
/// coefficient.
pub fn write_matrix<W: Write>(writer: W, matrix: &FeatureMatrix) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record((0..matrix.frame_count()).map(|frame| frame.to_string()))?;
    for row in matrix.values().rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn persist(temp: NamedTempFile, path: &Utf8Path) -> Result<(), DatasetError> {
    temp.persist(path.as_std_path())
        .map_err(|err| DatasetError::persistence(path, err.error))?;
    Ok(())
}

/// Diagnostics written next to the summary at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub tool: String,
    pub started_at: String,
    pub finished_at: String,
    pub sample_rate: u32,
    pub coefficient_count: usize,
    pub attempted: usize,
    pub completed: usize,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub index: usize,
    pub locator: String,
    pub reason: String,
    pub message: String,
}

impl SkippedEntry {
    pub fn new(index: usize, locator: &str, reason: SkipReason, message: &str) -> Self {
        Self {
            index,
            locator: locator.to_string(),
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::domain::Label;

    fn temp_store() -> (tempfile::TempDir, DatasetStore) {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = DatasetStore::new_with_root(root, Utf8Path::new("songs"));
        store.ensure_output_dir().unwrap();
        (temp, store)
    }

    #[test]
    fn layout_paths() {
        let (_temp, store) = temp_store();
        let feature = store.feature_path(12);
        assert!(feature.ends_with("songs/item_12_mfcc.csv"));
        assert_eq!(store.relative_pathname(&feature), "songs/item_12_mfcc.csv");
        assert!(store.summary_path().ends_with("songs/songs_summary.csv"));
    }

    #[test]
    fn absolute_output_dir_keeps_pathnames_relative() {
        let root_dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(root_dir.path().to_path_buf()).unwrap();
        let output_dir = Utf8PathBuf::from_path_buf(elsewhere.path().join("songs")).unwrap();
        let store = DatasetStore::new_with_root(root, &output_dir);
        store.ensure_output_dir().unwrap();

        let matrix = FeatureMatrix::new(array![[0.5f32, 1.0]]);
        let path = store.write_feature_matrix(1, &matrix).unwrap();

        assert_eq!(store.output_dir(), output_dir.as_path());
        let pathname = store.relative_pathname(&path);
        assert_eq!(pathname, "songs/item_1_mfcc.csv");
        assert!(!Utf8Path::new(&pathname).is_absolute());
    }

    #[test]
    fn feature_file_has_frame_header_and_coefficient_rows() {
        let (_temp, store) = temp_store();
        let matrix = FeatureMatrix::new(array![[1.5f32, -2.0, 0.25], [3.0, 4.0, 5.0]]);
        let path = store.write_feature_matrix(3, &matrix).unwrap();

        let content = fs::read_to_string(path.as_std_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["0,1,2", "1.5,-2,0.25", "3,4,5"]);
    }

    #[test]
    fn summary_columns_and_quoting() {
        let (_temp, store) = temp_store();
        let records = vec![
            ManifestRecord {
                name: "Thriller, Live".to_string(),
                label: Label::new(0).unwrap(),
                pathname: "songs/item_1_mfcc.csv".to_string(),
            },
            ManifestRecord {
                name: "Lavni".to_string(),
                label: Label::new(3).unwrap(),
                pathname: "songs/item_4_mfcc.csv".to_string(),
            },
        ];
        store.write_summary(&records).unwrap();

        let content = fs::read_to_string(store.summary_path().as_std_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "name,label,pathname");
        assert_eq!(lines[1], "\"Thriller, Live\",0,songs/item_1_mfcc.csv");
        assert_eq!(store.read_summary().unwrap(), records);
    }

    #[test]
    fn empty_summary_keeps_header() {
        let (_temp, store) = temp_store();
        store.write_summary(&[]).unwrap();
        let content = fs::read_to_string(store.summary_path().as_std_path()).unwrap();
        assert_eq!(content, "name,label,pathname\n");
        assert!(store.read_summary().unwrap().is_empty());
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let (_temp, store) = temp_store();
        let scratch = store.scratch_dir(5).unwrap();
        let path = scratch.path().to_path_buf();
        fs::write(path.join("item_5.m4a"), b"data").unwrap();
        drop(scratch);
        assert!(!path.exists());
    }
}
