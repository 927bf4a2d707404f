use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Locator, SourceKind};
use crate::error::DatasetError;
use crate::http::HttpAcquirer;
use crate::ytdlp::YtDlpAcquirer;

/// A downloaded audio file and the title its source reported.
#[derive(Debug, Clone)]
pub struct AcquiredAudio {
    pub path: PathBuf,
    pub title: Option<String>,
}

/// Turns a locator into a local audio file.
///
/// `stem` is the file name (without extension) the audio must be written
/// under, inside `destination_dir`.
pub trait Acquirer: Send + Sync {
    fn acquire(
        &self,
        locator: &Locator,
        stem: &str,
        destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError>;
}

/// Routes each locator to the acquirer for its [`SourceKind`].
pub struct MediaAcquirer {
    ytdlp: YtDlpAcquirer,
    http: HttpAcquirer,
    local: LocalFileAcquirer,
}

impl MediaAcquirer {
    pub fn new(ytdlp: YtDlpAcquirer, http: HttpAcquirer) -> Self {
        Self {
            ytdlp,
            http,
            local: LocalFileAcquirer,
        }
    }
}

impl Acquirer for MediaAcquirer {
    fn acquire(
        &self,
        locator: &Locator,
        stem: &str,
        destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError> {
        let kind = locator.source_kind();
        debug!(%locator, %kind, "routing acquisition");
        match kind {
            SourceKind::VideoPage => self.ytdlp.acquire(locator, stem, destination_dir),
            SourceKind::DirectAudio => self.http.acquire(locator, stem, destination_dir),
            SourceKind::LocalFile => self.local.acquire(locator, stem, destination_dir),
        }
    }
}

/// Copies an audio file that is already on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAcquirer;

impl LocalFileAcquirer {
    pub fn source_path(locator: &Locator) -> PathBuf {
        let raw = locator.as_str();
        PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw))
    }
}

impl Acquirer for LocalFileAcquirer {
    fn acquire(
        &self,
        locator: &Locator,
        stem: &str,
        destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError> {
        let source = Self::source_path(locator);
        if !source.is_file() {
            return Err(DatasetError::acquisition(locator, "no such file"));
        }
        let extension = source
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or("bin");
        let destination = destination_dir.join(format!("{stem}.{extension}"));
        fs::copy(&source, &destination).map_err(|err| DatasetError::acquisition(locator, err))?;

        let title = source
            .file_stem()
            .and_then(|value| value.to_str())
            .map(|value| value.to_string());
        Ok(AcquiredAudio {
            path: destination,
            title,
        })
    }
}

/// Depth-first search for the first file in `root` named `<stem>.*`.
pub(crate) fn find_by_stem(root: &Path, stem: &str) -> Option<PathBuf> {
    let prefix = format!("{stem}.");
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        let entries = fs::read_dir(&path).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path
                .file_name()
                .and_then(|value| value.to_str())
                .map(|name| name.starts_with(&prefix) && !name.ends_with(".part"))
                .unwrap_or(false)
            {
                return Some(path);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn local_file_is_copied_under_stem() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("Evening Raga.wav");
        fs::write(&source, b"RIFF").unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();

        let locator: Locator = format!("file://{}", source.display()).parse().unwrap();
        let audio = LocalFileAcquirer
            .acquire(&locator, "item_7", &scratch)
            .unwrap();

        assert_eq!(audio.path, scratch.join("item_7.wav"));
        assert!(audio.path.exists());
        assert!(source.exists());
        assert_eq!(audio.title.as_deref(), Some("Evening Raga"));
    }

    #[test]
    fn missing_local_file_is_acquisition_error() {
        let temp = tempfile::tempdir().unwrap();
        let locator: Locator = temp.path().join("absent.mp3").display().to_string().parse().unwrap();
        let err = LocalFileAcquirer
            .acquire(&locator, "item_1", temp.path())
            .unwrap_err();
        assert_matches!(err, DatasetError::Acquisition { .. });
    }

    #[test]
    fn find_by_stem_skips_partial_downloads() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("item_2.webm.part"), b"").unwrap();
        assert_eq!(find_by_stem(temp.path(), "item_2"), None);

        fs::write(temp.path().join("item_2.m4a"), b"").unwrap();
        assert_eq!(
            find_by_stem(temp.path(), "item_2"),
            Some(temp.path().join("item_2.m4a"))
        );
    }
}
