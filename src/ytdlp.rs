use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::acquire::{AcquiredAudio, Acquirer, find_by_stem};
use crate::domain::Locator;
use crate::error::DatasetError;

/// Fields of the yt-dlp info JSON this crate reads.
#[derive(Debug, Deserialize)]
pub struct InfoJson {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
}

/// Downloads media pages through the `yt-dlp` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    program: Option<PathBuf>,
    format: String,
}

impl YtDlpAcquirer {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            program: find_in_path("yt-dlp"),
            format: format.into(),
        }
    }

    pub fn with_program(program: PathBuf, format: impl Into<String>) -> Self {
        Self {
            program: Some(program),
            format: format.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.program.is_some()
    }

    pub fn version(&self) -> Option<String> {
        let program = self.program.as_ref()?;
        let output = Command::new(program).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!stdout.is_empty()).then_some(stdout)
    }

    pub fn build_args(&self, locator: &Locator, stem: &str, destination_dir: &Path) -> Vec<String> {
        let template = destination_dir.join(format!("{stem}.%(ext)s"));
        vec![
            "--format".to_string(),
            self.format.clone(),
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--output".to_string(),
            template.to_string_lossy().to_string(),
            locator.as_str().to_string(),
        ]
    }
}

impl Acquirer for YtDlpAcquirer {
    fn acquire(
        &self,
        locator: &Locator,
        stem: &str,
        destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError> {
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| DatasetError::MissingTool("yt-dlp".to_string()))?;
        let args = self.build_args(locator, stem, destination_dir);
        debug!(%locator, program = %program.display(), "running yt-dlp");

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|err| DatasetError::acquisition(locator, err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                stderr
            };
            return Err(DatasetError::acquisition(locator, message));
        }

        let info = parse_info(&String::from_utf8_lossy(&output.stdout));
        if info.is_none() {
            debug!(%locator, "yt-dlp printed no readable info JSON; title unavailable");
        }
        let expected = info
            .as_ref()
            .and_then(|info| info.ext.as_deref())
            .map(|ext| destination_dir.join(format!("{stem}.{ext}")))
            .filter(|path| path.is_file());
        let path = expected
            .or_else(|| find_by_stem(destination_dir, stem))
            .ok_or_else(|| {
                DatasetError::acquisition(locator, "yt-dlp did not produce an audio file")
            })?;

        Ok(AcquiredAudio {
            path,
            title: info.and_then(|info| info.title),
        })
    }
}

/// Reads the first info JSON object yt-dlp printed on stdout.
pub fn parse_info(stdout: &str) -> Option<InfoJson> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| match serde_json::from_str(line) {
            Ok(info) => Some(info),
            Err(err) => {
                debug!(error = %err, "skipping unparsable yt-dlp info line");
                None
            }
        })
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for path in std::env::split_paths(&path_var) {
        let exe = path.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = path.join(name);
        if plain.exists() {
            return Some(plain);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn args_request_single_video_into_scratch() {
        let acquirer = YtDlpAcquirer::with_program(PathBuf::from("yt-dlp"), "bestaudio");
        let locator: Locator = "https://www.youtube.com/watch?v=QOnABvJWS30&list=PLAKPPAHY4SIKwNBbAcVa48KVUBbh6PHOA&index=5"
            .parse()
            .unwrap();
        let args = acquirer.build_args(&locator, "item_10", Path::new("/tmp/scratch"));

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"/tmp/scratch/item_10.%(ext)s".to_string()));
        assert_eq!(args.last().unwrap(), locator.as_str());
    }

    #[test]
    fn parse_info_skips_warnings() {
        let stdout = "WARNING: something\n{\"title\": \"Thriller\", \"ext\": \"m4a\", \"id\": \"x\"}\n";
        let info = parse_info(stdout).unwrap();
        assert_eq!(info.title.as_deref(), Some("Thriller"));
        assert_eq!(info.ext.as_deref(), Some("m4a"));
    }

    #[test]
    fn parse_info_tolerates_malformed_lines() {
        let stdout = "{\"title\": \"Thriller\", \"ext\": \n{\"title\": \"Lavni\", \"ext\": \"webm\"}\n";
        let info = parse_info(stdout).unwrap();
        assert_eq!(info.title.as_deref(), Some("Lavni"));

        assert!(parse_info("{\"title\": 12 broken").is_none());
        assert!(parse_info("").is_none());
    }

    #[test]
    fn missing_program_is_missing_tool() {
        let acquirer = YtDlpAcquirer {
            program: None,
            format: "bestaudio".to_string(),
        };
        let locator: Locator = "https://youtu.be/Zi_XLOBDo_Y".parse().unwrap();
        let err = acquirer
            .acquire(&locator, "item_1", Path::new("/tmp"))
            .unwrap_err();
        assert_matches!(err, DatasetError::MissingTool(_));
    }
}
