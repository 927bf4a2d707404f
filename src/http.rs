use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::acquire::{AcquiredAudio, Acquirer};
use crate::domain::Locator;
use crate::error::DatasetError;

/// Downloads audio files served directly over http(s).
#[derive(Clone)]
pub struct HttpAcquirer {
    client: Client,
}

impl HttpAcquirer {
    pub fn new() -> Result<Self, DatasetError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("timbre-ds/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| DatasetError::InvalidConfig(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|err| DatasetError::InvalidConfig(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(response: Response) -> Result<Response, DatasetError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "download failed".to_string());
        Err(DatasetError::DownloadStatus { status, message })
    }
}

impl Acquirer for HttpAcquirer {
    fn acquire(
        &self,
        locator: &Locator,
        stem: &str,
        destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError> {
        debug!(%locator, "http.request");
        let response = self
            .client
            .get(locator.as_str())
            .send()
            .map_err(|err| DatasetError::acquisition(locator, err))?;
        let mut response = Self::handle_status(response)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let extension = url_extension(locator.as_str())
            .or_else(|| content_type.as_deref().and_then(extension_for_mime))
            .unwrap_or("bin");

        let destination = destination_dir.join(format!("{stem}.{extension}"));
        let mut file =
            File::create(&destination).map_err(|err| DatasetError::acquisition(locator, err))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| DatasetError::acquisition(locator, err))?;

        Ok(AcquiredAudio {
            path: destination,
            title: url_title(locator.as_str()),
        })
    }
}

fn url_path(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query)
}

/// Last path segment of the URL, without its extension.
pub fn url_title(url: &str) -> Option<String> {
    let segment = url_path(url).rsplit('/').next()?;
    let stem = segment
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(segment);
    let stem = stem.replace("%20", " ");
    (!stem.trim().is_empty()).then(|| stem.trim().to_string())
}

fn url_extension(url: &str) -> Option<&str> {
    let segment = url_path(url).rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    (!ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphanumeric())).then_some(ext)
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    match essence {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/ogg" | "application/ogg" => Some("ogg"),
        "audio/mp4" | "audio/x-m4a" | "audio/aac" => Some("m4a"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_extension_from_url() {
        let url = "https://cdn.example.org/music/Lavni%20Live.flac?sig=abc";
        assert_eq!(url_title(url).as_deref(), Some("Lavni Live"));
        assert_eq!(url_extension(url), Some("flac"));
    }

    #[test]
    fn bare_host_has_no_title() {
        assert_eq!(url_title("https://example.org/"), None);
        assert_eq!(url_extension("https://example.org/"), None);
    }

    #[test]
    fn mime_mapping() {
        assert_eq!(extension_for_mime("audio/mpeg; charset=binary"), Some("mp3"));
        assert_eq!(extension_for_mime("text/html"), None);
    }
}
