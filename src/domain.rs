use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Identifier of one remote (or local) audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator(String);

impl Locator {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn source_kind(&self) -> SourceKind {
        if video_page_regex().is_match(&self.0) {
            SourceKind::VideoPage
        } else if direct_audio_regex().is_match(&self.0) {
            SourceKind::DirectAudio
        } else if self.0.starts_with("http://") || self.0.starts_with("https://") {
            SourceKind::VideoPage
        } else {
            SourceKind::LocalFile
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Locator {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DatasetError::InvalidLocator(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for Locator {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locator> for String {
    fn from(value: Locator) -> Self {
        value.0
    }
}

/// How a locator is turned into a local audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A media page resolved through yt-dlp.
    VideoPage,
    /// An http(s) URL pointing straight at an audio file.
    DirectAudio,
    /// A `file://` URL or a filesystem path.
    LocalFile,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::VideoPage => write!(f, "video_page"),
            SourceKind::DirectAudio => write!(f, "direct_audio"),
            SourceKind::LocalFile => write!(f, "local_file"),
        }
    }
}

fn video_page_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://([a-z0-9-]+\.)?(youtube\.com|youtu\.be|youtube-nocookie\.com)/")
            .expect("video page regex")
    })
}

fn direct_audio_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://[^?#]+\.(mp3|wav|flac|ogg|oga|m4a|aac|aiff?|caf|mka)([?#].*)?$")
            .expect("direct audio regex")
    })
}

/// Category code of one dataset item (singer or genre).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Label(u8);

impl Label {
    pub const MAX: u8 = 63;

    pub fn new(value: u32) -> Result<Self, DatasetError> {
        u8::try_from(value)
            .ok()
            .filter(|value| *value <= Self::MAX)
            .map(Self)
            .ok_or(DatasetError::InvalidLabel(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Label {
    type Error = DatasetError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Label> for u8 {
    fn from(value: Label) -> Self {
        value.0
    }
}

/// One row of the Locator List.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorEntry {
    pub locator: Locator,
    pub label: Label,
}

impl LocatorEntry {
    pub fn new(locator: Locator, label: Label) -> Self {
        Self { locator, label }
    }
}

/// One row of the summary table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub name: String,
    pub label: Label,
    pub pathname: String,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_locator_trims() {
        let locator: Locator = "  https://youtu.be/Zi_XLOBDo_Y  ".parse().unwrap();
        assert_eq!(locator.as_str(), "https://youtu.be/Zi_XLOBDo_Y");
    }

    #[test]
    fn parse_locator_rejects_empty() {
        let err = "   ".parse::<Locator>().unwrap_err();
        assert_matches!(err, DatasetError::InvalidLocator(_));
    }

    #[test]
    fn source_kind_routing() {
        let page: Locator = "https://www.youtube.com/watch?v=oRdxUFDoQe0".parse().unwrap();
        assert_eq!(page.source_kind(), SourceKind::VideoPage);

        let short: Locator = "https://youtu.be/QNJL6nfu__Q?si=28CZMObcQbtrofkq".parse().unwrap();
        assert_eq!(short.source_kind(), SourceKind::VideoPage);

        let direct: Locator = "https://example.org/audio/track.MP3?token=1".parse().unwrap();
        assert_eq!(direct.source_kind(), SourceKind::DirectAudio);

        let other_site: Locator = "https://vimeo.com/12345".parse().unwrap();
        assert_eq!(other_site.source_kind(), SourceKind::VideoPage);

        let local: Locator = "file:///tmp/clip.wav".parse().unwrap();
        assert_eq!(local.source_kind(), SourceKind::LocalFile);
    }

    #[test]
    fn label_bounds() {
        assert_eq!(Label::new(5).unwrap().value(), 5);
        assert_matches!(Label::new(64), Err(DatasetError::InvalidLabel(64)));
        assert_matches!(Label::new(300), Err(DatasetError::InvalidLabel(300)));
    }
}
