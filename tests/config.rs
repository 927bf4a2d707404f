use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use timbre_dataset::config::{ConfigLoader, ConfigOverrides};
use timbre_dataset::domain::{Label, SourceKind};
use timbre_dataset::error::DatasetError;

#[test]
fn parse_config_file_with_categories() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("timbre-ds.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "sample_rate": 22050,
            "output_dir": "features",
            "categories": [
                { "label": 0, "name": "Lavni", "sources": ["https://youtu.be/a", "/music/b.flac"] },
                { "label": 7, "sources": ["https://cdn.example.org/c.mp3"] }
            ]
        }"#,
    )
    .unwrap();

    let resolved =
        ConfigLoader::resolve(path.to_str(), &ConfigOverrides::default()).unwrap();

    assert_eq!(resolved.extraction.sample_rate, 22_050);
    assert_eq!(resolved.extraction.coefficient_count, 20);
    assert_eq!(resolved.output_dir, Utf8PathBuf::from("features"));
    assert_eq!(resolved.entries.len(), 3);
    assert_eq!(resolved.entries[1].label, Label::new(0).unwrap());
    assert_eq!(resolved.entries[1].locator.source_kind(), SourceKind::LocalFile);
    assert_eq!(resolved.entries[2].label, Label::new(7).unwrap());
    assert_eq!(resolved.entries[2].locator.source_kind(), SourceKind::DirectAudio);
}

#[test]
fn cli_overrides_win_over_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("custom.json");
    fs::write(&path, r#"{ "coefficient_count": 13, "output_dir": "features" }"#).unwrap();

    let overrides = ConfigOverrides {
        sample_rate: None,
        coefficient_count: Some(40),
        output_dir: Some("other".to_string()),
    };
    let resolved = ConfigLoader::resolve(path.to_str(), &overrides).unwrap();

    assert_eq!(resolved.extraction.coefficient_count, 40);
    assert_eq!(resolved.output_dir, Utf8PathBuf::from("other"));
    assert_eq!(resolved.entries.len(), 127);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str(), &ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, DatasetError::ConfigRead(_));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(path.to_str(), &ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, DatasetError::ConfigParse(_));
}

#[test]
fn out_of_range_label_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("labels.json");
    fs::write(&path, r#"{ "categories": [ { "label": 64, "sources": ["x.wav"] } ] }"#).unwrap();
    let err = ConfigLoader::resolve(path.to_str(), &ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, DatasetError::InvalidLabel(64));
}

#[test]
fn empty_locator_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("empty.json");
    fs::write(&path, r#"{ "categories": [ { "label": 1, "sources": ["  "] } ] }"#).unwrap();
    let err = ConfigLoader::resolve(path.to_str(), &ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, DatasetError::InvalidLocator(_));
}
