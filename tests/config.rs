use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use sasbdb_fetcher::config::{Config, ConfigLoader};
use sasbdb_fetcher::domain::ResourceKind;
use sasbdb_fetcher::endpoints::DEFAULT_SUMMARY_BASE;
use sasbdb_fetcher::error::SasbdbError;

#[test]
fn resolve_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("sasbdb-fetch.json");
    std::fs::write(
        &path,
        r#"{
            "data_dir": "mirror",
            "kinds": ["annotation", "summary"],
            "write_manifest": false,
            "delay_secs": 1.5,
            "endpoints": { "listing_url": "http://localhost:8080/codes/" }
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.data_dir, Utf8PathBuf::from("mirror"));
    assert_eq!(
        resolved.options.kinds,
        vec![ResourceKind::Summary, ResourceKind::Annotation]
    );
    assert!(!resolved.options.write_manifest);
    assert_eq!(resolved.options.delay, Duration::from_millis(1500));
    assert_eq!(resolved.endpoints.listing_url, "http://localhost:8080/codes/");
    assert_eq!(resolved.endpoints.summary_base, DEFAULT_SUMMARY_BASE);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nope.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, SasbdbError::ConfigRead(_));
}

#[test]
fn empty_kind_list_is_rejected() {
    let config = Config {
        kinds: Some(Vec::new()),
        ..Config::default()
    };
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, SasbdbError::ConfigParse(_));
}
