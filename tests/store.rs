use camino::Utf8PathBuf;

use sasbdb_fetcher::domain::{RecordCode, ResourceKind};
use sasbdb_fetcher::sasbdb::Payload;
use sasbdb_fetcher::store::Store;

#[test]
fn resource_path_depends_only_on_code_and_kind() {
    let store = Store::new("/srv/sasbdb");
    let code: RecordCode = "SASDE48".parse().unwrap();
    let same: RecordCode = "SASDE48".parse().unwrap();
    for kind in ResourceKind::ALL {
        assert_eq!(store.resource_path(&code, kind), store.resource_path(&same, kind));
    }
    assert_eq!(
        store.resource_path(&code, ResourceKind::Summary),
        Utf8PathBuf::from("/srv/sasbdb/SASDE48_summary.json")
    );
}

#[test]
fn verbatim_resources_overwrite_in_place() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap());
    let code: RecordCode = "SASDA1".parse().unwrap();

    store
        .write_resource(&code, ResourceKind::Intensity, &Payload::new("old\n"))
        .unwrap();
    let path = store
        .write_resource(&code, ResourceKind::Intensity, &Payload::new("0.01 1.0 0.1\n"))
        .unwrap();

    assert_eq!(std::fs::read_to_string(path.as_std_path()).unwrap(), "0.01 1.0 0.1\n");
    let entries = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn malformed_summary_is_not_written() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap());
    let code: RecordCode = "SASDA1".parse().unwrap();

    let result = store.write_resource(&code, ResourceKind::Summary, &Payload::new("<html>"));

    assert!(result.is_err());
    assert!(!store.resource_path(&code, ResourceKind::Summary).exists());
}
