use tabstat::config::AppConfig;
use tabstat::data::load_file;
use tabstat::session::Session;
use tabstat::upload::{store_upload, UploadError};

fn config(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        upload_dir: dir.join("uploads"),
        max_upload_bytes: 64,
        ..AppConfig::default()
    }
}

#[test]
fn upload_is_stored_under_a_safe_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let path = store_upload(&config, "../../etc/My Data.csv", b"a,b\n1,x\n2,y\n").unwrap();
    assert_eq!(path, dir.path().join("uploads").join("My_Data.csv"));
    assert!(path.is_file());

    let dataset = load_file(&path).unwrap();
    let mut session = Session::new();
    let record = session.record_upload(&path, "My Data.csv", &dataset, config.preview_rows);
    assert_eq!(record.info.shape, "2 rows × 2 columns");
    assert_eq!(record.info.preview[0][1], ("b".to_string(), "x".to_string()));
}

#[test]
fn disallowed_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = store_upload(&config(dir.path()), "script.sh", b"echo hi").unwrap_err();
    assert!(matches!(err, UploadError::UnsupportedExtension(ext) if ext == "sh"));

    let err = store_upload(&config(dir.path()), "..", b"").unwrap_err();
    assert!(matches!(err, UploadError::InvalidFilename(_)));
}

#[test]
fn oversized_uploads_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = store_upload(&config(dir.path()), "big.csv", &[b'x'; 65]).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { size: 65, limit: 64 }));
    assert!(!dir.path().join("uploads").join("big.csv").exists());
}
