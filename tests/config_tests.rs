use std::env;
use std::io::Write;

use inspection_live::config::{self, AppConfig};
use tempfile::NamedTempFile;

fn write_temp_config(content: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file
}

#[test]
fn test_valid_config_does_not_error() {
    assert!(config::load_with(None).is_ok());
}

#[test]
fn test_config_from_file() {
    let temp_file = write_temp_config(
        r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
url = "sqlite://custom.db"

[live]
subscriber_buffer = 32
stream_url_template = "rtsp://edge/{camera_id}"
"#,
    );

    let config = config::load_with(Some(temp_file.path())).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.database.url, "sqlite://custom.db");
    assert_eq!(config.live.subscriber_buffer, 32);
    assert_eq!(config.live.stream_url_template, "rtsp://edge/{camera_id}");
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let temp_file = write_temp_config(
        r#"
[live]
subscriber_buffer = 0
"#,
    );

    let err = config::load_with(Some(temp_file.path())).unwrap_err();
    assert!(err.to_string().contains("live.subscriber_buffer"));
}

#[test]
fn test_missing_custom_file_is_ignored() {
    let config = config::load_with(Some(std::path::Path::new("/nonexistent/inspection-live.toml"))).unwrap();
    assert_eq!(config.server.port, AppConfig::default().server.port);
}

#[test]
fn test_env_overrides_defaults() {
    env::set_var("INSPECTION_LIVE__LIVE__LOOKUP_TIMEOUT_MS", "1234");

    let config = config::load_with(None).unwrap();
    assert_eq!(config.live.lookup_timeout_ms, 1234);

    env::remove_var("INSPECTION_LIVE__LIVE__LOOKUP_TIMEOUT_MS");
}

#[test]
fn test_ensure_sqlite_parent_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("subdir/inspection.db");
    let db_url = format!("sqlite://{}", db_path.display());

    assert!(!db_path.parent().unwrap().exists());
    config::ensure_sqlite_parent_dir(&db_url).unwrap();
    assert!(db_path.parent().unwrap().exists());
}

#[test]
fn test_ensure_sqlite_parent_dir_non_sqlite() {
    assert!(config::ensure_sqlite_parent_dir("postgres://localhost/db").is_ok());
    assert!(config::ensure_sqlite_parent_dir("sqlite::memory:").is_ok());
}
