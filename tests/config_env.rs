// tests/config_env.rs
use std::env;
use std::fs;

use vigimanaus_ingest::config::AppConfig;
use vigimanaus_ingest::error::ConfigError;

const KEYS: [&str; 8] = [
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "INGEST_CONFIG_PATH",
];

fn clear_env() {
    for k in KEYS {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn missing_key_fails_before_anything_else() {
    clear_env();
    env::set_var("DB_USER", "postgres");
    env::set_var("DB_PASSWORD", "postgres");

    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing("GEMINI_API_KEY")));
    assert!(err.to_string().contains("GEMINI_API_KEY"));
    clear_env();
}

#[serial_test::serial]
#[test]
fn explicit_pipeline_file_overrides_defaults() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("ingest.toml");
    fs::write(
        &p,
        r#"
reports_path = "/data/gds.json"
request_delay_secs = 0
signal_table = "sinais_dois"
"#,
    )
    .unwrap();

    env::set_var("GEMINI_API_KEY", "k");
    env::set_var("DB_USER", "u");
    env::set_var("DB_PASSWORD", "p");
    env::set_var("DB_PORT", "5432");
    env::set_var("INGEST_CONFIG_PATH", p.display().to_string());

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.db.port, 5432);
    assert_eq!(cfg.pipeline.signal_table, "sinais_dois");
    assert_eq!(cfg.pipeline.request_delay_secs, 0);
    assert_eq!(cfg.pipeline.reports_path, std::path::PathBuf::from("/data/gds.json"));
    clear_env();
}

#[serial_test::serial]
#[test]
fn explicit_pipeline_file_must_exist() {
    clear_env();
    env::set_var("GEMINI_API_KEY", "k");
    env::set_var("DB_USER", "u");
    env::set_var("DB_PASSWORD", "p");
    env::set_var("INGEST_CONFIG_PATH", "/nonexistent/ingest.toml");

    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::File { .. }));
    clear_env();
}
