use std::{fs, time::Duration};

use aryantra_config::{
    ConfigLoadError, ConfigLoader,
    constants::DEFAULT_PORT,
    models::PortSource,
    sources::EnvConfig,
};
use tempfile::tempdir;

const SAMPLE: &str = r#"
dev_mode = false

[server]
host = "127.0.0.1"
port = 4100

[relay]
upstream_url = "https://forms.example.com/intake"
timeout_secs = 5

[cors]
allowed_origins = ["https://aryantra.example"]
"#;

#[test]
fn file_values_are_used_when_env_is_silent() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("aryantra.toml");
    fs::write(&path, SAMPLE).expect("write config");

    let load = ConfigLoader::new()
        .without_env_file()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect("load");
    let config = load.config;

    assert_eq!(config.server.bind_address(), "127.0.0.1:4100");
    assert_eq!(config.metadata.port_source, PortSource::File);
    assert_eq!(
        config.relay.upstream_url.as_str(),
        "https://forms.example.com/intake"
    );
    assert_eq!(config.relay.timeout, Duration::from_secs(5));
    assert!(!config.cors.is_permissive());
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
    assert!(
        load.warnings.is_empty(),
        "a locked-down https config should not warn: {:?}",
        load.warnings
    );
}

#[test]
fn env_overrides_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("aryantra.toml");
    fs::write(&path, SAMPLE).expect("write config");

    let env = EnvConfig {
        port: Some(5555),
        upstream_url: Some("http://127.0.0.1:9999/stub".into()),
        dev_mode: Some(true),
        ..EnvConfig::default()
    };
    let load = ConfigLoader::new()
        .without_env_file()
        .with_config_path(&path)
        .load_with_env(env)
        .expect("load");

    assert_eq!(load.config.server.port, 5555);
    assert_eq!(load.config.server.host, "127.0.0.1");
    assert!(load.config.relay.is_plain_http());
    assert!(load.config.dev_mode);
    // Dev mode silences the plain-http and CORS warnings.
    assert!(load.warnings.is_empty());
}

#[test]
fn plain_http_upstream_warns_outside_dev_mode() {
    let env = EnvConfig {
        upstream_url: Some("http://intake.example.com/form".into()),
        ..EnvConfig::default()
    };
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").expect("write config");

    let load = ConfigLoader::new()
        .without_env_file()
        .with_config_path(&path)
        .load_with_env(env)
        .expect("load");

    assert_eq!(load.config.server.port, DEFAULT_PORT);
    assert!(load.warnings.contains("plain http"));
    assert!(load.warnings.contains("CORS accepts any origin"));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let err = ConfigLoader::new()
        .without_env_file()
        .with_config_path(dir.path().join("nope.toml"))
        .load_with_env(EnvConfig::default())
        .expect_err("missing explicit config");
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn malformed_toml_reports_parse_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[server\nport = ").expect("write config");

    let err = ConfigLoader::new()
        .without_env_file()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect_err("broken toml");
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}
