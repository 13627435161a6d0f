use std::path::PathBuf;

use tm_domain::config::Config;

#[test]
fn default_backend_is_local() {
    let config = Config::default();
    assert_eq!(config.backend.base_url, "http://localhost:7860");
    assert_eq!(config.backend.default_api_prefix, "/gradio_api");
    assert!(config.backend.api_prefix.is_none());
}

#[test]
fn empty_document_yields_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.backend.request_timeout_ms, 10_000);
    assert_eq!(config.backend.call_timeout_ms, 300_000);
    assert_eq!(config.downloads.dir, PathBuf::from("."));
    assert!(!config.observability.json_logs);
}

#[test]
fn backend_section_parses() {
    let toml_str = r#"
[backend]
base_url = "https://modeler.example.com"
api_prefix = ""
call_timeout_ms = 60000
auth_token_env = "TM_TOKEN"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.backend.base_url, "https://modeler.example.com");
    assert_eq!(config.backend.api_prefix.as_deref(), Some(""));
    assert_eq!(config.backend.call_timeout_ms, 60_000);
    assert_eq!(config.backend.auth_token_env.as_deref(), Some("TM_TOKEN"));
    // Unset fields keep their defaults.
    assert_eq!(config.backend.request_timeout_ms, 10_000);
}

#[test]
fn downloads_and_logging_parse() {
    let toml_str = r#"
[downloads]
dir = "/tmp/exports"

[observability]
json_logs = true
filter = "debug"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.downloads.dir, PathBuf::from("/tmp/exports"));
    assert!(config.observability.json_logs);
    assert_eq!(config.observability.filter, "debug");
}
