//! pgloki.toml 통합 설정 테스트
//!
//! - pgloki.toml.example 파싱 테스트
//! - 파일 로딩 / 누락 파일 에러 테스트
//! - 환경변수 우선순위 테스트

use pgloki_core::config::{ClampPolicy, PglokiConfig};
use pgloki_core::error::{ConfigError, PglokiError};

// =============================================================================
// pgloki.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../pgloki.toml.example");
    let config = PglokiConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.source.log_dir, "/var/lib/postgresql/data/log");
    assert_eq!(config.source.zone, "CET");
    assert_eq!(config.sink.timeout_secs, 10);
    assert_eq!(config.sink.clamp_policy, ClampPolicy::Now);
    assert_eq!(config.sink.labels["job"], "postgresql-logs");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../pgloki.toml.example");
    let config = PglokiConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn custom_labels_replace_defaults() {
    let toml = r#"
[sink.labels]
job = "pg-primary"
"#;
    let config = PglokiConfig::parse(toml).expect("should parse");
    assert_eq!(config.sink.labels.len(), 1);
    assert_eq!(config.sink.labels["job"], "pg-primary");
}

#[test]
fn pattern_overrides_are_kept_verbatim() {
    let toml = r#"
[source]
line_start_pattern = '^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3} UTC'
"#;
    let config = PglokiConfig::parse(toml).expect("should parse");
    assert_eq!(
        config.source.line_start_pattern.as_deref(),
        Some(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3} UTC")
    );
    assert!(config.source.entry_pattern.is_none());
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn load_missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = PglokiConfig::load(dir.path().join("absent.toml"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PglokiError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_reads_and_validates_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pgloki.toml");
    std::fs::write(
        &path,
        "[source]\nlog_dir = \"/tmp/pglog\"\n[sink]\nurl = \"http://loki:3100/loki/api/v1/push\"\n",
    )
    .expect("write config");

    let config = PglokiConfig::load(&path).await.expect("should load");
    assert_eq!(config.source.log_dir, "/tmp/pglog");
    assert_eq!(config.sink.url, "http://loki:3100/loki/api/v1/push");
}

#[tokio::test]
#[serial_test::serial]
async fn load_rejects_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pgloki.toml");
    std::fs::write(&path, "[sink]\ntimeout_secs = 0\n").expect("write config");

    let err = PglokiConfig::load(&path).await.unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

fn restore(key: &str, original: Option<String>) {
    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
}

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[sink]
url = "http://from-file:3100/loki/api/v1/push"
"#;

    let original = std::env::var("PGLOKI_SINK_URL").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("PGLOKI_SINK_URL", "http://from-env:3100/loki/api/v1/push");
    }

    let mut config = PglokiConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.sink.url.clone();

    restore("PGLOKI_SINK_URL", original);
    assert_eq!(result, "http://from-env:3100/loki/api/v1/push");
}

#[test]
#[serial_test::serial]
fn env_override_clamp_policy() {
    let original = std::env::var("PGLOKI_SINK_CLAMP_POLICY").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("PGLOKI_SINK_CLAMP_POLICY", "preserve");
    }

    let mut config = PglokiConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.sink.clamp_policy;

    restore("PGLOKI_SINK_CLAMP_POLICY", original);
    assert_eq!(result, ClampPolicy::Preserve);
}

#[test]
#[serial_test::serial]
fn env_override_unknown_clamp_policy_is_ignored() {
    let original = std::env::var("PGLOKI_SINK_CLAMP_POLICY").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("PGLOKI_SINK_CLAMP_POLICY", "sometimes");
    }

    let mut config = PglokiConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.sink.clamp_policy;

    restore("PGLOKI_SINK_CLAMP_POLICY", original);
    assert_eq!(result, ClampPolicy::Now);
}

#[test]
#[serial_test::serial]
fn env_override_numeric_timeout() {
    let original = std::env::var("PGLOKI_SINK_TIMEOUT_SECS").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("PGLOKI_SINK_TIMEOUT_SECS", "42");
    }

    let mut config = PglokiConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.sink.timeout_secs;

    restore("PGLOKI_SINK_TIMEOUT_SECS", original);
    assert_eq!(result, 42);
}
