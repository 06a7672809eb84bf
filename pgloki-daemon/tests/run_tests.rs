//! One-shot scan tests against a mock push endpoint.

use mockito::Server;
use pgloki_core::config::PglokiConfig;
use pgloki_daemon::app;

const PUSH_PATH: &str = "/loki/api/v1/push";

fn config_for(log_dir: &std::path::Path, url: String) -> PglokiConfig {
    let mut config = PglokiConfig::default();
    config.source.log_dir = log_dir.display().to_string();
    config.sink.url = url;
    config.sink.timeout_secs = 5;
    config
}

#[tokio::test]
async fn test_run_ships_all_entries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .with_status(204)
        .expect(3)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("postgresql-1.log"),
        "2024-12-24 10:00:00.000 CET [1] LOG: a\n\tcontinued\n2024-12-24 10:00:01.000 CET [1] LOG: b\n",
    )
    .expect("write log");
    std::fs::write(
        dir.path().join("postgresql-2.log"),
        "2024-12-24 11:00:00.000 CET [2] LOG: c\n",
    )
    .expect("write log");

    let config = config_for(dir.path(), format!("{}{PUSH_PATH}", server.url()));
    let report = app::run(&config).await.expect("run should succeed");

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.stats.entries, 3);
    assert_eq!(report.stats.delivered, 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_run_fails_on_missing_log_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_for(
        &dir.path().join("does-not-exist"),
        "http://127.0.0.1:1/loki/api/v1/push".to_owned(),
    );

    let err = app::run(&config).await.expect_err("missing dir is fatal");
    assert!(format!("{err:#}").contains("does-not-exist"));
}

#[test]
fn test_build_shipper_rejects_bad_pattern() {
    let mut config = PglokiConfig::default();
    config.source.line_start_pattern = Some("([unclosed".to_owned());
    assert!(app::build_shipper(&config).is_err());
}
