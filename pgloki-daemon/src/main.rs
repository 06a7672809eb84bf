use anyhow::Result;
use clap::Parser;

use pgloki_daemon::app;
use pgloki_daemon::cli::DaemonCli;
use pgloki_daemon::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드 (기본값 <- 파일 <- 환경변수 <- CLI)
    let config = app::load_config(&cli).await?;

    if cli.validate {
        // 패턴 컴파일과 HTTP 클라이언트 생성까지 확인
        app::build_shipper(&config)?;
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    pgloki_core::metrics::describe_all();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pgloki-daemon starting");

    let report = match app::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "pgloki-daemon aborted");
            return Err(e);
        }
    };

    tracing::info!(
        files = report.files_scanned,
        failed_files = report.failed_files.len(),
        entries = report.stats.entries,
        delivered = report.stats.delivered,
        rejected = report.stats.rejected,
        transport_errors = report.stats.transport_errors,
        clamped = report.stats.clamped,
        default_timestamps = report.stats.default_timestamps,
        "pgloki-daemon finished"
    );
    Ok(())
}
