//! 디렉토리 스캔 -- 한 번의 패스로 모든 로그 파일을 전송합니다.
//!
//! [`Shipper::scan_once`]는 소스 디렉토리의 일반 파일을 파일명 순서로 하나씩 열어,
//! 라인을 읽는 즉시 재조립기에 넣고, 완성된 엔트리를 다음 라인을 읽기 전에 전송합니다.
//!
//! ```text
//! read_dir -> [file] -> read line -> EntryAssembler -> entry -> Deliverer -> LogSink
//!                ^                                                  │
//!                └──────────────── next line / next file ───────────┘
//! ```
//!
//! 파일 오프셋은 저장하지 않으므로 매 스캔마다 파일 처음부터 다시 전송합니다.

use std::path::{Path, PathBuf};
use std::time::Duration;

use metrics::counter;
use pgloki_core::config::PglokiConfig;
use pgloki_core::metrics as m;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::delivery::{Deliverer, Delivery, DeliveryOutcome};
use crate::error::ShipperError;
use crate::reassembler::{EntryAssembler, LineStart, strip_line_terminator};
use crate::sink::{LogSink, LokiClient};
use crate::timestamp::{TimestampResolver, TimestampSource};

/// 전송 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipStats {
    /// 재조립된 엔트리 수
    pub entries: u64,
    /// 싱크가 수락한 엔트리 수
    pub delivered: u64,
    /// 싱크가 거절한 엔트리 수
    pub rejected: u64,
    /// 전송 실패 수
    pub transport_errors: u64,
    /// 현재 시각으로 대체된 타임스탬프 수
    pub clamped: u64,
    /// 기본 타임스탬프를 사용한 엔트리 수
    pub default_timestamps: u64,
}

impl ShipStats {
    /// 전송 결과 하나를 기록합니다.
    pub fn record(&mut self, delivery: &Delivery) {
        self.entries += 1;
        match delivery.outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Rejected { .. } => self.rejected += 1,
            DeliveryOutcome::TransportFailed { .. } => self.transport_errors += 1,
        }
        if delivery.timestamp.clamped {
            self.clamped += 1;
        }
        if delivery.timestamp.source == TimestampSource::Default {
            self.default_timestamps += 1;
        }
    }

    /// 다른 통계를 합칩니다.
    pub fn merge(&mut self, other: &ShipStats) {
        self.entries += other.entries;
        self.delivered += other.delivered;
        self.rejected += other.rejected;
        self.transport_errors += other.transport_errors;
        self.clamped += other.clamped;
        self.default_timestamps += other.default_timestamps;
    }
}

/// 한 번의 스캔 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 끝까지 읽은 파일 수
    pub files_scanned: u64,
    /// 열기/읽기에 실패한 파일 경로
    pub failed_files: Vec<PathBuf>,
    /// 엔트리 전송 통계
    pub stats: ShipStats,
}

/// 로그 쉬퍼
///
/// 설정에서 한 번 조립되며, 스캔 사이에 상태를 유지하지 않습니다.
pub struct Shipper<S> {
    log_dir: PathBuf,
    line_start: LineStart,
    deliverer: Deliverer<S>,
}

impl<S: LogSink> Shipper<S> {
    /// 소스 디렉토리 경로를 반환합니다.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// 전송기에 대한 참조를 반환합니다.
    pub fn deliverer(&self) -> &Deliverer<S> {
        &self.deliverer
    }

    /// 소스 디렉토리를 한 번 스캔하여 모든 파일의 엔트리를 전송합니다.
    ///
    /// 개별 파일의 열기/읽기 실패는 경고로 남기고 다음 파일로 넘어갑니다.
    ///
    /// # Errors
    /// 소스 디렉토리 목록을 읽을 수 없으면 `ShipperError::SourceDir`를 반환합니다.
    pub async fn scan_once(&self) -> Result<ScanReport, ShipperError> {
        let files = list_log_files(&self.log_dir).await?;
        info!(
            dir = %self.log_dir.display(),
            files = files.len(),
            "starting scan"
        );

        let mut report = ScanReport::default();
        for path in files {
            match self.ship_file(&path).await {
                Ok(stats) => {
                    counter!(m::FILES_SCANNED_TOTAL, m::LABEL_RESULT => "success").increment(1);
                    debug!(
                        file = %path.display(),
                        entries = stats.entries,
                        delivered = stats.delivered,
                        "file shipped"
                    );
                    report.files_scanned += 1;
                    report.stats.merge(&stats);
                }
                Err(e) => {
                    counter!(m::FILES_SCANNED_TOTAL, m::LABEL_RESULT => "failure").increment(1);
                    warn!(file = %path.display(), error = %e, "failed to read log file, skipping");
                    report.failed_files.push(path);
                }
            }
        }

        info!(
            files = report.files_scanned,
            failed_files = report.failed_files.len(),
            entries = report.stats.entries,
            delivered = report.stats.delivered,
            rejected = report.stats.rejected,
            transport_errors = report.stats.transport_errors,
            "scan complete"
        );
        Ok(report)
    }

    /// 파일 하나를 처음부터 끝까지 읽어 전송합니다.
    ///
    /// 엔트리가 완성될 때마다 다음 라인을 읽기 전에 전송합니다.
    /// 파일 핸들은 함수 종료 시 (에러 경로 포함) 해제됩니다.
    pub async fn ship_file(&self, path: &Path) -> Result<ShipStats, ShipperError> {
        let file = tokio::fs::File::open(path).await?;
        let mut reader = BufReader::new(file);
        let mut assembler = EntryAssembler::new(&self.line_start);
        let mut stats = ShipStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            if let Some(entry) = assembler.push_line(strip_line_terminator(&text)) {
                self.ship_entry(&entry, &mut stats).await;
            }
        }

        if let Some(entry) = assembler.finish() {
            self.ship_entry(&entry, &mut stats).await;
        }
        Ok(stats)
    }

    async fn ship_entry(&self, entry: &str, stats: &mut ShipStats) {
        counter!(m::ENTRIES_ASSEMBLED_TOTAL).increment(1);
        let delivery = self.deliverer.deliver(entry).await;
        stats.record(&delivery);
    }
}

/// 디렉토리의 일반 파일 목록을 파일명 순서로 반환합니다.
///
/// 심볼릭 링크는 대상이 일반 파일일 때 포함됩니다. 하위 디렉토리는 건너뜁니다.
pub async fn list_log_files(dir: &Path) -> Result<Vec<PathBuf>, ShipperError> {
    let dir_err = |e: std::io::Error| ShipperError::SourceDir {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(dir_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(dir_err)? {
        let path = entry.path();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => debug!(path = %path.display(), error = %e, "cannot stat entry, skipping"),
        }
    }
    files.sort();
    Ok(files)
}

/// 쉬퍼 빌더
///
/// 설정 하나로 라인 시작 패턴, 타임스탬프 해석기, 싱크를 조립합니다.
#[derive(Default)]
pub struct ShipperBuilder {
    config: PglokiConfig,
}

impl ShipperBuilder {
    /// 기본 설정으로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정을 지정합니다.
    pub fn config(mut self, config: PglokiConfig) -> Self {
        self.config = config;
        self
    }

    /// 소스 디렉토리를 지정합니다.
    pub fn log_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.source.log_dir = dir.into();
        self
    }

    /// 싱크 URL을 지정합니다.
    pub fn sink_url(mut self, url: impl Into<String>) -> Self {
        self.config.sink.url = url.into();
        self
    }

    /// `[sink]` 설정으로 만든 [`LokiClient`]를 싱크로 사용하여 쉬퍼를 생성합니다.
    pub fn build(self) -> Result<Shipper<LokiClient>, ShipperError> {
        let client = LokiClient::new(
            self.config.sink.url.clone(),
            Duration::from_secs(self.config.sink.timeout_secs),
        )?;
        self.build_with_sink(client)
    }

    /// 주어진 싱크로 쉬퍼를 생성합니다.
    pub fn build_with_sink<S: LogSink>(self, sink: S) -> Result<Shipper<S>, ShipperError> {
        let PglokiConfig { source, sink: sink_config, .. } = self.config;
        let line_start = LineStart::from_config(&source)?;
        let resolver = TimestampResolver::from_config(&source, sink_config.clamp_policy)?;
        Ok(Shipper {
            log_dir: PathBuf::from(source.log_dir),
            line_start,
            deliverer: Deliverer::new(resolver, sink_config.labels, sink),
        })
    }
}
