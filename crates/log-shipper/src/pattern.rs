//! 로그 라인 접두어 패턴
//!
//! PostgreSQL `log_line_prefix = '%m [%p] '` 형식의 접두어를 다룹니다.
//!
//! ```text
//! 2024-12-24 10:00:00.000 CET [123] LOG:  statement: ...
//! └──────── %m (밀리초) ─────┘ └%p┘
//! ```
//!
//! 두 패턴 모두 타임존 약어로부터 파생되며, 설정으로 덮어쓸 수 있습니다.
//! - 라인 시작 패턴: 엔트리 경계 감지용 (캡처 없음)
//! - 엔트리 패턴: `timestamp`, `pid` 이름 그룹을 캡처

use pgloki_core::config::SourceConfig;
use regex::Regex;

use crate::error::ShipperError;

const TIMESTAMP_BODY: &str = r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3}";

/// 타임존 약어에 대한 기본 라인 시작 패턴을 생성합니다.
pub fn default_line_start_pattern(zone: &str) -> String {
    format!(r"^{TIMESTAMP_BODY} {} \[\d+\]", regex::escape(zone))
}

/// 타임존 약어에 대한 기본 엔트리 패턴을 생성합니다.
pub fn default_entry_pattern(zone: &str) -> String {
    format!(
        r"^(?P<timestamp>{TIMESTAMP_BODY} {}) \[(?P<pid>\d+)\]",
        regex::escape(zone)
    )
}

/// 설정에서 라인 시작 정규식을 컴파일합니다.
pub(crate) fn compile_line_start(source: &SourceConfig) -> Result<Regex, ShipperError> {
    let pattern = source
        .line_start_pattern
        .clone()
        .unwrap_or_else(|| default_line_start_pattern(&source.zone));
    compile("source.line_start_pattern", &pattern)
}

/// 설정에서 엔트리 정규식을 컴파일합니다.
///
/// `timestamp` 이름 그룹이 없으면 실패합니다.
pub(crate) fn compile_entry(source: &SourceConfig) -> Result<Regex, ShipperError> {
    let pattern = source
        .entry_pattern
        .clone()
        .unwrap_or_else(|| default_entry_pattern(&source.zone));
    let regex = compile("source.entry_pattern", &pattern)?;
    if !regex.capture_names().flatten().any(|name| name == "timestamp") {
        return Err(ShipperError::Pattern {
            field: "source.entry_pattern".to_owned(),
            reason: "missing named group 'timestamp'".to_owned(),
        });
    }
    Ok(regex)
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ShipperError> {
    Regex::new(pattern).map_err(|e| ShipperError::Pattern {
        field: field.to_owned(),
        reason: e.to_string(),
    })
}
