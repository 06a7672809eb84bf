//! 설정 관리 -- pgloki.toml 파싱 및 런타임 설정
//!
//! [`PglokiConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//! 시작 시 한 번 생성되고 이후에는 변경되지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PGLOKI_SINK_URL=http://loki:3100/...` 형식)
//! 3. 설정 파일 (`pgloki.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pgloki_core::error::PglokiError> {
//! use pgloki_core::config::PglokiConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PglokiConfig::load("pgloki.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PglokiConfig::parse("[sink]\nurl = \"http://loki:3100/loki/api/v1/push\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PglokiError};

/// HTTP 타임아웃 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 300;

/// pgloki 통합 설정
///
/// `pgloki.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PglokiConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 인제스트 싱크 설정
    #[serde(default)]
    pub sink: SinkConfig,
}

impl PglokiConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PglokiError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PglokiError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PglokiError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PglokiError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PglokiError> {
        toml::from_str(toml_str).map_err(|e| {
            PglokiError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PGLOKI_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PGLOKI_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PGLOKI_GENERAL_LOG_FORMAT");

        // Source
        override_string(&mut self.source.log_dir, "PGLOKI_SOURCE_LOG_DIR");
        override_string(&mut self.source.zone, "PGLOKI_SOURCE_ZONE");
        override_string(&mut self.source.utc_offset, "PGLOKI_SOURCE_UTC_OFFSET");
        override_string(
            &mut self.source.default_timestamp,
            "PGLOKI_SOURCE_DEFAULT_TIMESTAMP",
        );

        // Sink
        override_string(&mut self.sink.url, "PGLOKI_SINK_URL");
        override_u64(&mut self.sink.timeout_secs, "PGLOKI_SINK_TIMEOUT_SECS");
        if let Ok(val) = std::env::var("PGLOKI_SINK_CLAMP_POLICY") {
            match ClampPolicy::from_name(&val) {
                Some(policy) => self.sink.clamp_policy = policy,
                None => warn!(
                    env_key = "PGLOKI_SINK_CLAMP_POLICY",
                    value = val.as_str(),
                    "unknown clamp policy in env var, ignoring"
                ),
            }
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PglokiError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.source.log_dir.trim().is_empty() {
            return Err(invalid("source.log_dir", "must not be empty"));
        }

        let zone = self.source.zone.as_str();
        if zone.is_empty() || zone.len() > 5 || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(
                "source.zone",
                format!("'{zone}' must be 1-5 ASCII letters"),
            ));
        }

        if parse_utc_offset_secs(&self.source.utc_offset).is_none() {
            return Err(invalid(
                "source.utc_offset",
                format!("'{}' must look like +HH:MM or -HH:MM", self.source.utc_offset),
            ));
        }

        if self.source.default_timestamp.trim().is_empty() {
            return Err(invalid("source.default_timestamp", "must not be empty"));
        }

        if !(self.sink.url.starts_with("http://") || self.sink.url.starts_with("https://")) {
            return Err(invalid(
                "sink.url",
                format!("'{}' must start with http:// or https://", self.sink.url),
            ));
        }

        if self.sink.timeout_secs == 0 || self.sink.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "sink.timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.sink.labels.is_empty() {
            return Err(invalid("sink.labels", "at least one stream label is required"));
        }
        if self.sink.labels.keys().any(|k| k.trim().is_empty()) {
            return Err(invalid("sink.labels", "label names must not be empty"));
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 로그 소스 설정
///
/// 라인 시작 패턴과 추출 패턴은 `zone`에서 파생되며,
/// 필요한 경우에만 명시적으로 덮어씁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 로그 파일 디렉토리
    pub log_dir: String,
    /// 로그 라인에 찍히는 타임존 약어 (예: CET)
    pub zone: String,
    /// 타임존 약어에 대응하는 고정 UTC 오프셋 (예: +01:00)
    pub utc_offset: String,
    /// 접두어 추출 실패 시 사용하는 타임스탬프
    pub default_timestamp: String,
    /// 엔트리 경계 감지 패턴 오버라이드
    pub line_start_pattern: Option<String>,
    /// 타임스탬프 추출 패턴 오버라이드 (`timestamp` 이름 그룹 필수)
    pub entry_pattern: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            log_dir: "/var/lib/postgresql/data/log".to_owned(),
            zone: "CET".to_owned(),
            utc_offset: "+01:00".to_owned(),
            default_timestamp: "2024-12-24 00:00:00.000 CET".to_owned(),
            line_start_pattern: None,
            entry_pattern: None,
        }
    }
}

/// 과거 타임스탬프 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    /// 현재 시각보다 이른 타임스탬프를 현재 시각으로 대체 (기본값)
    #[default]
    Now,
    /// 파싱된 타임스탬프를 그대로 사용
    Preserve,
}

impl ClampPolicy {
    /// 이름으로 정책을 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "now" => Some(Self::Now),
            "preserve" => Some(Self::Preserve),
            _ => None,
        }
    }
}

/// 인제스트 싱크 (Loki push API) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// push 엔드포인트 URL
    pub url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 과거 타임스탬프 처리 정책
    pub clamp_policy: ClampPolicy,
    /// 모든 엔트리에 붙는 고정 스트림 레이블
    pub labels: BTreeMap<String, String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("job".to_owned(), "postgresql-logs".to_owned());
        labels.insert("source".to_owned(), "postgresql".to_owned());
        Self {
            url: "http://localhost:3100/loki/api/v1/push".to_owned(),
            timeout_secs: 10,
            clamp_policy: ClampPolicy::Now,
            labels,
        }
    }
}

/// `+HH:MM` / `-HH:MM` 형식의 오프셋을 초 단위로 변환합니다.
pub fn parse_utc_offset_secs(offset: &str) -> Option<i32> {
    let offset = offset.trim();
    let (sign, rest) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn invalid(field: &str, reason: impl Into<String>) -> PglokiError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
