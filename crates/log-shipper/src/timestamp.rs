//! 엔트리 타임스탬프 추출 및 정규화
//!
//! 1. 엔트리 접두어에서 `timestamp` 그룹을 추출하여 고정 오프셋 시각으로 파싱
//! 2. 추출 실패 시 기본 타임스탬프로 대체 (에러가 아님)
//! 3. 클램프 정책에 따라 현재보다 과거인 시각을 현재 시각으로 대체
//!
//! 모든 시각은 Unix epoch 기준 나노초(`i64`)로 다룹니다.

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use pgloki_core::config::{ClampPolicy, SourceConfig, parse_utc_offset_secs};
use regex::Regex;

use crate::error::ShipperError;
use crate::pattern;

/// 타임스탬프 본문 형식 (타임존 약어 제외)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 해석된 타임스탬프의 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// 엔트리 접두어에서 파싱됨
    Entry,
    /// 기본 타임스탬프로 대체됨
    Default,
}

/// 추출 단계의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedTimestamp {
    /// Unix epoch 기준 나노초
    pub unix_nanos: i64,
    /// 출처
    pub source: TimestampSource,
}

/// 클램프 단계의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    /// 전송에 사용할 Unix epoch 기준 나노초
    pub unix_nanos: i64,
    /// 추출 단계의 출처
    pub source: TimestampSource,
    /// 현재 시각으로 대체되었는지 여부
    pub clamped: bool,
}

/// 엔트리 타임스탬프 해석기
///
/// 설정에서 한 번 생성되며, 이후 불변입니다.
#[derive(Debug, Clone)]
pub struct TimestampResolver {
    entry_pattern: Regex,
    zone: String,
    offset: FixedOffset,
    default_nanos: i64,
    clamp_policy: ClampPolicy,
}

impl TimestampResolver {
    /// 소스 설정과 클램프 정책으로 해석기를 생성합니다.
    ///
    /// # Errors
    /// - 엔트리 패턴이 잘못되었거나 `timestamp` 그룹이 없을 때
    /// - UTC 오프셋 형식이 잘못되었을 때
    /// - 기본 타임스탬프를 파싱할 수 없을 때
    pub fn from_config(
        source: &SourceConfig,
        clamp_policy: ClampPolicy,
    ) -> Result<Self, ShipperError> {
        let entry_pattern = pattern::compile_entry(source)?;

        let offset = parse_utc_offset_secs(&source.utc_offset)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ShipperError::Timestamp {
                value: source.utc_offset.clone(),
                reason: "invalid UTC offset".to_owned(),
            })?;

        let mut resolver = Self {
            entry_pattern,
            zone: source.zone.clone(),
            offset,
            default_nanos: 0,
            clamp_policy,
        };
        resolver.default_nanos = resolver.parse_timestamp(&source.default_timestamp)?;
        Ok(resolver)
    }

    /// 기본 타임스탬프 (Unix 나노초)
    pub fn default_nanos(&self) -> i64 {
        self.default_nanos
    }

    /// 클램프 정책
    pub fn clamp_policy(&self) -> ClampPolicy {
        self.clamp_policy
    }

    /// `YYYY-MM-DD HH:MM:SS.mmm <ZONE>` 문자열을 Unix 나노초로 파싱합니다.
    pub fn parse_timestamp(&self, text: &str) -> Result<i64, ShipperError> {
        let err = |reason: String| ShipperError::Timestamp {
            value: text.to_owned(),
            reason,
        };

        let body = text
            .trim()
            .strip_suffix(self.zone.as_str())
            .ok_or_else(|| err(format!("missing zone suffix '{}'", self.zone)))?
            .trim_end();

        let naive =
            NaiveDateTime::parse_from_str(body, TIMESTAMP_FORMAT).map_err(|e| err(e.to_string()))?;

        let local = self
            .offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| err("ambiguous local time".to_owned()))?;

        local
            .timestamp_nanos_opt()
            .ok_or_else(|| err("out of range for nanosecond precision".to_owned()))
    }

    /// 엔트리에서 타임스탬프를 추출합니다.
    ///
    /// 접두어가 패턴과 맞지 않거나 달력상 유효하지 않은 시각이면
    /// 기본 타임스탬프를 반환합니다.
    pub fn extract(&self, entry: &str) -> ExtractedTimestamp {
        let parsed = self
            .entry_pattern
            .captures(entry)
            .and_then(|caps| caps.name("timestamp"))
            .and_then(|m| self.parse_timestamp(m.as_str()).ok());

        match parsed {
            Some(unix_nanos) => ExtractedTimestamp {
                unix_nanos,
                source: TimestampSource::Entry,
            },
            None => ExtractedTimestamp {
                unix_nanos: self.default_nanos,
                source: TimestampSource::Default,
            },
        }
    }

    /// 엔트리 접두어의 프로세스 ID를 추출합니다 (패턴에 `pid` 그룹이 있을 때).
    pub fn extract_pid(&self, entry: &str) -> Option<u32> {
        self.entry_pattern
            .captures(entry)
            .and_then(|caps| caps.name("pid"))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// 클램프 정책을 적용합니다.
    ///
    /// `Now` 정책에서는 `now_nanos`보다 엄격히 이른 모든 시각이 `now_nanos`로 대체됩니다.
    pub fn clamp(&self, extracted: ExtractedTimestamp, now_nanos: i64) -> ResolvedTimestamp {
        let clamped = self.clamp_policy == ClampPolicy::Now && extracted.unix_nanos < now_nanos;
        ResolvedTimestamp {
            unix_nanos: if clamped {
                now_nanos
            } else {
                extracted.unix_nanos
            },
            source: extracted.source,
            clamped,
        }
    }

    /// 추출과 클램프를 한 번에 수행합니다.
    pub fn resolve(&self, entry: &str, now_nanos: i64) -> ResolvedTimestamp {
        self.clamp(self.extract(entry), now_nanos)
    }
}

/// 현재 벽시계 시각 (Unix 나노초)
pub fn now_unix_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
