//! 엔트리 전송 파이프라인
//!
//! [`Deliverer`]는 논리 엔트리 하나를 받아 다음 단계를 수행합니다.
//!
//! ```text
//! entry -> extract timestamp -> clamp -> PushRequest -> LogSink::push -> DeliveryOutcome
//!              (default on miss)   (now)     (fixed labels)   (one attempt)
//! ```
//!
//! 전송 실패는 호출자에게 에러로 전파되지 않습니다. 싱크 거절과 전송 실패 모두
//! 로그로 남기고 [`DeliveryOutcome`]으로 보고한 뒤 엔트리를 버립니다 (재시도 없음).

use std::collections::BTreeMap;

use metrics::counter;
use pgloki_core::metrics as m;
use tracing::{debug, error, info, warn};

use crate::payload::PushRequest;
use crate::sink::LogSink;
use crate::timestamp::{ResolvedTimestamp, TimestampResolver, TimestampSource, now_unix_nanos};

/// 싱크가 성공으로 간주하는 유일한 상태 코드
pub const SUCCESS_STATUS: u16 = 204;

/// 전송 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 싱크가 204로 수락함
    Delivered,
    /// 싱크가 204 이외의 상태로 응답함
    Rejected {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },
    /// 응답을 받지 못함 (연결 거부, 타임아웃, DNS 실패 등)
    TransportFailed {
        /// 실패 사유
        reason: String,
    },
}

impl DeliveryOutcome {
    /// 전송 성공 여부
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// 엔트리 하나의 전송 보고
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// 전송에 사용된 타임스탬프
    pub timestamp: ResolvedTimestamp,
    /// 전송 결과
    pub outcome: DeliveryOutcome,
}

/// 전송 직전 상태의 엔트리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPush {
    /// 해석된 타임스탬프
    pub timestamp: ResolvedTimestamp,
    /// 직렬화된 push 본문
    pub body: Vec<u8>,
}

/// 엔트리 전송기
///
/// 타임스탬프 해석기, 고정 레이블, 싱크를 소유합니다.
pub struct Deliverer<S> {
    resolver: TimestampResolver,
    labels: BTreeMap<String, String>,
    sink: S,
}

impl<S: LogSink> Deliverer<S> {
    /// 새 전송기를 생성합니다.
    pub fn new(resolver: TimestampResolver, labels: BTreeMap<String, String>, sink: S) -> Self {
        Self {
            resolver,
            labels,
            sink,
        }
    }

    /// 싱크에 대한 참조를 반환합니다.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 타임스탬프 해석기에 대한 참조를 반환합니다.
    pub fn resolver(&self) -> &TimestampResolver {
        &self.resolver
    }

    /// 주어진 현재 시각 기준으로 타임스탬프를 해석하고 push 본문을 만듭니다.
    ///
    /// 같은 엔트리와 같은 `now_nanos`에 대해 항상 같은 바이트를 만듭니다.
    pub fn prepare(&self, entry: &str, now_nanos: i64) -> PreparedPush {
        let timestamp = self.resolver.resolve(entry, now_nanos);
        let request = PushRequest::single(&self.labels, timestamp.unix_nanos, entry);
        // 문자열 키 맵과 문자열 값만 직렬화하므로 실패하지 않음
        let body = request.to_json().unwrap_or_default();
        PreparedPush { timestamp, body }
    }

    /// 엔트리 하나를 전송합니다.
    ///
    /// 한 번만 시도하며, 어떤 실패도 에러로 반환하지 않습니다.
    pub async fn deliver(&self, entry: &str) -> Delivery {
        let prepared = self.prepare(entry, now_unix_nanos());
        let timestamp = prepared.timestamp;
        let pid = self.resolver.extract_pid(entry);

        if timestamp.source == TimestampSource::Default {
            counter!(m::TIMESTAMP_FALLBACKS_TOTAL).increment(1);
            debug!(
                default_nanos = self.resolver.default_nanos(),
                "entry has no parsable prefix, using default timestamp"
            );
        }
        if timestamp.clamped {
            counter!(m::TIMESTAMPS_CLAMPED_TOTAL).increment(1);
            info!(
                timestamp_ns = timestamp.unix_nanos,
                "log timestamp is in the past, using current time instead"
            );
        }

        let outcome = match self.sink.push(prepared.body).await {
            Ok(response) if response.status == SUCCESS_STATUS => {
                counter!(m::ENTRIES_DELIVERED_TOTAL).increment(1);
                info!(
                    endpoint = self.sink.endpoint(),
                    pid,
                    bytes = entry.len(),
                    "log sent successfully"
                );
                DeliveryOutcome::Delivered
            }
            Ok(response) => {
                counter!(m::ENTRIES_REJECTED_TOTAL).increment(1);
                warn!(
                    endpoint = self.sink.endpoint(),
                    pid,
                    status = response.status,
                    body = response.body.as_str(),
                    "sink rejected log entry, dropping"
                );
                DeliveryOutcome::Rejected {
                    status: response.status,
                    body: response.body,
                }
            }
            Err(e) => {
                counter!(m::TRANSPORT_ERRORS_TOTAL).increment(1);
                error!(
                    endpoint = self.sink.endpoint(),
                    pid,
                    error = %e,
                    "failed to send log entry, dropping"
                );
                DeliveryOutcome::TransportFailed {
                    reason: e.to_string(),
                }
            }
        };

        Delivery { timestamp, outcome }
    }
}
