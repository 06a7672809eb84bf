//! 메트릭 이름 상수
//!
//! 모든 카운터 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pgloki_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pgloki_core::metrics::ENTRIES_DELIVERED_TOTAL).increment(1);
//! ```
//!
//! 레코더가 설치되지 않은 프로세스에서는 모든 카운터가 no-op입니다.

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 리어셈블러 메트릭 ────────────────────────────────────────────

/// 재조립된 논리 엔트리 수 (counter)
pub const ENTRIES_ASSEMBLED_TOTAL: &str = "pgloki_entries_assembled_total";

// ─── 전송 메트릭 ────────────────────────────────────────────────────

/// 싱크가 204로 수락한 엔트리 수 (counter)
pub const ENTRIES_DELIVERED_TOTAL: &str = "pgloki_entries_delivered_total";

/// 싱크가 204 이외 상태로 거절한 엔트리 수 (counter)
pub const ENTRIES_REJECTED_TOTAL: &str = "pgloki_entries_rejected_total";

/// 네트워크 수준 전송 실패 수 (counter)
pub const TRANSPORT_ERRORS_TOTAL: &str = "pgloki_transport_errors_total";

/// 현재 시각으로 대체된 타임스탬프 수 (counter)
pub const TIMESTAMPS_CLAMPED_TOTAL: &str = "pgloki_timestamps_clamped_total";

/// 기본 타임스탬프로 대체된 엔트리 수 (counter)
pub const TIMESTAMP_FALLBACKS_TOTAL: &str = "pgloki_timestamp_fallbacks_total";

// ─── 스캐너 메트릭 ────────────────────────────────────────────────

/// 스캔된 파일 수 (counter, label: result)
pub const FILES_SCANNED_TOTAL: &str = "pgloki_files_scanned_total";

/// 모든 카운터 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        ENTRIES_ASSEMBLED_TOTAL,
        "Logical entries reassembled from physical log lines"
    );
    describe_counter!(
        ENTRIES_DELIVERED_TOTAL,
        "Entries accepted by the ingestion sink (HTTP 204)"
    );
    describe_counter!(
        ENTRIES_REJECTED_TOTAL,
        "Entries rejected by the ingestion sink (non-204 status)"
    );
    describe_counter!(
        TRANSPORT_ERRORS_TOTAL,
        "Push attempts that failed before a response was received"
    );
    describe_counter!(
        TIMESTAMPS_CLAMPED_TOTAL,
        "Past-dated entry timestamps replaced with the current time"
    );
    describe_counter!(
        TIMESTAMP_FALLBACKS_TOTAL,
        "Entries without a parsable prefix that used the default timestamp"
    );
    describe_counter!(
        FILES_SCANNED_TOTAL,
        "Log files processed per scan, labeled by result"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        let names = [
            ENTRIES_ASSEMBLED_TOTAL,
            ENTRIES_DELIVERED_TOTAL,
            ENTRIES_REJECTED_TOTAL,
            TRANSPORT_ERRORS_TOTAL,
            TIMESTAMPS_CLAMPED_TOTAL,
            TIMESTAMP_FALLBACKS_TOTAL,
            FILES_SCANNED_TOTAL,
        ];
        for name in names {
            assert!(name.starts_with("pgloki_"), "{name}");
            assert!(name.ends_with("_total"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
