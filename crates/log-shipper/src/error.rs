//! 로그 쉬퍼 에러 타입
//!
//! [`ShipperError`]는 쉬퍼 내부에서 발생하는 에러를 표현합니다.
//! `From<ShipperError> for PglokiError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 엔트리 단위의 전송 실패는 에러로 전파되지 않고
//! [`DeliveryOutcome`](crate::delivery::DeliveryOutcome)으로 보고됩니다.

use pgloki_core::error::{PglokiError, PipelineError};

/// 로그 쉬퍼 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    /// 패턴 컴파일 또는 형태 검증 실패
    #[error("pattern error: {field}: {reason}")]
    Pattern {
        /// 설정 필드명
        field: String,
        /// 실패 사유
        reason: String,
    },

    /// 타임스탬프 문자열 파싱 실패
    #[error("timestamp error: '{value}': {reason}")]
    Timestamp {
        /// 파싱하려던 값
        value: String,
        /// 실패 사유
        reason: String,
    },

    /// HTTP 클라이언트 초기화 실패
    #[error("http client init failed: {0}")]
    ClientInit(String),

    /// 네트워크 수준 전송 실패 (연결 거부, 타임아웃, DNS 등)
    #[error("transport error: {0}")]
    Transport(String),

    /// 소스 디렉토리 목록 조회 실패
    #[error("source directory error: {path}: {reason}")]
    SourceDir {
        /// 디렉토리 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ShipperError> for PglokiError {
    fn from(err: ShipperError) -> Self {
        match err {
            ShipperError::SourceDir { .. } | ShipperError::Io(_) | ShipperError::Transport(_) => {
                PglokiError::Pipeline(PipelineError::ScanFailed(err.to_string()))
            }
            _ => PglokiError::Pipeline(PipelineError::InitFailed(err.to_string())),
        }
    }
}
