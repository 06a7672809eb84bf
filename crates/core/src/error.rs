//! 에러 타입 -- 도메인별 에러 정의

/// pgloki 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PglokiError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 초기화/스캔 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패 (패턴 컴파일, 기본 타임스탬프 파싱 등)
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 디렉토리 스캔 실패
    #[error("scan failed: {0}")]
    ScanFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_pgloki_error() {
        let err: PglokiError = ConfigError::FileNotFound {
            path: "/etc/pgloki/pgloki.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, PglokiError::Config(_)));
        assert!(err.to_string().contains("pgloki.toml"));
    }

    #[test]
    fn invalid_value_display_names_field() {
        let err = ConfigError::InvalidValue {
            field: "sink.url".to_owned(),
            reason: "must start with http:// or https://".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sink.url"));
        assert!(msg.contains("http://"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PglokiError = io.into();
        assert!(matches!(err, PglokiError::Io(_)));
    }
}
