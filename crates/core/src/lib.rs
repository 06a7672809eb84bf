//! pgloki 공통 크레이트 -- 설정, 에러, 메트릭 이름
//!
//! - [`config`]: `pgloki.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 카운터 이름 상수

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, PglokiError, PipelineError};

// 설정
pub use config::{ClampPolicy, GeneralConfig, PglokiConfig, SinkConfig, SourceConfig};
