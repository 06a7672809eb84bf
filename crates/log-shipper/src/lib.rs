//! PostgreSQL 로그 쉬퍼 -- 멀티라인 로그를 재조립하여 Loki로 전송합니다.
//!
//! # 모듈 구성
//!
//! - [`reassembler`]: 물리 라인을 논리 엔트리로 합치는 상태 머신
//! - [`pattern`]: 라인 시작 / 엔트리 접두어 정규식
//! - [`timestamp`]: 타임스탬프 추출, 기본값 대체, 클램프
//! - [`payload`]: Loki push API JSON 본문
//! - [`sink`]: 인제스트 싱크 trait 및 reqwest 기반 Loki 클라이언트
//! - [`delivery`]: 엔트리 하나의 전송 파이프라인
//! - [`scanner`]: 디렉토리 1회 스캔 (파일 단위 순차 처리)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! Shipper::scan_once
//!   └─ for file in log_dir (sorted)
//!        └─ read line -> EntryAssembler -> entry -> Deliverer -> LogSink (HTTP POST)
//!                                                     │
//!                                       TimestampResolver (default + clamp)
//! ```
//!
//! # 사용 예시
//! ```ignore
//! use pgloki_core::config::PglokiConfig;
//! use pgloki_shipper::ShipperBuilder;
//!
//! let shipper = ShipperBuilder::new().config(PglokiConfig::default()).build()?;
//! let report = shipper.scan_once().await?;
//! ```

pub mod delivery;
pub mod error;
pub mod pattern;
pub mod payload;
pub mod reassembler;
pub mod scanner;
pub mod sink;
pub mod timestamp;

// --- 주요 타입 re-export ---

// 쉬퍼
pub use scanner::{ScanReport, ShipStats, Shipper, ShipperBuilder};

// 에러
pub use error::ShipperError;

// 재조립기
pub use reassembler::{Entries, EntryAssembler, LineStart};

// 전송
pub use delivery::{Deliverer, Delivery, DeliveryOutcome};
pub use payload::PushRequest;
pub use sink::{LogSink, LokiClient, SinkResponse};
pub use timestamp::{ResolvedTimestamp, TimestampResolver, TimestampSource};
