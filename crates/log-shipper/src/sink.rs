//! Ingestion sink abstraction.
//!
//! The [`LogSink`] trait decouples delivery from the HTTP transport, so
//! production code uses [`LokiClient`] while unit tests use `MockSink`.
//!
//! ```text
//!        Deliverer
//!            │
//!        LogSink trait
//!         ┌──┴───┐
//!   LokiClient  MockSink
//!   (reqwest)   (tests)
//! ```

use std::future::Future;
use std::time::Duration;

use pgloki_core::config::SinkConfig;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::ShipperError;

/// Status and body returned by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Only read for non-204 responses.
    pub body: String,
}

/// A push endpoint accepting serialized push requests.
pub trait LogSink: Send + Sync {
    /// Submits one JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ShipperError::Transport` when no response was received
    /// (connection refused, timeout, DNS failure). A non-success status is
    /// not an error here; it is reported through [`SinkResponse::status`].
    fn push(&self, body: Vec<u8>) -> impl Future<Output = Result<SinkResponse, ShipperError>> + Send;

    /// Endpoint description used in diagnostics.
    fn endpoint(&self) -> &str;
}

/// Loki push API client built on `reqwest`.
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: reqwest::Client,
    url: String,
}

impl LokiClient {
    /// Creates a client for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ShipperError::ClientInit` if the TLS backend cannot be initialized.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ShipperError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShipperError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Creates a client from the `[sink]` section.
    pub fn from_config(config: &SinkConfig) -> Result<Self, ShipperError> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }
}

impl LogSink for LokiClient {
    async fn push(&self, body: Vec<u8>) -> Result<SinkResponse, ShipperError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ShipperError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        // 204 has no body worth reading
        let body = if status == 204 {
            String::new()
        } else {
            read_body(response).await
        };
        Ok(SinkResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Reads a non-success response body. A read failure yields a placeholder body
/// so the rejection is still reported with a reason.
async fn read_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read sink response body");
            format!("<unreadable response body: {e}>")
        }
    }
}

/// 테스트용 Mock 싱크
///
/// 받은 본문을 기록하고, 설정된 상태 코드 또는 전송 실패를 반환합니다.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockSink {
    /// 반환할 상태 코드 (기본값 204)
    pub status: Option<u16>,
    /// 반환할 응답 본문
    pub body: String,
    /// 전송 실패를 시뮬레이션할지 여부
    pub fail_transport: bool,
    /// 수신한 요청 본문
    pub received: std::sync::Mutex<Vec<Vec<u8>>>,
}

#[cfg(test)]
impl MockSink {
    /// 항상 204를 반환하는 mock을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 상태 코드와 본문을 반환하도록 설정합니다.
    pub fn with_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some(status);
        self.body = body.into();
        self
    }

    /// 전송 실패를 반환하도록 설정합니다.
    pub fn with_transport_failure(mut self) -> Self {
        self.fail_transport = true;
        self
    }

    /// 수신한 본문을 JSON으로 파싱하여 반환합니다.
    pub fn received_json(&self) -> Vec<serde_json::Value> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

#[cfg(test)]
impl LogSink for MockSink {
    async fn push(&self, body: Vec<u8>) -> Result<SinkResponse, ShipperError> {
        if self.fail_transport {
            return Err(ShipperError::Transport("connection refused".to_owned()));
        }
        self.received.lock().unwrap().push(body);
        Ok(SinkResponse {
            status: self.status.unwrap_or(204),
            body: self.body.clone(),
        })
    }

    fn endpoint(&self) -> &str {
        "mock://sink"
    }
}
