//! Loki push API 페이로드
//!
//! ```json
//! { "streams": [ { "stream": {"job": "postgresql-logs", "source": "postgresql"},
//!                  "values": [ ["<unix-nanoseconds>", "<entry text>"] ] } ] }
//! ```
//!
//! 레이블은 `BTreeMap`이므로 키 순서가 고정되어, 같은 입력은 항상
//! 바이트 단위로 동일한 JSON을 만듭니다.

use std::collections::BTreeMap;

use serde::Serialize;

/// push 요청 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushRequest<'a> {
    /// 스트림 목록
    pub streams: Vec<PushStream<'a>>,
}

/// 레이블이 붙은 하나의 스트림
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushStream<'a> {
    /// 스트림 레이블
    pub stream: &'a BTreeMap<String, String>,
    /// `[타임스탬프(나노초 문자열), 로그 라인]` 쌍 목록
    pub values: Vec<(String, &'a str)>,
}

impl<'a> PushRequest<'a> {
    /// 단일 스트림, 단일 값 요청을 생성합니다.
    pub fn single(labels: &'a BTreeMap<String, String>, unix_nanos: i64, line: &'a str) -> Self {
        Self {
            streams: vec![PushStream {
                stream: labels,
                values: vec![(unix_nanos.to_string(), line)],
            }],
        }
    }

    /// JSON 바이트로 직렬화합니다.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert("source".to_owned(), "postgresql".to_owned());
        labels.insert("job".to_owned(), "postgresql-logs".to_owned());
        labels
    }

    #[test]
    fn serializes_to_loki_shape() {
        let labels = labels();
        let body = PushRequest::single(&labels, 1_734_994_800_000_000_000, "LOG: hello")
            .to_json()
            .unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"streams":[{"stream":{"job":"postgresql-logs","source":"postgresql"},"values":[["1734994800000000000","LOG: hello"]]}]}"#
        );
    }

    #[test]
    fn entry_text_is_escaped_not_altered() {
        let labels = labels();
        let line = "LOG: \"quoted\"\ttab \\ backslash ünïcode";
        let body = PushRequest::single(&labels, 1, line).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["streams"][0]["values"][0][1], line);
        assert_eq!(parsed["streams"][0]["values"][0][0], "1");
    }

    #[test]
    fn identical_inputs_give_identical_bytes() {
        let labels = labels();
        let a = PushRequest::single(&labels, 42, "entry").to_json().unwrap();
        let b = PushRequest::single(&labels, 42, "entry").to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_timestamp_is_decimal_string() {
        let labels = labels();
        let request = PushRequest::single(&labels, -5, "x");
        assert_eq!(request.streams[0].values[0].0, "-5");
    }
}
