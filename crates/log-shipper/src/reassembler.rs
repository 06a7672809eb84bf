//! 멀티라인 엔트리 재조립기
//!
//! PostgreSQL은 하나의 로그 레코드(예: 긴 SQL 문, `DETAIL`/`CONTEXT` 줄)를
//! 여러 물리 라인에 걸쳐 기록합니다. [`EntryAssembler`]는 라인 시작 패턴으로
//! 경계를 감지하여 물리 라인을 논리 엔트리로 합칩니다.
//!
//! # 상태 전이
//! ```text
//!            start line                   start line (emit buffer)
//!   Idle ───────────────> Accumulating <──────────────┐
//!     │                      │    │                    │
//!     │ non-empty line       │    └────────────────────┘
//!     └─────────────────────>│ continuation: buffer += " " + line
//!                            │
//!                  end of input: emit buffer
//! ```
//!
//! 첫 시작 라인 이전의 라인들도 하나의 엔트리로 방출됩니다. 버려지는 것은
//! 누적이 시작되기 전의 빈 라인뿐이며, 빈 엔트리는 방출되지 않습니다.

use pgloki_core::config::SourceConfig;
use regex::Regex;

use crate::error::ShipperError;
use crate::pattern;

/// 엔트리 경계 감지 패턴
#[derive(Debug, Clone)]
pub struct LineStart {
    regex: Regex,
}

impl LineStart {
    /// 정규식 문자열에서 생성합니다.
    pub fn new(pattern: &str) -> Result<Self, ShipperError> {
        let regex = Regex::new(pattern).map_err(|e| ShipperError::Pattern {
            field: "source.line_start_pattern".to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// 소스 설정(타임존 약어 또는 명시적 패턴)에서 생성합니다.
    pub fn from_config(source: &SourceConfig) -> Result<Self, ShipperError> {
        Ok(Self {
            regex: pattern::compile_line_start(source)?,
        })
    }

    /// 라인이 새 엔트리를 시작하는지 확인합니다.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// 재조립기 상태
#[derive(Debug, Default)]
enum AssemblerState {
    /// 누적 중인 엔트리 없음
    #[default]
    Idle,
    /// 엔트리 누적 중
    Accumulating(String),
}

/// 물리 라인을 논리 엔트리로 합치는 상태 머신
///
/// 한 파일의 한 번의 패스에 묶여 있으며, 파일마다 새로 생성합니다.
#[derive(Debug)]
pub struct EntryAssembler<'a> {
    line_start: &'a LineStart,
    state: AssemblerState,
}

impl<'a> EntryAssembler<'a> {
    /// `Idle` 상태의 재조립기를 생성합니다.
    pub fn new(line_start: &'a LineStart) -> Self {
        Self {
            line_start,
            state: AssemblerState::Idle,
        }
    }

    /// 라인 하나를 입력합니다 (라인 종결자는 제거된 상태).
    ///
    /// 이 라인이 새 엔트리를 시작하여 이전 엔트리가 완성되면 그 엔트리를 반환합니다.
    /// `Idle` 상태의 빈 라인은 무시합니다.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if self.line_start.is_match(line) {
            let started = line.trim().to_owned();
            match std::mem::replace(&mut self.state, AssemblerState::Accumulating(started)) {
                AssemblerState::Accumulating(done) => non_empty(done),
                AssemblerState::Idle => None,
            }
        } else {
            match &mut self.state {
                AssemblerState::Accumulating(buffer) => {
                    buffer.push(' ');
                    buffer.push_str(line);
                }
                AssemblerState::Idle if line.is_empty() => {}
                AssemblerState::Idle => {
                    self.state = AssemblerState::Accumulating(line.to_owned());
                }
            }
            None
        }
    }

    /// 입력 종료 시 누적 중인 엔트리를 반환하고 `Idle`로 돌아갑니다.
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            AssemblerState::Accumulating(done) => non_empty(done),
            AssemblerState::Idle => None,
        }
    }
}

fn non_empty(entry: String) -> Option<String> {
    (!entry.is_empty()).then_some(entry)
}

/// 라인 이터레이터를 논리 엔트리 이터레이터로 변환합니다.
///
/// [`EntryAssembler`]의 동기 이터레이터 형태입니다. 비동기 파일 읽기는
/// [`crate::scanner`]가 같은 상태 머신을 직접 구동합니다.
///
/// 지연 평가되며, 입력을 끝까지 소비하면 `None`을 계속 반환합니다.
pub struct Entries<'a, I> {
    lines: I,
    assembler: EntryAssembler<'a>,
    exhausted: bool,
}

impl<'a, I> Entries<'a, I> {
    /// 새 엔트리 이터레이터를 생성합니다.
    pub fn new(lines: I, line_start: &'a LineStart) -> Self {
        Self {
            lines,
            assembler: EntryAssembler::new(line_start),
            exhausted: false,
        }
    }
}

impl<I, S> Iterator for Entries<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        for line in self.lines.by_ref() {
            if let Some(entry) = self.assembler.push_line(line.as_ref()) {
                return Some(entry);
            }
        }
        self.exhausted = true;
        self.assembler.finish()
    }
}

impl<I, S> std::iter::FusedIterator for Entries<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

/// 라인 끝의 `\n` 또는 `\r\n`을 제거합니다.
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
