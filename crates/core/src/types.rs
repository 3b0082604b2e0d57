//! 도메인 타입 — 정규화된 체크 결과와 플러그인 파싱 결과
//!
//! 벤더별 알림 페이로드는 포맷 플러그인을 거쳐 [`ParsedAlert`]가 되고,
//! 실패 메시지마다 하나의 [`NormalizedResult`]로 펼쳐집니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 모니터링 체크 상태 코드
///
/// 0(OK)부터 숫자가 클수록 나쁜 상태입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckStatus {
    /// 정상
    Ok,
    /// 경고
    Warning,
    /// 심각
    Critical,
    /// 알 수 없음
    Unknown,
}

impl CheckStatus {
    /// 모니터링 시스템에 전달되는 숫자 코드를 반환합니다.
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }

    /// 숫자 코드에서 상태를 복원합니다. 3 이상은 `Unknown`입니다.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Warning,
            2 => Self::Critical,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// 정규화된 체크 결과
///
/// 한 번 생성되면 변경되지 않습니다. 필드는 읽기 전용 접근자로만 노출됩니다.
/// 직렬화 형식은 `{"status":2,"name":"svc1","output":"disk full"}`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    status: u8,
    name: String,
    output: String,
}

impl NormalizedResult {
    /// 새 체크 결과를 생성합니다.
    pub fn new(status: u8, name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            output: output.into(),
        }
    }

    /// 상태 코드 (0 = OK)
    pub fn status(&self) -> u8 {
        self.status
    }

    /// 서비스 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 체크 출력 메시지
    pub fn output(&self) -> &str {
        &self.output
    }

    /// 수집기가 읽는 JSON 객체 문자열로 직렬화합니다.
    pub fn to_check_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for NormalizedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            CheckStatus::from_code(self.status),
            self.name,
            self.output
        )
    }
}

/// 포맷 플러그인의 파싱 결과
///
/// 하나의 알림 페이로드는 같은 상태와 서비스 이름을 공유하는
/// 0개 이상의 실패 메시지를 가질 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAlert {
    /// 상태 코드
    pub status: u8,
    /// 서비스 이름
    pub service: String,
    /// 실패 메시지 목록 (플러그인이 내보낸 순서)
    pub messages: Vec<String>,
}

impl ParsedAlert {
    /// 메시지마다 하나의 [`NormalizedResult`]를 만듭니다. 순서는 보존됩니다.
    pub fn into_results(self) -> Vec<NormalizedResult> {
        let Self {
            status,
            service,
            messages,
        } = self;
        messages
            .into_iter()
            .map(|message| NormalizedResult::new(status, service.clone(), message))
            .collect()
    }
}
