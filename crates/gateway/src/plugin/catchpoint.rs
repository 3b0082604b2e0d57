//! Catchpoint Alerts API 플러그인
//!
//! Catchpoint 알림 푸시(XML)를 파싱하여 체크 결과로 정규화합니다.
//!
//! # 입력 형식
//! ```xml
//! <Alert version="2">
//!   <TestDetail Name="Homepage" Id="12345" Link="https://..."/>
//!   <NotificationLevel>Critical</NotificationLevel>
//!   <Failures>
//!     <Failure Node="New York - Level3">Timeout exceeded</Failure>
//!   </Failures>
//! </Alert>
//! ```
//!
//! # 상태 매핑
//! | NotificationLevel              | 상태           |
//! |--------------------------------|----------------|
//! | `Improved`, `Ok`, `3`          | OK (0)         |
//! | `Warning`, `0`                 | WARNING (1)    |
//! | `Critical`, `1`                | CRITICAL (2)   |
//! | 그 외                          | UNKNOWN (3)    |
//!
//! 실패 노드마다 메시지 하나를 만듭니다. 실패 목록이 없으면 회복 알림도
//! 수집기에 전달되도록 `"<test> is <level>"` 요약 메시지 하나를 만듭니다.

use alertrelay_core::error::PluginError;
use alertrelay_core::plugin::FormatPlugin;
use alertrelay_core::types::{CheckStatus, ParsedAlert};
use serde::Deserialize;

/// 설정 파일에서 사용하는 플러그인 이름
pub const PLUGIN_NAME: &str = "catchpoint_alerts";

#[derive(Debug, Deserialize)]
struct AlertDocument {
    #[serde(rename = "TestDetail")]
    test: TestDetail,
    #[serde(rename = "NotificationLevel")]
    level: String,
    #[serde(rename = "Failures", default)]
    failures: FailureList,
}

#[derive(Debug, Deserialize)]
struct TestDetail {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Id", default)]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FailureList {
    #[serde(rename = "Failure", default)]
    items: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
struct Failure {
    #[serde(rename = "@Node", default)]
    node: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

impl Failure {
    fn message(&self) -> Option<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        match self.node.as_deref().map(str::trim) {
            Some(node) if !node.is_empty() => Some(format!("{node}: {text}")),
            _ => Some(text.to_owned()),
        }
    }
}

/// Catchpoint 알림 레벨을 체크 상태로 변환합니다.
pub fn status_for_level(level: &str) -> CheckStatus {
    match level.trim().to_ascii_lowercase().as_str() {
        "improved" | "ok" | "3" => CheckStatus::Ok,
        "warning" | "0" => CheckStatus::Warning,
        "critical" | "1" => CheckStatus::Critical,
        _ => CheckStatus::Unknown,
    }
}

/// Catchpoint Alerts API XML 플러그인
#[derive(Debug, Default, Clone, Copy)]
pub struct CatchpointAlertPlugin;

impl CatchpointAlertPlugin {
    /// 새 플러그인 인스턴스를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_error(reason: impl Into<String>) -> PluginError {
        PluginError::Parse {
            plugin: PLUGIN_NAME.to_owned(),
            reason: reason.into(),
        }
    }
}

impl FormatPlugin for CatchpointAlertPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn parse(&self, raw: &[u8]) -> Result<ParsedAlert, PluginError> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| Self::parse_error(format!("payload is not valid UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Err(Self::parse_error("empty payload"));
        }

        let doc: AlertDocument =
            quick_xml::de::from_str(text).map_err(|e| Self::parse_error(e.to_string()))?;

        let service = doc.test.name.trim();
        if service.is_empty() {
            return Err(Self::parse_error("TestDetail Name attribute is empty"));
        }

        let status = status_for_level(&doc.level);
        let mut messages: Vec<String> = doc.failures.items.iter().filter_map(Failure::message).collect();
        if messages.is_empty() {
            messages.push(format!("{service} is {}", doc.level.trim()));
        }

        tracing::debug!(
            test = service,
            test_id = doc.test.id.as_deref().unwrap_or("-"),
            status = %status,
            messages = messages.len(),
            "catchpoint alert parsed"
        );

        Ok(ParsedAlert {
            status: status.code(),
            service: service.to_owned(),
            messages,
        })
    }
}
