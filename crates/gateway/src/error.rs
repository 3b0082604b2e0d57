//! 게이트웨이 에러 타입
//!
//! [`GatewayError`]는 요청 처리 중 발생하는 모든 실패를 표현합니다.
//! [`IntoResponse`] 구현이 각 실패를 HTTP 상태 코드로 매핑하므로
//! 핸들러는 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 접근 거부는 여기에 없습니다. 허용 목록 밖의 연결은 HTTP 처리 전에
//! [`AllowListListener`](crate::listener::AllowListListener)에서 끊깁니다.

use alertrelay_core::error::PluginError;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// 요청 단위 게이트웨이 에러
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 본문이 필요한 메서드인데 Content-Length가 0
    #[error("empty request body for {method}")]
    EmptyBody {
        /// 요청 메서드
        method: String,
    },

    /// 본문 읽기 실패 (클라이언트 연결 끊김 등)
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// 요청 기한 안에 본문을 다 받지 못함
    #[error("request body not received within {secs}s")]
    BodyTimeout {
        /// 요청 기한 (초)
        secs: u64,
    },

    /// 인제스트 경로에 설정된 플러그인이 등록되어 있지 않음
    #[error("unsupported plugin name for {path}: {plugin}")]
    UnknownPlugin {
        /// 요청 경로
        path: String,
        /// 설정된 플러그인 이름
        plugin: String,
    },

    /// 플러그인 파싱 실패
    #[error("{0}")]
    PluginParse(PluginError),

    /// 레거시 포워더 전송 실패 (캐시 적재는 완료됨)
    #[error("{failed} of {total} results could not be forwarded")]
    Forward {
        /// 실패한 결과 수
        failed: usize,
        /// 전체 결과 수
        total: usize,
    },

    /// 인제스트 작업이 완료되기 전에 중단됨 (런타임 종료 등)
    #[error("ingest task aborted: {0}")]
    IngestAborted(String),

    /// 이그레스 경로에 GET 이외의 메서드
    #[error("{method} is not allowed on an egress route")]
    MethodNotAllowed {
        /// 요청 메서드
        method: String,
    },

    /// 일치하는 경로 없음
    #[error("no route for {0}")]
    NotFound(String),
}

impl GatewayError {
    /// HTTP 상태 코드
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyBody { .. } => StatusCode::BAD_REQUEST,
            Self::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BodyTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::UnknownPlugin { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PluginParse(_) => StatusCode::BAD_REQUEST,
            Self::Forward { .. } => StatusCode::BAD_GATEWAY,
            Self::IngestAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// 메트릭 레이블로 쓰는 짧은 사유
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyBody { .. } => "empty_body",
            Self::BodyRead(_) => "body_read",
            Self::BodyTimeout { .. } => "body_timeout",
            Self::UnknownPlugin { .. } => "unknown_plugin",
            Self::PluginParse(_) => "parse_failure",
            Self::Forward { .. } => "forward_failure",
            Self::IngestAborted(_) => "ingest_aborted",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl From<PluginError> for GatewayError {
    fn from(err: PluginError) -> Self {
        Self::PluginParse(err)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // 404는 본문 없이 응답
            Self::NotFound(_) => status.into_response(),
            // 드레인은 GET으로만
            Self::MethodNotAllowed { .. } => (
                status,
                [(header::ALLOW, "GET")],
                self.to_string(),
            )
                .into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}
