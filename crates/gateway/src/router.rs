//! 요청 라우터 -- 모든 HTTP 요청의 단일 진입점
//!
//! [`RelayRouter`]는 요청 경로를 설정된 인제스트/이그레스 경로와 정확히 비교하고
//! 나머지 구성 요소를 요청 단위로 조율합니다.
//!
//! # 처리 순서
//! 1. 본문이 필요한 메서드인데 본문이 비어 있으면 400
//! 2. 본문 전체 읽기 (기한 초과 408, 읽기 실패 500)
//! 3. 덤프 디렉토리가 설정되어 있으면 본문 저장 (실패는 무시)
//! 4. 첫 번째로 일치하는 인제스트 경로: 플러그인 파싱 -> 포워더 전송 -> 캐시 적재
//! 5. 이그레스 경로와 일치하면 캐시 전체를 드레인하여 응답 본문으로 반환
//!    (GET, 또는 같은 요청이 인제스트를 거친 경우만. HEAD 등은 405)
//! 6. 어느 경로와도 일치하지 않으면 본문 없는 404
//!
//! 포워더 전송은 캐시 락 밖에서 실행되며, 전송 실패가 있어도 배치 전체가 캐시에 적재됩니다.
//! 파싱부터 적재까지는 별도 태스크에서 실행되므로 클라이언트가 연결을 끊어
//! 핸들러가 취소되어도 이미 전송한 결과는 캐시에 남습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use alertrelay_core::config::{EgressRoute, IngestionRoute, RelayConfig};
use alertrelay_core::metrics as m;
use alertrelay_core::pipeline::LegacyForwarder;
use alertrelay_core::plugin::{FormatPlugin, PluginRegistry};
use alertrelay_core::types::NormalizedResult;
use axum::Router;
use axum::body::{Body, HttpBody};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::dump::RequestDumper;
use crate::error::GatewayError;

/// 기본 본문 수신 기한
const DEFAULT_BODY_TIMEOUT: Duration = Duration::from_secs(10);

/// 기본 최대 본문 크기 (1 MiB)
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// 이그레스 응답 Content-Type
const EGRESS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// 요청 라우터
///
/// 생성 후에는 읽기 전용이며 [`into_router`](Self::into_router)로 axum 라우터가 됩니다.
/// 캐시는 외부에서 주입되므로 테스트마다 독립된 인스턴스를 쓸 수 있습니다.
pub struct RelayRouter {
    ingestion: Vec<IngestionRoute>,
    egress: Vec<EgressRoute>,
    registry: Arc<PluginRegistry>,
    cache: Arc<ResultCache>,
    forwarder: Option<Arc<dyn LegacyForwarder>>,
    dumper: Option<RequestDumper>,
    body_timeout: Duration,
    max_body_bytes: usize,
}

impl RelayRouter {
    /// 경로, 플러그인 레지스트리, 캐시로 라우터를 생성합니다.
    pub fn new(
        ingestion: Vec<IngestionRoute>,
        egress: Vec<EgressRoute>,
        registry: Arc<PluginRegistry>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            ingestion,
            egress,
            registry,
            cache,
            forwarder: None,
            dumper: None,
            body_timeout: DEFAULT_BODY_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// 설정 파일의 경로, 기한, 본문 제한, 덤프 디렉토리를 적용해 생성합니다.
    ///
    /// 포워더는 [`with_forwarder`](Self::with_forwarder)로 별도로 붙입니다.
    pub fn from_config(
        config: &RelayConfig,
        registry: Arc<PluginRegistry>,
        cache: Arc<ResultCache>,
    ) -> Self {
        let mut router = Self::new(
            config.ingestion.clone(),
            config.egress.clone(),
            registry,
            cache,
        )
        .with_body_timeout(Duration::from_secs(config.server.request_timeout_secs))
        .with_max_body_bytes(config.server.max_body_bytes);
        router.dumper = RequestDumper::from_config(&config.server.dump_requests_dir);
        router
    }

    /// 레거시 포워더를 설정합니다.
    pub fn with_forwarder(mut self, forwarder: Option<Arc<dyn LegacyForwarder>>) -> Self {
        self.forwarder = forwarder;
        self
    }

    /// 요청 본문 덤프를 설정합니다.
    pub fn with_dumper(mut self, dumper: RequestDumper) -> Self {
        self.dumper = Some(dumper);
        self
    }

    /// 본문 수신 기한을 설정합니다.
    pub fn with_body_timeout(mut self, timeout: Duration) -> Self {
        self.body_timeout = timeout;
        self
    }

    /// 최대 본문 크기를 설정합니다.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// 주입된 결과 캐시
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// axum 라우터로 변환합니다. 모든 경로와 메서드가 같은 핸들러로 들어옵니다.
    pub fn into_router(self) -> Router {
        let limit = self.max_body_bytes;
        Router::new()
            .fallback(relay)
            .with_state(Arc::new(self))
            .layer(RequestBodyLimitLayer::new(limit))
    }

    fn route_kind(&self, path: &str) -> &'static str {
        if self.ingestion.iter().any(|r| r.path == path) {
            "ingestion"
        } else if self.egress.iter().any(|r| r.path == path) {
            "egress"
        } else {
            "unmatched"
        }
    }

    async fn dispatch(&self, request: Request) -> Response {
        let path = request.uri().path().to_owned();
        let kind = self.route_kind(&path);
        info!(route = kind, "request received");

        match self.process(request, &path).await {
            Ok(response) => {
                metrics::counter!(
                    m::REQUESTS_TOTAL,
                    m::LABEL_ROUTE => kind,
                    m::LABEL_RESULT => "success"
                )
                .increment(1);
                response
            }
            Err(err) => {
                metrics::counter!(
                    m::REQUESTS_TOTAL,
                    m::LABEL_ROUTE => kind,
                    m::LABEL_RESULT => err.kind()
                )
                .increment(1);
                match &err {
                    GatewayError::NotFound(_) => debug!("no route matched"),
                    GatewayError::UnknownPlugin { .. }
                    | GatewayError::BodyRead(_)
                    | GatewayError::IngestAborted(_) => {
                        error!(error = %err, "request failed")
                    }
                    _ => warn!(error = %err, "request rejected"),
                }
                err.into_response()
            }
        }
    }

    async fn process(&self, request: Request, path: &str) -> Result<Response, GatewayError> {
        let method = request.method().clone();
        if !is_bodyless(&method) && request.body().size_hint().exact() == Some(0) {
            return Err(GatewayError::EmptyBody {
                method: method.to_string(),
            });
        }

        let body = self.read_body(request.into_body()).await?;
        if let Some(dumper) = &self.dumper {
            dumper.dump(&body).await;
        }

        let mut ingested = false;
        if let Some(route) = self.ingestion.iter().find(|r| r.path == path) {
            self.ingest(route, body).await?;
            ingested = true;
        }

        if self.egress.iter().any(|r| r.path == path) {
            // HEAD 응답은 본문이 버려지므로 드레인하면 결과가 사라짐
            if method != Method::HEAD && (method == Method::GET || ingested) {
                return Ok(self.drain().await);
            }
            return Err(GatewayError::MethodNotAllowed {
                method: method.to_string(),
            });
        }

        if ingested {
            Ok(StatusCode::OK.into_response())
        } else {
            Err(GatewayError::NotFound(path.to_owned()))
        }
    }

    async fn read_body(&self, body: Body) -> Result<Bytes, GatewayError> {
        match tokio::time::timeout(
            self.body_timeout,
            axum::body::to_bytes(body, self.max_body_bytes),
        )
        .await
        {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(GatewayError::BodyRead(e.to_string())),
            Err(_) => Err(GatewayError::BodyTimeout {
                secs: self.body_timeout.as_secs(),
            }),
        }
    }

    /// 파싱 -> 전송 -> 적재. 적재한 결과 수를 반환합니다.
    async fn ingest(&self, route: &IngestionRoute, body: Bytes) -> Result<usize, GatewayError> {
        let plugin = self
            .registry
            .resolve(&route.plugin)
            .map_err(|_| GatewayError::UnknownPlugin {
                path: route.path.clone(),
                plugin: route.plugin.clone(),
            })?;

        let task = tokio::spawn(
            ingest_batch(
                plugin,
                self.forwarder.clone(),
                Arc::clone(&self.cache),
                body,
            )
            .in_current_span(),
        );
        task.await
            .map_err(|e| GatewayError::IngestAborted(e.to_string()))?
    }

    async fn drain(&self) -> Response {
        let drained = self.cache.drain_all().await;
        info!(count = drained.len(), "check results drained");
        (
            [(header::CONTENT_TYPE, EGRESS_CONTENT_TYPE)],
            encode_results(&drained),
        )
            .into_response()
    }
}

/// 핸들러와 분리된 태스크에서 실행되는 인제스트 본체
async fn ingest_batch(
    plugin: Arc<dyn FormatPlugin>,
    forwarder: Option<Arc<dyn LegacyForwarder>>,
    cache: Arc<ResultCache>,
    body: Bytes,
) -> Result<usize, GatewayError> {
    let parsed = plugin.parse(&body).map_err(GatewayError::PluginParse)?;
    debug!(
        plugin = plugin.name(),
        status = parsed.status,
        service = %parsed.service,
        messages = ?parsed.messages,
        "alert payload parsed"
    );

    let results = parsed.into_results();
    let total = results.len();

    let mut failed = 0;
    if let Some(forwarder) = &forwarder {
        for result in &results {
            if let Err(e) = forwarder.send(result).await {
                failed += 1;
                metrics::counter!(m::FORWARD_ERRORS_TOTAL).increment(1);
                error!(
                    forwarder = forwarder.name(),
                    service = result.name(),
                    error = %e,
                    "failed to forward check result"
                );
            }
        }
    }

    cache.append(results).await;
    info!(plugin = plugin.name(), count = total, "check results cached");

    if failed > 0 {
        return Err(GatewayError::Forward { failed, total });
    }
    Ok(total)
}

async fn relay(State(router): State<Arc<RelayRouter>>, request: Request) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_owned(), |ConnectInfo(addr)| addr.to_string());
    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
        remote_addr = %remote_addr,
    );
    router.dispatch(request).instrument(span).await
}

fn is_bodyless(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// 드레인된 결과를 이그레스 응답 본문으로 직렬화합니다.
///
/// 각 결과의 JSON 텍스트를 JSON 문자열 리터럴로 감싸 구분자 없이 이어 붙입니다.
/// 직렬화에 실패한 결과는 로그를 남기고 건너뜁니다.
pub fn encode_results(results: &[NormalizedResult]) -> String {
    let mut body = String::new();
    for result in results {
        match result
            .to_check_json()
            .and_then(|json| serde_json::to_string(&json))
        {
            Ok(quoted) => body.push_str(&quoted),
            Err(e) => error!(
                service = result.name(),
                error = %e,
                "failed to serialize check result"
            ),
        }
    }
    body
}
