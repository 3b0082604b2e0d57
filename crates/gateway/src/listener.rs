//! 허용 목록 리스너 -- 연결 수락 단계의 접근 제어
//!
//! [`AllowListListener`]는 TCP 리스너를 감싸 [`AccessFilter`]를 통과한 연결만
//! HTTP 서버에 넘깁니다. 거부된 연결은 응답 없이 즉시 닫히며,
//! 클라이언트에는 연결 재설정 또는 빈 응답으로 보입니다.
//!
//! 수락된 연결은 [`DeadlineStream`]으로 감싸져 요청 읽기와 응답 쓰기에
//! 고정 기한이 적용됩니다.
//!
//! `axum::serve`에 직접 전달할 수 있으며 원격 주소는
//! `ConnectInfo<SocketAddr>`로 핸들러에 노출됩니다.

use std::net::SocketAddr;
use std::time::Duration;

use alertrelay_core::metrics as m;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::access::AccessFilter;
use crate::deadline::DeadlineStream;

/// 수락 에러 후 재시도 전 대기 시간
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// 기본 연결 기한
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 접근 제어를 적용하는 TCP 리스너
#[derive(Debug)]
pub struct AllowListListener {
    inner: TcpListener,
    filter: AccessFilter,
    request_timeout: Duration,
}

impl AllowListListener {
    /// 바인드된 리스너와 필터로 생성합니다.
    pub fn new(inner: TcpListener, filter: AccessFilter) -> Self {
        Self {
            inner,
            filter,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// 연결마다 적용할 읽기/쓰기 기한을 설정합니다.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 주소에 바인드합니다.
    pub async fn bind(addr: &str, filter: AccessFilter) -> std::io::Result<Self> {
        let inner = TcpListener::bind(addr).await?;
        Ok(Self::new(inner, filter))
    }

    /// 접근 필터
    pub fn filter(&self) -> &AccessFilter {
        &self.filter
    }

    /// 허용된 연결이 들어올 때까지 기다립니다.
    async fn accept_allowed(&mut self) -> (TcpStream, SocketAddr) {
        loop {
            match self.inner.accept().await {
                Ok((stream, addr)) => {
                    if self.filter.allows_socket(&addr) {
                        debug!(remote_addr = %addr, "connection accepted");
                        return (stream, addr);
                    }
                    metrics::counter!(m::ACCESS_DENIED_TOTAL).increment(1);
                    drop(stream);
                }
                Err(e) => {
                    // 파일 디스크립터 고갈 등은 일시적이므로 잠시 후 재시도
                    warn!(error = %e, "failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    }
}

impl axum::serve::Listener for AllowListListener {
    type Io = DeadlineStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        let (stream, addr) = self.accept_allowed().await;
        (DeadlineStream::new(stream, self.request_timeout), addr)
    }

    fn local_addr(&self) -> std::io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}
