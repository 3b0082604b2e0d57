//! Server harness and raw HTTP/1.1 client for E2E tests.
//!
//! Requests are written by hand over a `TcpStream` so the tests observe the
//! same bytes (or the same dropped connection) a remote client would.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use alertrelay_core::config::RelayConfig;
use alertrelay_daemon::server::RelayServer;
use alertrelay_gateway::ResultCache;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A relay server running on a background task.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub cache: Arc<ResultCache>,
    shutdown: CancellationToken,
    task: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl RunningServer {
    /// Build the server on an ephemeral loopback port and start serving.
    pub async fn start(config: RelayConfig) -> Self {
        let server = RelayServer::build_with_addr(config, "127.0.0.1:0")
            .await
            .expect("server should build");
        let addr = server.local_addr().expect("listener address");
        let cache = server.cache();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server.run(shutdown.clone()));
        Self {
            addr,
            cache,
            shutdown,
            task,
        }
    }

    /// Send a request to this server.
    pub async fn request(&self, method: &str, path: &str, body: &[u8]) -> HttpResponse {
        let raw = send_raw(self.addr, method, path, body)
            .await
            .expect("request should complete");
        HttpResponse::parse(&raw)
    }

    /// Cancel the server and wait for `run` to return.
    pub async fn stop(self) -> anyhow::Result<()> {
        self.shutdown.cancel();
        tokio::time::timeout(IO_TIMEOUT, self.task)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

/// Write one request with `Connection: close` and read until the peer closes.
#[allow(dead_code)]
pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: &[u8],
) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr).await?;
    let head = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;

    let mut raw = Vec::new();
    tokio::time::timeout(IO_TIMEOUT, stream.read_to_end(&mut raw))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "response timed out"))??;
    Ok(raw)
}

/// Minimal parsed HTTP response.
#[allow(dead_code)]
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[allow(dead_code)]
impl HttpResponse {
    /// Parse a complete `Connection: close` response with a `Content-Length` body.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let (head, body) = text
            .split_once("\r\n\r\n")
            .expect("response has no header terminator");
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .expect("malformed status line");
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_owned()))
            .collect();
        Self {
            status,
            headers,
            body: body.to_owned(),
        }
    }

    /// Look up a header by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
