//! 연결 데드라인 -- 요청 읽기와 응답 쓰기에 고정 기한 적용
//!
//! [`DeadlineStream`]은 연결 I/O를 감싸 두 가지 기한을 강제합니다.
//!
//! - 읽기 기한: 요청의 첫 바이트를 받은 시점(첫 요청은 연결 수락 시점)부터
//!   `timeout` 안에 헤더와 본문을 받고 핸들러가 응답을 시작해야 합니다.
//! - 쓰기 기한: 응답의 첫 바이트를 쓴 시점부터 `timeout` 안에 응답을 다 써야 합니다.
//!   응답 이후 다음 요청을 기다리는 유휴 시간도 이 기한에 포함됩니다.
//!
//! 기한은 실제로 데이터가 오간 방향 전환에서만 다시 설정되므로
//! 한 바이트씩 흘려 보내는 클라이언트나 응답을 천천히 읽는 클라이언트도
//! 연결을 무기한 붙잡지 못합니다. 기한이 지나면 읽기/쓰기가
//! `ErrorKind::TimedOut`으로 실패하고 HTTP 서버가 연결을 닫습니다.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{Instant, Sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Writing,
}

/// 읽기/쓰기 고정 기한을 적용하는 스트림
#[derive(Debug)]
pub struct DeadlineStream<S> {
    inner: S,
    timeout: Duration,
    deadline: Pin<Box<Sleep>>,
    phase: Phase,
}

impl<S> DeadlineStream<S> {
    /// 지금부터 `timeout` 뒤를 첫 요청의 읽기 기한으로 설정합니다.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            deadline: Box::pin(tokio::time::sleep(timeout)),
            phase: Phase::Reading,
        }
    }

    /// 감싼 스트림
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// 적용 중인 기한 길이
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            let deadline = Instant::now() + self.timeout;
            self.deadline.as_mut().reset(deadline);
        }
    }

    fn expired(&self) -> io::Error {
        let direction = match self.phase {
            Phase::Reading => "read",
            Phase::Writing => "write",
        };
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connection {direction} deadline of {:?} exceeded", self.timeout),
        )
    }

    /// 내부 I/O가 대기 중일 때 기한 타이머를 등록합니다.
    fn poll_deadline<T>(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<T>> {
        match self.deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(self.expired())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for DeadlineStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.phase == Phase::Reading && this.deadline.is_elapsed() {
            return Poll::Ready(Err(this.expired()));
        }
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                if buf.filled().len() > before {
                    // 응답 이후 들어온 데이터는 새 요청의 시작
                    this.enter(Phase::Reading);
                }
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => this.poll_deadline(cx),
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for DeadlineStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.deadline.is_elapsed() {
            return Poll::Ready(Err(this.expired()));
        }
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => {
                if n > 0 {
                    this.enter(Phase::Writing);
                }
                Poll::Ready(Ok(n))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => this.poll_deadline(cx),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_flush(cx) {
            Poll::Pending => this.poll_deadline(cx),
            ready => ready,
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
