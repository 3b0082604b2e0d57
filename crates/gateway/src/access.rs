//! 접근 제어 -- 출발지 주소 허용 목록
//!
//! [`AccessFilter`]는 인바운드 연결의 원격 주소가 허용 목록에 있는지 판단합니다.
//! 허용 목록이 비어 있으면 모든 주소를 허용합니다.
//!
//! 비교는 포트를 제거한 호스트 문자열의 정확한 일치입니다
//! (대소문자 구분, CIDR/와일드카드 미지원). 형식이 잘못된 주소는 단순히
//! 일치하지 않으므로 거부됩니다.

use std::collections::HashSet;
use std::net::SocketAddr;

use tracing::info;

/// 출발지 주소 허용 목록 필터
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    allowed: HashSet<String>,
}

impl AccessFilter {
    /// 허용 목록으로 필터를 생성합니다. 공백은 제거되고 빈 항목은 무시됩니다.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|s| s.as_ref().trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// 모든 주소를 허용하는 필터
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// 허용 목록이 비어 있는지 (모두 허용)
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    /// 원격 주소 문자열(`host:port` 또는 `host`)이 허용되는지 판단합니다.
    pub fn allowed(&self, remote_addr: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }

        let host = strip_port(remote_addr);
        let accepted = self.allowed.contains(host);
        if accepted {
            info!(remote_addr, host, "accepted client address");
        } else {
            info!(remote_addr, host, "refused client address");
        }
        accepted
    }

    /// 소켓 주소가 허용되는지 판단합니다.
    ///
    /// 듀얼 스택 리스너가 넘기는 IPv4 매핑 IPv6 주소(`::ffff:a.b.c.d`)는
    /// IPv4 주소로 바꿔서 비교합니다.
    pub fn allows_socket(&self, addr: &SocketAddr) -> bool {
        let canonical = SocketAddr::new(addr.ip().to_canonical(), addr.port());
        self.allowed(&canonical.to_string())
    }
}

/// 주소 문자열에서 포트 접미사를 제거합니다.
///
/// `10.0.0.1:54321` -> `10.0.0.1`, `[::1]:8080` -> `::1`.
/// 포트가 없는 주소는 그대로 반환합니다.
fn strip_port(addr: &str) -> &str {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        // IPv6는 대괄호 안쪽만 취함
        return match socket {
            SocketAddr::V4(_) => addr.rsplit_once(':').map_or(addr, |(host, _)| host),
            SocketAddr::V6(_) => addr
                .rsplit_once(':')
                .map_or(addr, |(host, _)| host)
                .trim_start_matches('[')
                .trim_end_matches(']'),
        };
    }

    match addr.rsplit_once(':') {
        // 콜론이 하나뿐이면 host:port
        Some((host, port))
            if !host.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        }
        _ => addr,
    }
}
