#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`access`]: 출발지 주소 허용 목록 필터
//! - [`listener`]: 허용 목록을 연결 수락 단계에서 적용하는 TCP 리스너
//! - [`deadline`]: 연결별 요청 읽기/응답 쓰기 고정 기한
//! - [`plugin`]: 벤더별 알림 페이로드 포맷 플러그인 (Catchpoint)
//! - [`cache`]: 풀 수집기를 위한 인메모리 결과 캐시
//! - [`forwarder`]: 레거시 모니터링 데몬 포워더 (NSCA)
//! - [`dump`]: 디버그용 요청 본문 덤프
//! - [`router`]: 요청 라우팅과 구성 요소 조율
//! - [`error`]: 요청 단위 에러와 HTTP 상태 매핑
//!
//! # 아키텍처
//!
//! ```text
//! AllowListListener -> RelayRouter -> FormatPlugin -> LegacyForwarder -> ResultCache
//!        |                 |               |               |                |
//!   AccessFilter      경로 일치       XML 파싱         NSCA v3         GET 드레인
//! ```

pub mod access;
pub mod cache;
pub mod deadline;
pub mod dump;
pub mod error;
pub mod forwarder;
pub mod listener;
pub mod plugin;
pub mod router;

// --- 주요 타입 re-export ---

// 라우터
pub use router::RelayRouter;

// 접근 제어
pub use access::AccessFilter;
pub use deadline::DeadlineStream;
pub use listener::AllowListListener;

// 캐시
pub use cache::ResultCache;

// 플러그인
pub use plugin::{CatchpointAlertPlugin, builtin_registry};

// 포워더
pub use forwarder::NscaForwarder;

// 덤프
pub use dump::RequestDumper;

// 에러
pub use error::GatewayError;
