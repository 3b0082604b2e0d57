//! alertrelay 공통 크레이트
//!
//! 푸시 기반 알림 릴레이의 모든 구성 요소가 공유하는 타입, trait, 에러, 설정을 제공합니다.
//!
//! # 모듈 구성
//!
//! - [`types`]: 정규화된 체크 결과 ([`NormalizedResult`])와 플러그인 파싱 결과
//! - [`plugin`]: 포맷 플러그인 trait과 이름 기반 레지스트리
//! - [`pipeline`]: 레거시 포워더 trait
//! - [`config`]: `alertrelay.toml` 설정
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: Prometheus 메트릭 이름

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod plugin;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ForwardError, PluginError, RelayError};

// 설정
pub use config::{EgressRoute, IngestionRoute, RelayConfig};

// 파이프라인 trait
pub use pipeline::{BoxFuture, LegacyForwarder};

// 플러그인
pub use plugin::{FormatPlugin, PluginRegistry};

// 도메인 타입
pub use types::{CheckStatus, NormalizedResult, ParsedAlert};
