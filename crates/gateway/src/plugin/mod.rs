//! 포맷 플러그인 모듈 -- 벤더별 알림 페이로드 파서
//!
//! 각 플러그인은 core의 [`FormatPlugin`](alertrelay_core::plugin::FormatPlugin) trait을 구현하며,
//! [`builtin_registry`]가 기본 제공 플러그인을 이름으로 등록한 레지스트리를 만듭니다.
//!
//! # 지원 형식
//! - Catchpoint Alerts API XML ([`CatchpointAlertPlugin`], 이름 `catchpoint_alerts`)
//!
//! # 사용 예시
//! ```ignore
//! use alertrelay_gateway::plugin::builtin_registry;
//!
//! let registry = builtin_registry()?;
//! registry.ensure_all(config.plugin_names())?;
//!
//! let plugin = registry.resolve("catchpoint_alerts")?;
//! let parsed = plugin.parse(&body)?;
//! ```

pub mod catchpoint;

pub use catchpoint::CatchpointAlertPlugin;

use std::sync::Arc;

use alertrelay_core::error::RelayError;
use alertrelay_core::plugin::PluginRegistry;

/// 기본 제공 플러그인을 모두 등록한 레지스트리를 생성합니다.
pub fn builtin_registry() -> Result<PluginRegistry, RelayError> {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(CatchpointAlertPlugin::new()))?;
    tracing::info!(plugins = ?registry.names(), "format plugins registered");
    Ok(registry)
}
