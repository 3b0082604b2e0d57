//! 포맷 플러그인 시스템 — 이름 기반 등록과 조회
//!
//! [`FormatPlugin`]은 벤더별 알림 페이로드를 [`ParsedAlert`]로 변환하는 확장 포인트입니다.
//! [`PluginRegistry`]는 시작 시점에 플러그인을 이름으로 등록하고,
//! 라우터가 인제스트 경로에 설정된 이름으로 플러그인을 찾을 수 있게 합니다.
//!
//! # 사용 예시
//! ```ignore
//! let mut registry = PluginRegistry::new();
//! registry.register(Arc::new(CatchpointAlertPlugin::new()))?;
//!
//! let plugin = registry.resolve("catchpoint_alerts")?;
//! let parsed = plugin.parse(&body)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PluginError, RelayError};
use crate::types::ParsedAlert;

// ─── FormatPlugin Trait ──────────────────────────────────────────────

/// 알림 페이로드 포맷 플러그인 trait
///
/// 새로운 벤더 포맷을 지원하려면 이 trait을 구현하고 레지스트리에 등록합니다.
/// 라우터 코드는 수정할 필요가 없습니다.
pub trait FormatPlugin: Send + Sync {
    /// 설정 파일에서 참조하는 플러그인 이름 (예: `"catchpoint_alerts"`)
    fn name(&self) -> &str;

    /// 원시 바이트를 파싱합니다.
    ///
    /// 잘못된 입력은 [`PluginError::Parse`]를 반환하며, 부분 결과는 없습니다.
    fn parse(&self, raw: &[u8]) -> Result<ParsedAlert, PluginError>;
}

// ─── PluginRegistry ──────────────────────────────────────────────────

/// 포맷 플러그인 레지스트리
///
/// 시작 시점에 채워지고 이후에는 읽기 전용으로 공유됩니다.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn FormatPlugin>>,
}

impl PluginRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인을 등록합니다.
    ///
    /// 동일한 이름의 플러그인이 이미 등록되어 있으면 에러를 반환합니다.
    pub fn register(&mut self, plugin: Arc<dyn FormatPlugin>) -> Result<(), RelayError> {
        let name = plugin.name().to_owned();
        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered { name }.into());
        }
        tracing::debug!(plugin = %name, "format plugin registered");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// 이름으로 플러그인을 찾습니다.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn FormatPlugin>, PluginError> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound {
                name: name.to_owned(),
            })
    }

    /// 주어진 이름이 모두 등록되어 있는지 확인합니다.
    ///
    /// 시작 시점의 설정 검증에 사용합니다. 첫 번째로 누락된 이름에서 실패합니다.
    pub fn ensure_all<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RelayError> {
        for name in names {
            self.resolve(name)?;
        }
        Ok(())
    }

    /// 등록된 플러그인 수를 반환합니다.
    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    /// 등록된 플러그인 이름 목록 (정렬됨)
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
