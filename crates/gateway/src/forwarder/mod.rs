//! 레거시 포워더 -- 풀 모델 이전의 모니터링 데몬으로 결과 복제
//!
//! 라우터는 [`LegacyForwarder`] trait 객체만 알고 있으므로
//! 새 전송 방식은 이 모듈에 구현체를 추가하는 것으로 충분합니다.

pub mod nsca;

pub use nsca::{Encryption, NscaForwarder};

use std::sync::Arc;

use alertrelay_core::config::NscaConfig;
use alertrelay_core::error::RelayError;
use alertrelay_core::pipeline::LegacyForwarder;

/// 설정에 따라 포워더를 생성합니다. 비활성화되어 있으면 `None`입니다.
pub fn from_config(config: &NscaConfig) -> Result<Option<Arc<dyn LegacyForwarder>>, RelayError> {
    if !config.enabled {
        return Ok(None);
    }
    let forwarder = NscaForwarder::from_config(config)?;
    tracing::info!(addr = forwarder.addr(), "nsca forwarder enabled");
    Ok(Some(Arc::new(forwarder)))
}
