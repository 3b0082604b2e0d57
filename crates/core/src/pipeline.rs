//! 파이프라인 trait — 외부 싱크 확장 포인트 정의

use std::future::Future;
use std::pin::Pin;

use crate::error::ForwardError;
use crate::types::NormalizedResult;

/// dyn-compatible trait에서 사용하는 박싱된 Future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 레거시 모니터링 데몬으로 체크 결과를 보내는 싱크 trait
///
/// 인제스트 요청마다 결과 하나당 한 번, 메시지 순서대로 동기적으로 호출됩니다.
/// 실패는 호출자에게 보고되지만 캐시 적재를 막지 않습니다.
/// 재시도나 연결 관리는 구현체의 책임입니다.
pub trait LegacyForwarder: Send + Sync {
    /// 포워더 이름 (로그용)
    fn name(&self) -> &str;

    /// 체크 결과 하나를 전송합니다.
    fn send<'a>(&'a self, result: &'a NormalizedResult) -> BoxFuture<'a, Result<(), ForwardError>>;
}
