//! 결과 캐시 -- 풀 수집기를 위한 인메모리 버퍼
//!
//! [`ResultCache`]는 정규화된 체크 결과를 이그레스 요청이 가져갈 때까지 보관합니다.
//!
//! # 동시성
//! 배치 적재([`append`](ResultCache::append))와 전체 드레인([`drain_all`](ResultCache::drain_all))은
//! 하나의 배타적 락 아래에서 각각 통째로 실행됩니다. 따라서 드레인은 동시에 진행 중인
//! 적재의 일부만 관찰하지 않으며, 한 요청의 적재가 두 드레인으로 나뉘지 않습니다.
//!
//! # 제한
//! 용량 제한이 없습니다. 수집기가 가져가지 않으면 메모리가 계속 증가합니다.
//! 영속화하지 않으므로 재시작하면 버퍼링된 결과는 사라집니다.

use alertrelay_core::metrics as m;
use alertrelay_core::types::NormalizedResult;
use tokio::sync::Mutex;

/// 인메모리 결과 캐시
///
/// 프로세스 전역 상태가 아니라 라우터에 주입되는 구성 요소입니다.
/// 인스턴스마다 자신의 락을 가집니다.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<Vec<NormalizedResult>>,
}

impl ResultCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 배치 전체를 한 번의 락 구간에서 적재합니다.
    ///
    /// 배치 내 순서는 보존됩니다. 적재 후 캐시 크기를 반환합니다.
    pub async fn append(&self, batch: Vec<NormalizedResult>) -> usize {
        let added = batch.len();
        let mut entries = self.entries.lock().await;
        entries.extend(batch);
        let size = entries.len();
        drop(entries);

        metrics::counter!(m::RESULTS_INGESTED_TOTAL).increment(added as u64);
        metrics::gauge!(m::CACHE_ENTRIES).set(size as f64);
        tracing::debug!(added, size, "results appended to cache");
        size
    }

    /// 모든 엔트리를 꺼내고 캐시를 비웁니다.
    ///
    /// 읽기는 항상 파괴적입니다. 비어 있으면 빈 Vec을 반환합니다.
    pub async fn drain_all(&self) -> Vec<NormalizedResult> {
        let drained = std::mem::take(&mut *self.entries.lock().await);

        metrics::counter!(m::RESULTS_DRAINED_TOTAL).increment(drained.len() as u64);
        metrics::gauge!(m::CACHE_ENTRIES).set(0.0);
        tracing::debug!(drained = drained.len(), "results drained from cache");
        drained
    }

    /// 현재 엔트리 수를 반환합니다.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// 캐시가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
