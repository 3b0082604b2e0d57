//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `alertrelay_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 경로 종류 레이블 키 (ingestion, egress, unmatched)
pub const LABEL_ROUTE: &str = "route";

/// 결과 레이블 키 (success, failure 사유)
pub const LABEL_RESULT: &str = "result";

// ─── 메트릭 이름 ────────────────────────────────────────────────────

/// 처리한 HTTP 요청 수 (counter, labels: route, result)
pub const REQUESTS_TOTAL: &str = "alertrelay_requests_total";

/// 캐시에 적재된 체크 결과 수 (counter)
pub const RESULTS_INGESTED_TOTAL: &str = "alertrelay_results_ingested_total";

/// 이그레스로 드레인된 체크 결과 수 (counter)
pub const RESULTS_DRAINED_TOTAL: &str = "alertrelay_results_drained_total";

/// 레거시 포워더 전송 실패 수 (counter)
pub const FORWARD_ERRORS_TOTAL: &str = "alertrelay_forward_errors_total";

/// 접근 제어로 거부된 연결 수 (counter)
pub const ACCESS_DENIED_TOTAL: &str = "alertrelay_access_denied_total";

/// 요청 본문 덤프 실패 수 (counter)
pub const DUMP_ERRORS_TOTAL: &str = "alertrelay_dump_errors_total";

/// 현재 캐시에 남아 있는 체크 결과 수 (gauge)
pub const CACHE_ENTRIES: &str = "alertrelay_cache_entries";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 전역 recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    metrics::describe_counter!(REQUESTS_TOTAL, "HTTP requests handled by route kind and result");
    metrics::describe_counter!(
        RESULTS_INGESTED_TOTAL,
        "Check results appended to the result cache"
    );
    metrics::describe_counter!(
        RESULTS_DRAINED_TOTAL,
        "Check results drained by egress requests"
    );
    metrics::describe_counter!(
        FORWARD_ERRORS_TOTAL,
        "Check results the legacy forwarder failed to deliver"
    );
    metrics::describe_counter!(
        ACCESS_DENIED_TOTAL,
        "Connections dropped by the source address allow-list"
    );
    metrics::describe_counter!(DUMP_ERRORS_TOTAL, "Request bodies that could not be dumped");
    metrics::describe_gauge!(CACHE_ENTRIES, "Check results currently buffered");
}
