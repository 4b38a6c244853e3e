//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 처리기는 `metrics` 파사드만 호출하며,
//! 레코더가 설치되지 않은 환경(Lambda 기본 구성)에서는 아무 동작도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ecrscan_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 심각도 레이블 키 (INFORMATIONAL, LOW, MEDIUM, HIGH, CRITICAL)
pub const LABEL_SEVERITY: &str = "severity";

/// 실패 단계 레이블 키 (validate, persist, publish)
pub const LABEL_STAGE: &str = "stage";

// ─── 처리기 메트릭 ──────────────────────────────────────────────────

/// 수신한 이벤트 수 (counter)
pub const EVENTS_RECEIVED_TOTAL: &str = "ecrscan_events_received_total";

/// 처리에 성공한 이벤트 수 (counter)
pub const EVENTS_PROCESSED_TOTAL: &str = "ecrscan_events_processed_total";

/// 처리에 실패한 이벤트 수 (counter, label: stage)
pub const EVENTS_FAILED_TOTAL: &str = "ecrscan_events_failed_total";

/// 저장한 CSV 행 수 (counter)
pub const ROWS_WRITTEN_TOTAL: &str = "ecrscan_rows_written_total";

/// 전송한 finding 수 (counter, label: severity)
pub const FINDINGS_PUBLISHED_TOTAL: &str = "ecrscan_findings_published_total";

/// 이벤트 1건 처리 시간 (histogram, 초)
pub const PROCESSING_DURATION_SECONDS: &str = "ecrscan_processing_duration_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(EVENTS_RECEIVED_TOTAL, "Scan-completion events received");
    describe_counter!(
        EVENTS_PROCESSED_TOTAL,
        "Events whose row was written and finding published"
    );
    describe_counter!(EVENTS_FAILED_TOTAL, "Events that failed, by stage");
    describe_counter!(ROWS_WRITTEN_TOTAL, "CSV rows written to object storage");
    describe_counter!(
        FINDINGS_PUBLISHED_TOTAL,
        "Findings accepted by the findings sink, by severity"
    );
    describe_histogram!(
        PROCESSING_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "End-to-end processing time per event"
    );
}
