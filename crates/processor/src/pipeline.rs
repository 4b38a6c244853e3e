//! 처리 파이프라인: 이벤트 1건을 검증부터 finding 전송까지 처리
//!
//! # 처리 순서
//! ```text
//! Value ──> validate ──> flatten ──> persist row ──> build finding ──> publish
//!              │                          │                               │
//!         EventError                StorageError                    PublishError
//! ```
//!
//! 어떤 부수 효과보다도 검증이 먼저 끝나므로, 필수 필드가 빠진 이벤트는 행도
//! finding도 남기지 않습니다. 행 저장 후 finding 전송이 실패하면 이미 저장된
//! 행은 그대로 남고, 해당 키를 에러 로그에 기록합니다.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Value, json};
use tracing::{error, info, warn};

use ecrscan_core::config::EcrScanConfig;
use ecrscan_core::error::{ConfigError, EcrScanError};
use ecrscan_core::event::{ScanCompletionEvent, short_digest};
use ecrscan_core::metrics as m;
use ecrscan_core::sink::{FindingSink, ObjectStore};
use ecrscan_core::types::SeverityLabel;

use crate::finding::FindingBuilder;
use crate::flatten::flatten;
use crate::persist::{RowPersister, StoredObject};
use crate::publish::FindingPublisher;

/// 성공 응답 본문 메시지
pub const SUCCESS_MESSAGE: &str = "Scan result processed successfully";

/// 호출 성공 시 반환하는 응답
///
/// `body`는 메시지를 JSON 문자열로 한 번 더 인코딩한 값입니다.
pub fn success_response() -> Value {
    json!({
        "statusCode": 200,
        "body": Value::String(SUCCESS_MESSAGE.to_owned()).to_string(),
    })
}

/// 이벤트 1건 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// 이벤트 ID
    pub event_id: String,
    /// 저장된 행 위치
    pub row: StoredObject,
    /// 전송된 finding ID (전송 비활성화 시 `None`)
    pub finding_id: Option<String>,
    /// 대표 심각도
    pub severity: SeverityLabel,
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {} -> s3://{}/{} [{}]",
            self.event_id, self.row.bucket, self.row.key, self.severity
        )
    }
}

/// ECR 스캔 이벤트 처리 파이프라인
///
/// 저장소와 sink 클라이언트는 빌더로 한 번 주입하고 호출 간에 공유합니다.
/// 호출 사이에 남는 상태는 없습니다.
///
/// # 사용 예시
/// ```ignore
/// let pipeline = ScanPipelineBuilder::new()
///     .config(config)
///     .object_store(Arc::new(store))
///     .finding_sink(Arc::new(sink))
///     .build()?;
///
/// let outcome = pipeline.process(event_json).await?;
/// ```
pub struct ScanPipeline<S: ObjectStore, P: FindingSink> {
    persister: RowPersister<S>,
    finding_builder: FindingBuilder,
    publisher: FindingPublisher<P>,
    findings_enabled: bool,
}

impl<S: ObjectStore, P: FindingSink> ScanPipeline<S, P> {
    /// 원시 JSON 이벤트를 처리합니다.
    ///
    /// # Errors
    ///
    /// 검증, 저장, 전송 중 처음 실패한 단계의 에러를 반환합니다.
    pub async fn process(&self, value: Value) -> Result<ProcessOutcome, EcrScanError> {
        metrics::counter!(m::EVENTS_RECEIVED_TOTAL).increment(1);

        let event = match ScanCompletionEvent::from_value(value) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "rejecting scan event");
                let e = EcrScanError::from(e);
                record_failure(&e);
                return Err(e);
            }
        };

        self.process_event(&event).await
    }

    /// 검증된 이벤트를 처리합니다.
    pub async fn process_event(
        &self,
        event: &ScanCompletionEvent,
    ) -> Result<ProcessOutcome, EcrScanError> {
        let started = Instant::now();
        let result = self.run(event).await;

        match &result {
            Ok(outcome) => {
                metrics::counter!(m::EVENTS_PROCESSED_TOTAL).increment(1);
                metrics::histogram!(m::PROCESSING_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                info!(
                    event_id = %outcome.event_id,
                    key = %outcome.row.key,
                    severity = %outcome.severity,
                    "scan event processed"
                );
            }
            Err(e) => record_failure(e),
        }

        result
    }

    async fn run(&self, event: &ScanCompletionEvent) -> Result<ProcessOutcome, EcrScanError> {
        let detail = &event.detail;
        info!(
            event_id = %event.id,
            repository = %detail.repository_name,
            digest = short_digest(&detail.image_digest),
            status = %detail.scan_status,
            "processing scan event"
        );

        let row = flatten(event);
        let stored = self.persister.persist(&row).await?;
        metrics::counter!(m::ROWS_WRITTEN_TOTAL).increment(1);

        let severity = detail.severity_counts.highest_label();
        if !self.findings_enabled {
            info!(key = %stored.key, "finding publication disabled");
            return Ok(ProcessOutcome {
                event_id: event.id.clone(),
                row: stored,
                finding_id: None,
                severity,
            });
        }

        let finding = self.finding_builder.build(event);
        if let Err(e) = self.publisher.publish(&finding).await {
            error!(
                error = %e,
                bucket = %stored.bucket,
                key = %stored.key,
                finding_id = %finding.id,
                "finding publish failed after row was stored"
            );
            return Err(e.into());
        }
        metrics::counter!(m::FINDINGS_PUBLISHED_TOTAL, m::LABEL_SEVERITY => severity.as_str())
            .increment(1);

        Ok(ProcessOutcome {
            event_id: event.id.clone(),
            row: stored,
            finding_id: Some(finding.id),
            severity,
        })
    }
}

fn record_failure(e: &EcrScanError) {
    metrics::counter!(m::EVENTS_FAILED_TOTAL, m::LABEL_STAGE => e.stage()).increment(1);
}

/// 파이프라인 빌더
pub struct ScanPipelineBuilder<S: ObjectStore, P: FindingSink> {
    config: EcrScanConfig,
    store: Option<Arc<S>>,
    sink: Option<Arc<P>>,
}

impl<S: ObjectStore, P: FindingSink> ScanPipelineBuilder<S, P> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: EcrScanConfig::default(),
            store: None,
            sink: None,
        }
    }

    /// 설정을 지정합니다.
    pub fn config(mut self, config: EcrScanConfig) -> Self {
        self.config = config;
        self
    }

    /// 행을 기록할 오브젝트 저장소를 설정합니다.
    pub fn object_store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// finding을 보낼 sink를 설정합니다.
    pub fn finding_sink(mut self, sink: Arc<P>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 또는 저장소/sink 미지정 시 `EcrScanError::Config`를 반환합니다.
    pub fn build(self) -> Result<ScanPipeline<S, P>, EcrScanError> {
        self.config.validate()?;

        let store = self.store.ok_or_else(|| ConfigError::InvalidValue {
            field: "object_store".to_owned(),
            reason: "object store must be provided".to_owned(),
        })?;
        let sink = self.sink.ok_or_else(|| ConfigError::InvalidValue {
            field: "finding_sink".to_owned(),
            reason: "finding sink must be provided".to_owned(),
        })?;

        Ok(ScanPipeline {
            persister: RowPersister::new(store, &self.config.storage),
            finding_builder: FindingBuilder::new(&self.config.findings),
            publisher: FindingPublisher::new(sink),
            findings_enabled: self.config.findings.enabled,
        })
    }
}

impl<S: ObjectStore, P: FindingSink> Default for ScanPipelineBuilder<S, P> {
    fn default() -> Self {
        Self::new()
    }
}
