//! finding 전송: 단일 finding을 한 건짜리 배치로 sink에 전달

use std::sync::Arc;

use tracing::{debug, info};

use ecrscan_core::error::PublishError;
use ecrscan_core::finding::SecurityFinding;
use ecrscan_core::sink::FindingSink;

/// finding 전송기
///
/// 재시도하지 않습니다. 실패는 그대로 호출자에게 전파됩니다.
pub struct FindingPublisher<P: FindingSink> {
    sink: Arc<P>,
}

impl<P: FindingSink> FindingPublisher<P> {
    /// sink를 주입해 생성합니다.
    pub fn new(sink: Arc<P>) -> Self {
        Self { sink }
    }

    /// finding 하나를 전송합니다.
    ///
    /// # Errors
    ///
    /// - `PublishError::SubmitFailed`: 호출 실패
    /// - `PublishError::Rejected`: sink가 finding을 수락하지 않음
    pub async fn publish(&self, finding: &SecurityFinding) -> Result<(), PublishError> {
        debug!(sink = self.sink.name(), finding_id = %finding.id, "submitting finding");

        let accepted = self
            .sink
            .import_findings(std::slice::from_ref(finding))
            .await?;

        if accepted != 1 {
            return Err(PublishError::Rejected {
                failed: 1,
                reason: format!("sink accepted {accepted} of 1 findings"),
            });
        }

        info!(
            finding_id = %finding.id,
            severity = %finding.label(),
            "finding published"
        );
        Ok(())
    }
}
