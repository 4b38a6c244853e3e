//! Lambda 이벤트 핸들러

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use ecrscan_core::sink::{FindingSink, ObjectStore};
use ecrscan_processor::{ScanPipeline, success_response};

/// 이벤트 1건을 처리하고 성공 응답을 반환합니다.
///
/// 실패는 그대로 호출 실패로 전파되며 재시도는 트리거가 담당합니다.
pub async fn function_handler<S, P>(
    event: LambdaEvent<Value>,
    pipeline: &ScanPipeline<S, P>,
) -> Result<Value, Error>
where
    S: ObjectStore,
    P: FindingSink,
{
    let LambdaEvent { payload, context } = event;
    let request_id = context.request_id;

    match pipeline.process(payload).await {
        Ok(outcome) => {
            info!(request_id = %request_id, %outcome, "invocation succeeded");
            Ok(success_response())
        }
        Err(e) => {
            error!(request_id = %request_id, stage = e.stage(), error = %e, "invocation failed");
            Err(e.into())
        }
    }
}
