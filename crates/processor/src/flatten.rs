//! 이벤트 평탄화: 중첩 이벤트를 17열 행으로 변환
//!
//! 검증을 통과한 [`ScanCompletionEvent`]에 대해서는 항상 성공하며 부수 효과가 없습니다.
//! 같은 이벤트는 항상 같은 행을 만듭니다.

use serde_json::Value;

use ecrscan_core::error::EventError;
use ecrscan_core::event::ScanCompletionEvent;
use ecrscan_core::row::FlatRow;

/// `resources` 연결 구분자
pub const RESOURCES_SEPARATOR: &str = ",";
/// `image-tags` 연결 구분자
pub const IMAGE_TAGS_SEPARATOR: &str = "|";

/// 검증된 이벤트를 평탄화합니다.
pub fn flatten(event: &ScanCompletionEvent) -> FlatRow {
    let detail = &event.detail;
    let counts = &detail.severity_counts;

    FlatRow {
        version: event.version.clone(),
        id: event.id.clone(),
        detail_type: event.detail_type.clone(),
        source: event.source.clone(),
        account: event.account.clone(),
        time: event.time.clone(),
        region: event.region.clone(),
        resources: event.resources.join(RESOURCES_SEPARATOR),
        repository_name: detail.repository_name.clone(),
        image_digest: detail.image_digest.clone(),
        scan_status: detail.scan_status.clone(),
        severity_undefined: counts.undefined,
        severity_low: counts.low,
        severity_medium: counts.medium,
        severity_high: counts.high,
        severity_critical: counts.critical,
        image_tags: detail.image_tags.join(IMAGE_TAGS_SEPARATOR),
    }
}

/// 원시 JSON 이벤트를 검증한 뒤 평탄화합니다.
///
/// # Errors
///
/// 필수 경로가 없으면 `EventError::MissingField`를 반환합니다.
pub fn flatten_value(value: Value) -> Result<FlatRow, EventError> {
    let event = ScanCompletionEvent::from_value(value)?;
    Ok(flatten(&event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_json() -> Value {
        json!({
            "version": "0",
            "id": "evt-1",
            "detail-type": "ECR Image Scan",
            "source": "aws.ecr",
            "account": "123",
            "time": "2024-05-01T12:00:00Z",
            "region": "us-east-1",
            "resources": ["arn:aws:ecr:us-east-1:123:repository/app"],
            "detail": {
                "scan-status": "COMPLETE",
                "repository-name": "app",
                "image-digest": "sha256:7f5b2640fe6fb4f46592dfd3410c4a79dac4f89e4782432e0378abcd1234",
                "image-tags": ["v1", "latest"],
                "finding-severity-counts": { "HIGH": 2, "LOW": 5 }
            }
        })
    }

    #[test]
    fn copies_scalars_and_counts() {
        let row = flatten_value(event_json()).unwrap();
        assert_eq!(row.version, "0");
        assert_eq!(row.detail_type, "ECR Image Scan");
        assert_eq!(row.scan_status, "COMPLETE");
        assert_eq!(row.severity_high, 2);
        assert_eq!(row.severity_low, 5);
        assert_eq!(row.severity_undefined, 0);
        assert_eq!(row.severity_medium, 0);
        assert_eq!(row.severity_critical, 0);
    }

    #[test]
    fn single_resource_is_unchanged() {
        let row = flatten_value(event_json()).unwrap();
        assert_eq!(row.resources, "arn:aws:ecr:us-east-1:123:repository/app");
    }

    #[test]
    fn multiple_resources_join_with_comma() {
        let mut value = event_json();
        value["resources"] = json!(["arn:a", "arn:b"]);
        let row = flatten_value(value).unwrap();
        assert_eq!(row.resources, "arn:a,arn:b");
    }

    #[test]
    fn image_tags_join_with_pipe() {
        let row = flatten_value(event_json()).unwrap();
        assert_eq!(row.image_tags, "v1|latest");
    }

    #[test]
    fn empty_image_tags_is_empty_string() {
        let mut value = event_json();
        value["detail"]["image-tags"] = json!([]);
        let row = flatten_value(value).unwrap();
        assert_eq!(row.image_tags, "");
    }

    #[test]
    fn flatten_is_deterministic() {
        let a = flatten_value(event_json()).unwrap();
        let b = flatten_value(event_json()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_digest_is_missing_field() {
        let mut value = event_json();
        value["detail"]
            .as_object_mut()
            .unwrap()
            .remove("image-digest");
        let err = flatten_value(value).unwrap_err();
        assert!(matches!(
            err,
            EventError::MissingField { ref path } if path == "detail.image-digest"
        ));
    }
}
