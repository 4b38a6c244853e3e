//! 스캔 완료 이벤트: 입력 모델과 검증
//!
//! ECR은 이미지 스캔이 끝나면 EventBridge를 통해 다음 형태의 이벤트를 보냅니다.
//!
//! ```json
//! {
//!   "version": "0",
//!   "id": "85fc3613-e913-7fc4-a80c-a3753e4aa9ae",
//!   "detail-type": "ECR Image Scan",
//!   "source": "aws.ecr",
//!   "account": "123456789012",
//!   "time": "2024-05-01T12:00:00Z",
//!   "region": "us-east-1",
//!   "resources": ["arn:aws:ecr:us-east-1:123456789012:repository/app"],
//!   "detail": {
//!     "scan-status": "COMPLETE",
//!     "repository-name": "app",
//!     "image-digest": "sha256:7f5b2640fe6fb4f46592dfd3410c4a79dac4f89e4782432e0378abcd1234",
//!     "image-tags": ["v1", "latest"],
//!     "finding-severity-counts": { "HIGH": 2, "LOW": 5 },
//!     "findings": [{ "name": "CVE-2024-0001", "severity": "HIGH" }]
//!   }
//! }
//! ```
//!
//! 디코딩은 두 단계로 이루어집니다. 먼저 모든 필드가 선택적인 원시 문서로 읽은 뒤,
//! [`ScanCompletionEvent`]로 검증하면서 첫 번째 누락 경로를
//! [`EventError::MissingField`]로 보고합니다. 검증을 통과한 이벤트는
//! 평탄화와 finding 생성 모두에서 더 이상 실패하지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::EventError;
use crate::types::{FindingSeverity, SeverityCounts};

/// 검증된 스캔 완료 이벤트
///
/// `resources`는 비어 있지 않으며 첫 번째 원소가 리포지토리 ARN입니다.
#[derive(Debug, Clone)]
pub struct ScanCompletionEvent {
    pub version: String,
    pub id: String,
    pub detail_type: String,
    pub source: String,
    pub account: String,
    /// ISO-8601 문자열 그대로 보존
    pub time: String,
    pub region: String,
    pub resources: Vec<String>,
    pub detail: ScanDetail,
}

/// 이벤트 `detail` 섹션
#[derive(Debug, Clone)]
pub struct ScanDetail {
    pub repository_name: String,
    pub image_digest: String,
    pub scan_status: String,
    /// 단계별 개수 (누락 단계는 0)
    pub severity_counts: SeverityCounts,
    /// 수신한 개수 맵 원본 (키 순서 보존)
    pub raw_severity_counts: Map<String, Value>,
    pub image_tags: Vec<String>,
    pub findings: Vec<VulnerabilityRecord>,
}

/// 개별 취약점 레코드
///
/// 모든 필드가 선택적이며 누락 시 finding 생성 단계에서 기본값으로 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "packageName")]
    pub package_name: Option<String>,
    #[serde(default, rename = "packageVersion")]
    pub package_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    version: Option<String>,
    id: Option<String>,
    #[serde(rename = "detail-type")]
    detail_type: Option<String>,
    source: Option<String>,
    account: Option<String>,
    time: Option<String>,
    region: Option<String>,
    resources: Option<Vec<String>>,
    detail: Option<RawDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawDetail {
    repository_name: Option<String>,
    image_digest: Option<String>,
    scan_status: Option<String>,
    finding_severity_counts: Option<Map<String, Value>>,
    image_tags: Option<Vec<String>>,
    findings: Option<Vec<VulnerabilityRecord>>,
}

fn require<T>(value: Option<T>, path: &str) -> Result<T, EventError> {
    value.ok_or_else(|| EventError::missing(path))
}

impl ScanCompletionEvent {
    /// JSON 값에서 이벤트를 디코딩하고 검증합니다.
    ///
    /// 트리거가 이벤트를 JSON 문자열로 한 번 더 감싸 전달하는 경우도 있으므로,
    /// 값이 문자열이면 한 번 디코딩한 결과를 이벤트로 사용합니다.
    ///
    /// # Errors
    ///
    /// - `EventError::MissingField`: 필수 경로 누락 (필드 순서상 첫 번째)
    /// - `EventError::InvalidField`: 알려진 심각도 키의 음수/비정수 개수
    /// - `EventError::Malformed`: JSON 객체가 아니거나 타입이 맞지 않음
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        let value = match value {
            Value::String(encoded) => serde_json::from_str(&encoded).map_err(|e| {
                EventError::Malformed(format!("event string is not valid JSON: {e}"))
            })?,
            other => other,
        };

        if !value.is_object() {
            return Err(EventError::Malformed(
                "event must be a JSON object".to_owned(),
            ));
        }

        let raw: RawEvent =
            serde_json::from_value(value).map_err(|e| EventError::Malformed(e.to_string()))?;
        raw.validate()
    }

    /// JSON 문자열에서 이벤트를 디코딩하고 검증합니다.
    pub fn from_json_str(s: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(s).map_err(|e| EventError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// 리포지토리 ARN (`resources[0]`)
    pub fn repository_arn(&self) -> &str {
        self.resources.first().map_or("", String::as_str)
    }

    /// finding 리소스 경로 `<repository ARN>/<image digest>`
    pub fn image_resource_id(&self) -> String {
        format!("{}/{}", self.repository_arn(), self.detail.image_digest)
    }
}

impl RawEvent {
    fn validate(self) -> Result<ScanCompletionEvent, EventError> {
        let version = require(self.version, "version")?;
        let id = require(self.id, "id")?;
        let detail_type = require(self.detail_type, "detail-type")?;
        let source = require(self.source, "source")?;
        let account = require(self.account, "account")?;
        let time = require(self.time, "time")?;
        let region = require(self.region, "region")?;
        let resources = require(self.resources, "resources")?;
        if resources.is_empty() {
            return Err(EventError::missing("resources[0]"));
        }
        let detail = require(self.detail, "detail")?.validate()?;

        Ok(ScanCompletionEvent {
            version,
            id,
            detail_type,
            source,
            account,
            time,
            region,
            resources,
            detail,
        })
    }
}

impl RawDetail {
    fn validate(self) -> Result<ScanDetail, EventError> {
        let repository_name = require(self.repository_name, "detail.repository-name")?;
        let image_digest = require(self.image_digest, "detail.image-digest")?;
        let scan_status = require(self.scan_status, "detail.scan-status")?;
        let raw_severity_counts = require(
            self.finding_severity_counts,
            "detail.finding-severity-counts",
        )?;
        let image_tags = require(self.image_tags, "detail.image-tags")?;

        let severity_counts = parse_severity_counts(&raw_severity_counts)?;

        Ok(ScanDetail {
            repository_name,
            image_digest,
            scan_status,
            severity_counts,
            raw_severity_counts,
            image_tags,
            findings: self.findings.unwrap_or_default(),
        })
    }
}

/// 알려진 다섯 단계만 개수에 반영합니다.
///
/// ECR 기본 스캔이 보내는 `INFORMATIONAL` 같은 그 밖의 키는 경고만 남기고 건너뜁니다.
/// 원본 맵(`raw_severity_counts`)에는 그대로 남습니다.
fn parse_severity_counts(raw: &Map<String, Value>) -> Result<SeverityCounts, EventError> {
    let mut counts = SeverityCounts::default();
    for (key, value) in raw {
        let Some(severity) = FindingSeverity::from_wire(key) else {
            warn!(key = %key, "ignoring unrecognized severity count key");
            continue;
        };
        let count = value.as_u64().ok_or_else(|| EventError::InvalidField {
            path: format!("detail.finding-severity-counts.{key}"),
            reason: format!("count must be a non-negative integer, got {value}"),
        })?;
        counts.set(severity, count);
    }
    Ok(counts)
}

/// `sha256:` 접두사와 앞 12자리만 남긴 digest (로그용)
pub fn short_digest(digest: &str) -> &str {
    digest.get(..19).unwrap_or(digest)
}

impl fmt::Display for ScanCompletionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanCompletionEvent[{}] repo={} digest={} status={} findings={}",
            self.id.get(..8).unwrap_or(&self.id),
            self.detail.repository_name,
            short_digest(&self.detail.image_digest),
            self.detail.scan_status,
            self.detail.findings.len(),
        )
    }
}
