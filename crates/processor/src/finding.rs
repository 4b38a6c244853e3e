//! finding 생성: 검증된 이벤트에서 정규화된 취약점 finding 문서 파생
//!
//! 식별자 생성을 제외하면 순수 함수입니다. 같은 이벤트로 두 번 만들면 `Id`만 다릅니다.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use ecrscan_core::config::FindingsConfig;
use ecrscan_core::event::{ScanCompletionEvent, VulnerabilityRecord};
use ecrscan_core::finding::{
    EcrContainerImage, FINDING_TYPE_CVE, FindingProviderFields, FindingResource,
    FindingSeverityField, PROVIDER_TYPE_VULNERABILITIES, ProductFields, ProviderSeverity,
    RECORD_STATE_ACTIVE, RESOURCE_TYPE_ECR_IMAGE, ResourceDetails, SCHEMA_VERSION,
    SecurityFinding, VulnerabilityDetail,
};

/// 취약점 이름/패키지 필드 기본값
pub const DEFAULT_UNKNOWN: &str = "Unknown";
/// 취약점 심각도 기본값
pub const DEFAULT_SEVERITY: &str = "UNKNOWN";
/// 취약점 설명 기본값
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// finding 식별자 접미사 접두어
const ID_TAG: &str = "ecr-scan";

/// finding 생성기
///
/// 생성기 ID와 제품명만 설정에서 받고 나머지는 모두 이벤트에서 파생합니다.
#[derive(Debug, Clone)]
pub struct FindingBuilder {
    generator_id: String,
    product_name: String,
}

impl FindingBuilder {
    /// 설정으로 생성합니다.
    pub fn new(config: &FindingsConfig) -> Self {
        Self {
            generator_id: config.generator_id.clone(),
            product_name: config.product_name.clone(),
        }
    }

    /// 새 무작위 식별자로 finding을 만듭니다.
    pub fn build(&self, event: &ScanCompletionEvent) -> SecurityFinding {
        self.build_with_id(event, Uuid::new_v4())
    }

    /// 주어진 식별자로 finding을 만듭니다.
    pub fn build_with_id(&self, event: &ScanCompletionEvent, uid: Uuid) -> SecurityFinding {
        let detail = &event.detail;
        let label = detail.severity_counts.highest_label();
        let resource_id = event.image_resource_id();

        let finding = SecurityFinding {
            schema_version: SCHEMA_VERSION.to_owned(),
            id: format!("{resource_id}/{ID_TAG}-{uid}"),
            product_arn: product_arn(&event.region, &event.account),
            generator_id: self.generator_id.clone(),
            aws_account_id: event.account.clone(),
            types: vec![FINDING_TYPE_CVE.to_owned()],
            created_at: event.time.clone(),
            updated_at: event.time.clone(),
            severity: FindingSeverityField { label },
            title: format!("ECR Scan Results for Image: {}", detail.image_digest),
            description: format!(
                "Vulnerabilities found in Container Image: {}",
                detail.image_digest
            ),
            resources: vec![FindingResource {
                resource_type: RESOURCE_TYPE_ECR_IMAGE.to_owned(),
                id: resource_id,
                details: ResourceDetails {
                    aws_ecr_container_image: EcrContainerImage {
                        repository_name: detail.repository_name.clone(),
                        image_digest: detail.image_digest.clone(),
                        image_tags: detail.image_tags.clone(),
                    },
                },
            }],
            product_fields: ProductFields {
                product_name: self.product_name.clone(),
            },
            record_state: RECORD_STATE_ACTIVE.to_owned(),
            vulnerabilities: detail.findings.iter().map(vulnerability_detail).collect(),
            finding_provider_fields: FindingProviderFields {
                severity: ProviderSeverity {
                    label,
                    original: original_counts(&detail.raw_severity_counts),
                },
                types: vec![PROVIDER_TYPE_VULNERABILITIES.to_owned()],
            },
        };

        debug!(
            finding_id = %finding.id,
            severity = %label,
            vulnerabilities = finding.vulnerabilities.len(),
            "finding built"
        );
        finding
    }
}

/// 계정 기본 제품 ARN
pub fn product_arn(region: &str, account: &str) -> String {
    format!("arn:aws:securityhub:{region}:{account}:product/{account}/default")
}

/// 원본 개수 맵을 `", "` / `": "` 구분자로 직렬화합니다.
///
/// 키 순서는 입력 그대로입니다. 예: `{"HIGH": 2, "LOW": 5}`
fn original_counts(raw: &Map<String, Value>) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    match raw.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => Value::Object(raw.clone()).to_string(),
    }
}

/// 항목 사이 `", "`, 키와 값 사이 `": "`를 쓰는 한 줄 포매터
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn vulnerability_detail(record: &VulnerabilityRecord) -> VulnerabilityDetail {
    fn or(value: &Option<String>, default: &str) -> String {
        value.as_deref().unwrap_or(default).to_owned()
    }

    VulnerabilityDetail {
        name: or(&record.name, DEFAULT_UNKNOWN),
        severity: or(&record.severity, DEFAULT_SEVERITY),
        description: or(&record.description, DEFAULT_DESCRIPTION),
        package_name: or(&record.package_name, DEFAULT_UNKNOWN),
        package_version: or(&record.package_version, DEFAULT_UNKNOWN),
    }
}
