//! Security Hub finding sink
//!
//! [`SecurityFinding`]을 SDK의 `AwsSecurityFinding`으로 변환해
//! `BatchImportFindings`로 전송합니다. 응답에 실패 항목이 하나라도 있으면
//! `PublishError::Rejected`입니다.
//!
//! SDK의 `Vulnerability` 타입에는 설명 필드가 없으므로 취약점별 설명은 전송하지
//! 않습니다. 취약점 이름은 `Id`, 심각도는 `Vendor.VendorSeverity`, 패키지는
//! `VulnerablePackages[0]`에 들어갑니다.

use aws_sdk_securityhub::Client;
use aws_sdk_securityhub::error::DisplayErrorContext;
use aws_sdk_securityhub::types::{
    AwsEcrContainerImageDetails, AwsSecurityFinding, FindingProviderFields,
    FindingProviderSeverity, RecordState, Resource, ResourceDetails, Severity, SeverityLabel,
    SoftwarePackage, Vulnerability, VulnerabilityVendor,
};
use tracing::{debug, warn};

use ecrscan_core::error::PublishError;
use ecrscan_core::finding::{SecurityFinding, VulnerabilityDetail};
use ecrscan_core::sink::FindingSink;

/// `ProductFields`의 제품명 키
pub const PRODUCT_NAME_FIELD: &str = "ProductName";
/// 취약점 벤더 이름
pub const VULNERABILITY_VENDOR: &str = "Amazon ECR";

/// `BatchImportFindings` 기반 sink
#[derive(Debug, Clone)]
pub struct SecurityHubSink {
    client: Client,
}

impl SecurityHubSink {
    /// 공유 SDK 설정으로 만든 클라이언트를 감쌉니다.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FindingSink for SecurityHubSink {
    fn name(&self) -> &str {
        "securityhub"
    }

    async fn import_findings(&self, findings: &[SecurityFinding]) -> Result<usize, PublishError> {
        let mut request = self.client.batch_import_findings();
        for finding in findings {
            request = request.findings(to_asff(finding)?);
        }

        let output = request
            .send()
            .await
            .map_err(|e| PublishError::SubmitFailed(DisplayErrorContext(&e).to_string()))?;

        let failed = output.failed_findings();
        if !failed.is_empty() {
            let reason = failed
                .iter()
                .map(|f| format!("{:?}: {:?} {:?}", f.id(), f.error_code(), f.error_message()))
                .collect::<Vec<_>>()
                .join("; ");
            warn!(failed = failed.len(), %reason, "security hub rejected findings");
            return Err(PublishError::Rejected {
                failed: failed.len(),
                reason,
            });
        }

        debug!(count = findings.len(), "batch_import_findings completed");
        Ok(findings.len())
    }
}

fn build_error(what: &str, e: impl std::fmt::Display) -> PublishError {
    PublishError::Build(format!("{what}: {e}"))
}

/// 정규화된 finding을 SDK 요청 타입으로 변환합니다.
///
/// # Errors
///
/// 필수 필드가 비어 SDK 빌더가 실패하면 `PublishError::Build`를 반환합니다.
pub fn to_asff(finding: &SecurityFinding) -> Result<AwsSecurityFinding, PublishError> {
    let label = SeverityLabel::from(finding.severity.label.as_str());

    let mut builder = AwsSecurityFinding::builder()
        .schema_version(&finding.schema_version)
        .id(&finding.id)
        .product_arn(&finding.product_arn)
        .generator_id(&finding.generator_id)
        .aws_account_id(&finding.aws_account_id)
        .created_at(&finding.created_at)
        .updated_at(&finding.updated_at)
        .severity(Severity::builder().label(label.clone()).build())
        .title(&finding.title)
        .description(&finding.description)
        .product_fields(PRODUCT_NAME_FIELD, &finding.product_fields.product_name)
        .record_state(RecordState::from(finding.record_state.as_str()))
        .finding_provider_fields(
            FindingProviderFields::builder()
                .severity(
                    FindingProviderSeverity::builder()
                        .label(label)
                        .original(&finding.finding_provider_fields.severity.original)
                        .build(),
                )
                .set_types(Some(finding.finding_provider_fields.types.clone()))
                .build(),
        )
        .set_types(Some(finding.types.clone()));

    for resource in &finding.resources {
        let image = &resource.details.aws_ecr_container_image;
        let details = ResourceDetails::builder()
            .aws_ecr_container_image(
                AwsEcrContainerImageDetails::builder()
                    .repository_name(&image.repository_name)
                    .image_digest(&image.image_digest)
                    .set_image_tags(Some(image.image_tags.clone()))
                    .build(),
            )
            .build();
        let resource = Resource::builder()
            .r#type(&resource.resource_type)
            .id(&resource.id)
            .details(details)
            .build();
        builder = builder.resources(resource);
    }

    for detail in &finding.vulnerabilities {
        builder = builder.vulnerabilities(to_vulnerability(detail)?);
    }

    Ok(builder.build())
}

fn to_vulnerability(detail: &VulnerabilityDetail) -> Result<Vulnerability, PublishError> {
    let vendor = VulnerabilityVendor::builder()
        .name(VULNERABILITY_VENDOR)
        .vendor_severity(&detail.severity)
        .build();

    Ok(Vulnerability::builder()
        .id(&detail.name)
        .vendor(vendor)
        .vulnerable_packages(
            SoftwarePackage::builder()
                .name(&detail.package_name)
                .version(&detail.package_version)
                .build(),
        )
        .build())
}
