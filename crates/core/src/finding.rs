//! 보안 finding 문서
//!
//! 중앙 finding 집계 서비스(AWS Security Hub)가 받는 ASFF(AWS Security Finding
//! Format) 문서 중 처리기가 채우는 부분을 나타냅니다. JSON 직렬화 시 ASFF의
//! PascalCase 필드명을 그대로 사용합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::SeverityLabel;

/// ASFF 스키마 버전
pub const SCHEMA_VERSION: &str = "2018-10-08";
/// finding 유형
pub const FINDING_TYPE_CVE: &str = "Software and Configuration Checks/Vulnerabilities/CVE";
/// `FindingProviderFields.Types` 값
pub const PROVIDER_TYPE_VULNERABILITIES: &str = "Vulnerabilities";
/// 레코드 상태
pub const RECORD_STATE_ACTIVE: &str = "ACTIVE";
/// 리소스 유형
pub const RESOURCE_TYPE_ECR_IMAGE: &str = "AwsEcrContainerImage";

/// 정규화된 취약점 finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityFinding {
    pub schema_version: String,
    pub id: String,
    pub product_arn: String,
    pub generator_id: String,
    pub aws_account_id: String,
    pub types: Vec<String>,
    /// 이벤트 `time` 그대로
    pub created_at: String,
    /// 이벤트 `time` 그대로
    pub updated_at: String,
    pub severity: FindingSeverityField,
    pub title: String,
    pub description: String,
    pub resources: Vec<FindingResource>,
    pub product_fields: ProductFields,
    pub record_state: String,
    pub vulnerabilities: Vec<VulnerabilityDetail>,
    pub finding_provider_fields: FindingProviderFields,
}

/// `Severity` 필드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingSeverityField {
    pub label: SeverityLabel,
}

/// 리소스 참조
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub id: String,
    pub details: ResourceDetails,
}

/// 리소스 상세
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDetails {
    pub aws_ecr_container_image: EcrContainerImage,
}

/// ECR 컨테이너 이미지 상세
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EcrContainerImage {
    pub repository_name: String,
    pub image_digest: String,
    pub image_tags: Vec<String>,
}

/// `ProductFields`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductFields {
    pub product_name: String,
}

/// 개별 취약점 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VulnerabilityDetail {
    pub name: String,
    pub severity: String,
    pub description: String,
    pub package_name: String,
    pub package_version: String,
}

/// `FindingProviderFields`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingProviderFields {
    pub severity: ProviderSeverity,
    pub types: Vec<String>,
}

/// 제공자 심각도: 파생 라벨과 원본 개수 맵(JSON 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderSeverity {
    pub label: SeverityLabel,
    pub original: String,
}

impl SecurityFinding {
    /// 대표 심각도 라벨
    pub fn label(&self) -> SeverityLabel {
        self.severity.label
    }
}

impl fmt::Display for SecurityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (vulnerabilities: {})",
            self.severity.label,
            self.title,
            self.vulnerabilities.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SecurityFinding {
        SecurityFinding {
            schema_version: SCHEMA_VERSION.to_owned(),
            id: "arn/sha256:abc/ecr-scan-1".to_owned(),
            product_arn: "arn:aws:securityhub:us-east-1:123:product/123/default".to_owned(),
            generator_id: "ecr-scan-lambda".to_owned(),
            aws_account_id: "123".to_owned(),
            types: vec![FINDING_TYPE_CVE.to_owned()],
            created_at: "2024-05-01T12:00:00Z".to_owned(),
            updated_at: "2024-05-01T12:00:00Z".to_owned(),
            severity: FindingSeverityField {
                label: SeverityLabel::High,
            },
            title: "ECR Scan Results for Image: sha256:abc".to_owned(),
            description: "Vulnerabilities found in Container Image: sha256:abc".to_owned(),
            resources: vec![FindingResource {
                resource_type: RESOURCE_TYPE_ECR_IMAGE.to_owned(),
                id: "arn/sha256:abc".to_owned(),
                details: ResourceDetails {
                    aws_ecr_container_image: EcrContainerImage {
                        repository_name: "app".to_owned(),
                        image_digest: "sha256:abc".to_owned(),
                        image_tags: vec!["v1".to_owned()],
                    },
                },
            }],
            product_fields: ProductFields {
                product_name: "ECR Scan".to_owned(),
            },
            record_state: RECORD_STATE_ACTIVE.to_owned(),
            vulnerabilities: vec![],
            finding_provider_fields: FindingProviderFields {
                severity: ProviderSeverity {
                    label: SeverityLabel::High,
                    original: r#"{"HIGH":2}"#.to_owned(),
                },
                types: vec![PROVIDER_TYPE_VULNERABILITIES.to_owned()],
            },
        }
    }

    #[test]
    fn serializes_with_asff_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["SchemaVersion"], "2018-10-08");
        assert_eq!(json["Severity"]["Label"], "HIGH");
        assert_eq!(json["Resources"][0]["Type"], "AwsEcrContainerImage");
        assert_eq!(
            json["Resources"][0]["Details"]["AwsEcrContainerImage"]["RepositoryName"],
            "app"
        );
        assert_eq!(json["ProductFields"]["ProductName"], "ECR Scan");
        assert_eq!(json["RecordState"], "ACTIVE");
        assert_eq!(
            json["FindingProviderFields"]["Severity"]["Original"],
            r#"{"HIGH":2}"#
        );
        assert!(json["Vulnerabilities"].as_array().unwrap().is_empty());
    }

    #[test]
    fn vulnerability_detail_uses_pascal_case() {
        let detail = VulnerabilityDetail {
            name: "CVE-2024-0001".to_owned(),
            severity: "HIGH".to_owned(),
            description: "overflow".to_owned(),
            package_name: "openssl".to_owned(),
            package_version: "3.0.1".to_owned(),
        };
        let json = serde_json::to_value(detail).unwrap();
        assert_eq!(json["PackageName"], "openssl");
        assert_eq!(json["PackageVersion"], "3.0.1");
    }

    #[test]
    fn display_contains_label_and_title() {
        let display = sample().to_string();
        assert!(display.contains("HIGH"));
        assert!(display.contains("ECR Scan Results"));
    }
}
