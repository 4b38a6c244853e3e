//! 평탄화된 행: 배치 분석용 17열 스키마

use serde::{Deserialize, Serialize};

/// 행 스키마의 열 이름 (순서 고정)
pub const COLUMNS: [&str; 17] = [
    "version",
    "id",
    "detail_type",
    "source",
    "account",
    "time",
    "region",
    "resources",
    "repository_name",
    "image_digest",
    "scan_status",
    "severity_undefined",
    "severity_low",
    "severity_medium",
    "severity_high",
    "severity_critical",
    "image_tags",
];

/// 스캔 완료 이벤트 한 건에 대응하는 행
///
/// 필드 선언 순서가 곧 [`COLUMNS`] 순서이며, CSV 직렬화도 이 순서를 따릅니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub version: String,
    pub id: String,
    pub detail_type: String,
    pub source: String,
    pub account: String,
    pub time: String,
    pub region: String,
    /// `resources`를 `,`로 연결
    pub resources: String,
    pub repository_name: String,
    pub image_digest: String,
    pub scan_status: String,
    pub severity_undefined: u64,
    pub severity_low: u64,
    pub severity_medium: u64,
    pub severity_high: u64,
    pub severity_critical: u64,
    /// `image-tags`를 `|`로 연결
    pub image_tags: String,
}

impl FlatRow {
    /// 열 순서대로 값을 문자열로 반환합니다.
    pub fn values(&self) -> [String; 17] {
        [
            self.version.clone(),
            self.id.clone(),
            self.detail_type.clone(),
            self.source.clone(),
            self.account.clone(),
            self.time.clone(),
            self.region.clone(),
            self.resources.clone(),
            self.repository_name.clone(),
            self.image_digest.clone(),
            self.scan_status.clone(),
            self.severity_undefined.to_string(),
            self.severity_low.to_string(),
            self.severity_medium.to_string(),
            self.severity_high.to_string(),
            self.severity_critical.to_string(),
            self.image_tags.clone(),
        ]
    }
}
