//! 도메인 타입: 심각도 모델
//!
//! ECR 스캔 이벤트는 다섯 단계의 심각도별 개수(`UNDEFINED`..`CRITICAL`)를 보고하고,
//! finding 문서는 하나의 대표 심각도 라벨(`INFORMATIONAL`..`CRITICAL`)을 가집니다.
//! 이 모듈은 두 체계와 그 사이의 변환 규칙을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ECR 스캔이 보고하는 심각도 단계
///
/// `finding-severity-counts` 맵의 키로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingSeverity {
    /// 분류되지 않음
    Undefined,
    /// 낮음
    Low,
    /// 중간
    Medium,
    /// 높음
    High,
    /// 치명적
    Critical,
}

impl FindingSeverity {
    /// 높은 단계부터 낮은 단계 순서의 전체 목록
    pub const DESCENDING: [FindingSeverity; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Undefined,
    ];

    /// 와이어 라벨을 정확히 일치하는 경우에만 파싱합니다.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "UNDEFINED" => Some(Self::Undefined),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 와이어 라벨을 반환합니다.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Undefined => "UNDEFINED",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// 이 단계가 finding에서 어떤 라벨로 표현되는지 반환합니다.
    ///
    /// `UNDEFINED`는 별도 라벨이 없으므로 `INFORMATIONAL`로 취급합니다.
    pub fn label(&self) -> SeverityLabel {
        match self {
            Self::Undefined => SeverityLabel::Informational,
            Self::Low => SeverityLabel::Low,
            Self::Medium => SeverityLabel::Medium,
            Self::High => SeverityLabel::High,
            Self::Critical => SeverityLabel::Critical,
        }
    }
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// finding 대표 심각도 라벨
///
/// `Ord` 구현으로 비교가 가능합니다
/// (`Informational < Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityLabel {
    /// 정보성: 보고된 취약점 없음
    #[default]
    Informational,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적: 즉시 대응 필요
    Critical,
}

impl SeverityLabel {
    /// 와이어 라벨을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "INFORMATIONAL",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도 단계별 취약점 개수
///
/// 누락된 단계는 0입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub undefined: u64,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl SeverityCounts {
    /// 단계의 개수를 반환합니다.
    pub fn get(&self, severity: FindingSeverity) -> u64 {
        match severity {
            FindingSeverity::Undefined => self.undefined,
            FindingSeverity::Low => self.low,
            FindingSeverity::Medium => self.medium,
            FindingSeverity::High => self.high,
            FindingSeverity::Critical => self.critical,
        }
    }

    /// 단계의 개수를 설정합니다.
    pub fn set(&mut self, severity: FindingSeverity, count: u64) {
        match severity {
            FindingSeverity::Undefined => self.undefined = count,
            FindingSeverity::Low => self.low = count,
            FindingSeverity::Medium => self.medium = count,
            FindingSeverity::High => self.high = count,
            FindingSeverity::Critical => self.critical = count,
        }
    }

    /// 개수가 0보다 큰 가장 높은 단계의 라벨을 반환합니다.
    ///
    /// 낮은 단계의 개수가 아무리 커도 높은 단계가 하나라도 있으면 높은 단계가 이깁니다.
    /// 모든 개수가 0이면 `INFORMATIONAL`입니다.
    pub fn highest_label(&self) -> SeverityLabel {
        FindingSeverity::DESCENDING
            .iter()
            .find(|s| self.get(**s) > 0)
            .map(|s| s.label())
            .unwrap_or_default()
    }
}

impl fmt::Display for SeverityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "critical={} high={} medium={} low={} undefined={}",
            self.critical, self.high, self.medium, self.low, self.undefined,
        )
    }
}
