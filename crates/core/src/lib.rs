#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod event;
pub mod finding;
pub mod metrics;
pub mod row;
pub mod sink;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EcrScanError, EventError, PublishError, StorageError};

// 설정
pub use config::EcrScanConfig;

// 이벤트
pub use event::{ScanCompletionEvent, ScanDetail, VulnerabilityRecord};

// 출력 문서
pub use finding::SecurityFinding;
pub use row::FlatRow;

// 외부 저장소 trait
pub use sink::{FindingSink, ObjectStore};

// 도메인 타입
pub use types::{FindingSeverity, SeverityCounts, SeverityLabel};
