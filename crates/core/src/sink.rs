//! 외부 저장소 trait: 처리기의 두 부수 효과 지점
//!
//! 처리기가 외부와 상호작용하는 곳은 두 군데뿐입니다.
//!
//! - [`ObjectStore`]: CSV 행을 오브젝트로 저장 (운영: S3)
//! - [`FindingSink`]: finding을 집계 서비스로 전송 (운영: Security Hub)
//!
//! 두 클라이언트 모두 프로세스 시작 시 한 번 만들어 `Arc`로 파이프라인에
//! 주입합니다. 덕분에 네트워크 없이도 메모리 구현으로 전체 흐름을 테스트할 수 있습니다.
//!
//! ```text
//!            ┌──────────────┐
//!            │ ScanPipeline │
//!            └──────┬───────┘
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!   ┌─────────────┐   ┌─────────────┐
//!   │ ObjectStore │   │ FindingSink │  (trait)
//!   └─────────────┘   └─────────────┘
//!     │    │    │       │    │    │
//!    S3 Local Memory   SecHub JSONL Memory
//! ```

use std::future::Future;

use crate::error::{PublishError, StorageError};
use crate::finding::SecurityFinding;

/// 오브젝트 저장소 추상화
///
/// 동일 키에 대한 덮어쓰기 방지는 구현체의 책임이 아닙니다.
pub trait ObjectStore: Send + Sync + 'static {
    /// 저장소 이름 (로그용)
    fn name(&self) -> &str;

    /// 새 오브젝트를 씁니다.
    ///
    /// # Errors
    ///
    /// 쓰기 실패 시 `StorageError::WriteFailed`를 반환합니다. 재시도하지 않습니다.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// finding 집계 sink 추상화
pub trait FindingSink: Send + Sync + 'static {
    /// sink 이름 (로그용)
    fn name(&self) -> &str;

    /// finding 배치를 전송하고 수락된 개수를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `PublishError::SubmitFailed`: 호출 자체가 실패
    /// - `PublishError::Rejected`: 일부 또는 전체 finding이 거부됨
    fn import_findings(
        &self,
        findings: &[SecurityFinding],
    ) -> impl Future<Output = Result<usize, PublishError>> + Send;
}
