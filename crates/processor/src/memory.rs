//! 메모리 저장소: 테스트와 드라이런용 sink 구현
//!
//! 기록된 오브젝트와 finding을 그대로 보관하며, 실패 모드를 켜면 모든 호출이
//! 실패합니다.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ecrscan_core::error::{PublishError, StorageError};
use ecrscan_core::finding::SecurityFinding;
use ecrscan_core::sink::{FindingSink, ObjectStore};

/// 메모리에 기록된 오브젝트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 메모리 오브젝트 저장소
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredBlob>>,
    fail_writes: bool,
}

impl MemoryObjectStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 쓰기가 실패하도록 설정합니다.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// 기록된 오브젝트 목록 (기록 순서)
    pub fn objects(&self) -> Vec<StoredBlob> {
        lock(&self.objects).clone()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                reason: "simulated write failure".to_owned(),
            });
        }

        lock(&self.objects).push(StoredBlob {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            body,
            content_type: content_type.to_owned(),
        });
        Ok(())
    }
}

/// 메모리 finding sink
#[derive(Debug, Default)]
pub struct MemoryFindingSink {
    findings: Mutex<Vec<SecurityFinding>>,
    fail_imports: bool,
}

impl MemoryFindingSink {
    /// 빈 sink를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 전송이 실패하도록 설정합니다.
    pub fn with_failing_imports(mut self) -> Self {
        self.fail_imports = true;
        self
    }

    /// 수락된 finding 목록
    pub fn findings(&self) -> Vec<SecurityFinding> {
        lock(&self.findings).clone()
    }
}

impl FindingSink for MemoryFindingSink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn import_findings(&self, findings: &[SecurityFinding]) -> Result<usize, PublishError> {
        if self.fail_imports {
            return Err(PublishError::SubmitFailed(
                "simulated submission failure".to_owned(),
            ));
        }

        lock(&self.findings).extend_from_slice(findings);
        Ok(findings.len())
    }
}
