//! 로컬 파일 sink: 오프라인 재처리(CLI)용
//!
//! - [`LocalObjectStore`]: `<root>/<bucket>/<key>` 경로에 오브젝트를 파일로 기록
//! - [`JsonLinesSink`]: finding 하나당 JSON 한 줄을 파일 끝에 추가

use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use ecrscan_core::error::{PublishError, StorageError};
use ecrscan_core::finding::SecurityFinding;
use ecrscan_core::sink::{FindingSink, ObjectStore};

/// 디렉터리 기반 오브젝트 저장소
///
/// 버킷은 하위 디렉터리로, 키에 포함된 `/`는 중첩 디렉터리로 매핑됩니다.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// 루트 디렉터리를 지정해 생성합니다. 디렉터리는 첫 쓰기 때 만들어집니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 오브젝트가 기록될 경로
    ///
    /// 절대 경로나 `..` 구성 요소가 들어간 버킷/키는 거부합니다.
    pub fn object_path(&self, bucket: &str, key: &str) -> Option<PathBuf> {
        if !is_relative_plain(bucket) || !is_relative_plain(key) {
            return None;
        }
        Some(self.root.join(bucket).join(key))
    }
}

fn is_relative_plain(s: &str) -> bool {
    !s.is_empty()
        && Path::new(s)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let write_failed = |reason: String| StorageError::WriteFailed {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            reason,
        };

        let path = self
            .object_path(bucket, key)
            .ok_or_else(|| write_failed("bucket and key must be plain relative paths".to_owned()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(e.to_string()))?;
        }

        tokio::fs::write(&path, body)
            .await
            .map_err(|e| write_failed(e.to_string()))?;

        debug!(path = %path.display(), "object written to local store");
        Ok(())
    }
}

/// JSON Lines finding sink
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// 출력 파일 경로를 지정해 생성합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 출력 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FindingSink for JsonLinesSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn import_findings(&self, findings: &[SecurityFinding]) -> Result<usize, PublishError> {
        let mut buf = Vec::new();
        for finding in findings {
            serde_json::to_writer(&mut buf, finding)
                .map_err(|e| PublishError::Build(e.to_string()))?;
            buf.push(b'\n');
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PublishError::SubmitFailed(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PublishError::SubmitFailed(e.to_string()))?;
        file.write_all(&buf)
            .await
            .map_err(|e| PublishError::SubmitFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| PublishError::SubmitFailed(e.to_string()))?;

        Ok(findings.len())
    }
}
