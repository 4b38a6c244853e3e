//! 행 저장: 평탄화된 행을 CSV 오브젝트 하나로 기록

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};

use ecrscan_core::config::StorageConfig;
use ecrscan_core::error::StorageError;
use ecrscan_core::row::FlatRow;
use ecrscan_core::sink::ObjectStore;

use crate::encode::{CSV_CONTENT_TYPE, encode_csv};
use crate::key::{object_key, random_suffix};

/// 저장된 오브젝트 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    /// 기록한 바이트 수
    pub size: usize,
}

/// 행을 오브젝트 저장소에 기록합니다.
///
/// 이벤트 1건당 새 오브젝트 1개를 씁니다. 기존 오브젝트를 덮어쓰지 않도록
/// 키에 처리 시각을 포함합니다.
pub struct RowPersister<S: ObjectStore> {
    store: Arc<S>,
    bucket: String,
    key_prefix: String,
    unique_suffix: bool,
}

impl<S: ObjectStore> RowPersister<S> {
    /// 저장 설정으로 생성합니다.
    pub fn new(store: Arc<S>, config: &StorageConfig) -> Self {
        Self {
            store,
            bucket: config.bucket_name.clone(),
            key_prefix: config.key_prefix.clone(),
            unique_suffix: config.unique_suffix,
        }
    }

    /// 현재 UTC 시각으로 키를 만들어 행을 기록합니다.
    pub async fn persist(&self, row: &FlatRow) -> Result<StoredObject, StorageError> {
        self.persist_at(row, OffsetDateTime::now_utc()).await
    }

    /// 주어진 시각으로 키를 만들어 행을 기록합니다.
    ///
    /// # Errors
    ///
    /// - `StorageError::Encode`: CSV 직렬화 실패
    /// - `StorageError::WriteFailed`: 저장소 쓰기 실패 (재시도 없음)
    pub async fn persist_at(
        &self,
        row: &FlatRow,
        now: OffsetDateTime,
    ) -> Result<StoredObject, StorageError> {
        let suffix = self.unique_suffix.then(random_suffix);
        let key = object_key(
            &self.key_prefix,
            &row.repository_name,
            &row.image_digest,
            now,
            suffix.as_deref(),
        )?;

        let body = encode_csv(row)?;
        let size = body.len();
        debug!(
            store = self.store.name(),
            bucket = %self.bucket,
            key = %key,
            size,
            "writing scan row"
        );

        self.store
            .put_object(&self.bucket, &key, body, CSV_CONTENT_TYPE)
            .await?;

        info!(bucket = %self.bucket, key = %key, "scan row stored");
        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key,
            size,
        })
    }
}
