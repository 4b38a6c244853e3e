//! S3 오브젝트 저장소

use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use ecrscan_core::error::StorageError;
use ecrscan_core::sink::ObjectStore;

/// `PutObject` 기반 저장소
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// 공유 SDK 설정으로 만든 클라이언트를 감쌉니다.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::WriteFailed {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(bucket, key, etag = ?output.e_tag(), "put_object completed");
        Ok(())
    }
}
