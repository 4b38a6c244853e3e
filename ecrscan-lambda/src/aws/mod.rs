//! AWS 클라이언트 어댑터
//!
//! core의 [`ObjectStore`](ecrscan_core::sink::ObjectStore)와
//! [`FindingSink`](ecrscan_core::sink::FindingSink)를 AWS SDK로 구현합니다.
//! 클라이언트는 프로세스 시작 시 한 번 만들고 모든 호출에서 재사용합니다.

pub mod s3;
pub mod security_hub;

pub use s3::S3ObjectStore;
pub use security_hub::SecurityHubSink;
