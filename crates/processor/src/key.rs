//! 오브젝트 키 생성
//!
//! 형식: `<prefix>-<repository>-<digest 12자>-<YYYYMMDD-HHMMSS>.csv`
//!
//! digest는 알고리즘 접두사(`sha256:`)를 떼어낸 16진 문자열의 앞 12자만 사용합니다.
//! 타임스탬프는 처리 시점의 UTC이며 초 단위입니다. 같은 이미지를 같은 초에 두 번
//! 처리하면 키가 겹칠 수 있으므로 필요하면 무작위 접미사를 붙입니다.

use time::OffsetDateTime;
use time::macros::format_description;

use ecrscan_core::error::StorageError;

/// digest에서 사용하는 16진 문자 수
pub const DIGEST_CHARS: usize = 12;

/// 키 확장자
pub const KEY_EXTENSION: &str = "csv";

/// digest의 알고리즘 접두사를 제거하고 앞 12자를 반환합니다.
///
/// 12자보다 짧으면 전체를 반환합니다.
pub fn digest_fragment(digest: &str) -> &str {
    let hex = digest.split_once(':').map_or(digest, |(_, rest)| rest);
    hex.get(..DIGEST_CHARS).unwrap_or(hex)
}

/// 오브젝트 키를 생성합니다.
///
/// `suffix`가 주어지면 타임스탬프 뒤에 `-<suffix>`를 덧붙입니다.
///
/// # Errors
///
/// 타임스탬프 포맷 실패 시 `StorageError::Encode`를 반환합니다.
pub fn object_key(
    prefix: &str,
    repository: &str,
    digest: &str,
    now: OffsetDateTime,
    suffix: Option<&str>,
) -> Result<String, StorageError> {
    let stamp = now
        .format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .map_err(|e| StorageError::Encode(format!("timestamp format: {e}")))?;

    let fragment = digest_fragment(digest);
    let key = match suffix {
        Some(suffix) => {
            format!("{prefix}-{repository}-{fragment}-{stamp}-{suffix}.{KEY_EXTENSION}")
        }
        None => format!("{prefix}-{repository}-{fragment}-{stamp}.{KEY_EXTENSION}"),
    };
    Ok(key)
}

/// 키 충돌 방지용 8자리 16진 접미사
pub fn random_suffix() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_owned()
}
