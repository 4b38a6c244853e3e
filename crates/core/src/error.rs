//! 에러 타입: 도메인별 에러 정의
//!
//! 처리 파이프라인의 모든 실패는 [`EcrScanError`]로 모여 호출 경계(Lambda 핸들러,
//! CLI)까지 그대로 전파됩니다. 내부 재시도나 대체 경로는 없습니다.

/// ECR 스캔 처리기 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum EcrScanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 입력 이벤트 검증 에러
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// 행(row) 저장 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// finding 전송 에러
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EcrScanError {
    /// 메트릭/로그에 사용할 실패 단계명을 반환합니다.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Event(_) => "validate",
            Self::Storage(_) => "persist",
            Self::Publish(_) => "publish",
            Self::Io(_) => "io",
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 입력 이벤트 에러
///
/// `path`는 와이어 형식의 점 표기 경로입니다 (예: `detail.image-digest`, `resources[0]`).
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// 필수 경로 누락
    #[error("missing required field: {path}")]
    MissingField { path: String },

    /// 값은 있으나 허용되지 않는 내용
    #[error("invalid field '{path}': {reason}")]
    InvalidField { path: String, reason: String },

    /// JSON 디코딩 실패 (잘못된 타입, 깨진 문서 등)
    #[error("malformed event: {0}")]
    Malformed(String),
}

impl EventError {
    /// 누락 필드 에러를 생성합니다.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }
}

/// 행 저장 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// CSV 직렬화 실패
    #[error("failed to encode row: {0}")]
    Encode(String),

    /// 오브젝트 쓰기 실패
    #[error("failed to write s3://{bucket}/{key}: {reason}")]
    WriteFailed {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// finding 전송 에러
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// sink 고유 요청 형식으로 변환 실패
    #[error("failed to build finding request: {0}")]
    Build(String),

    /// 전송 호출 자체가 실패
    #[error("finding submission failed: {0}")]
    SubmitFailed(String),

    /// sink가 요청은 받았지만 finding을 거부
    #[error("{failed} finding(s) rejected: {reason}")]
    Rejected { failed: usize, reason: String },
}
