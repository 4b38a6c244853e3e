//! 설정 관리: ecrscan.toml 파싱 및 런타임 설정
//!
//! [`EcrScanConfig`]는 처리기의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`BUCKET_NAME`, `ECRSCAN_STORAGE_KEY_PREFIX=scans` 형식)
//! 2. 설정 파일 (`ecrscan.toml`, 선택)
//! 3. 기본값 (`Default` 구현)
//!
//! Lambda에서는 보통 설정 파일 없이 환경변수만 사용합니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ecrscan_core::error::EcrScanError> {
//! use ecrscan_core::config::EcrScanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = EcrScanConfig::load("ecrscan.toml").await?;
//!
//! // 환경변수만 사용
//! let config = EcrScanConfig::from_env()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, EcrScanError};

/// 배포된 함수가 버킷 이름을 받는 환경변수
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";

/// ECR 스캔 처리기 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcrScanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 행 저장 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// finding 전송 설정
    #[serde(default)]
    pub findings: FindingsConfig,
}

impl EcrScanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EcrScanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, EcrScanError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    ///
    /// 버킷 이름은 보통 환경변수로 주어지므로 검증은 오버라이드 이후에 수행합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, EcrScanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EcrScanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                EcrScanError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, EcrScanError> {
        toml::from_str(toml_str).map_err(|e| {
            EcrScanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ECRSCAN_{SECTION}_{FIELD}`.
    /// `BUCKET_NAME`은 배포 스택이 주입하는 이름으로, `ECRSCAN_STORAGE_BUCKET_NAME`보다
    /// 먼저 적용되고 후자가 있으면 후자가 이깁니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ECRSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ECRSCAN_GENERAL_LOG_FORMAT");

        // Storage
        override_string(&mut self.storage.bucket_name, ENV_BUCKET_NAME);
        override_string(
            &mut self.storage.bucket_name,
            "ECRSCAN_STORAGE_BUCKET_NAME",
        );
        override_string(&mut self.storage.key_prefix, "ECRSCAN_STORAGE_KEY_PREFIX");
        override_bool(
            &mut self.storage.unique_suffix,
            "ECRSCAN_STORAGE_UNIQUE_SUFFIX",
        );

        // Findings
        override_bool(&mut self.findings.enabled, "ECRSCAN_FINDINGS_ENABLED");
        override_string(
            &mut self.findings.generator_id,
            "ECRSCAN_FINDINGS_GENERATOR_ID",
        );
        override_string(
            &mut self.findings.product_name,
            "ECRSCAN_FINDINGS_PRODUCT_NAME",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 섹션별 `validate`를 순서대로 호출합니다.
    pub fn validate(&self) -> Result<(), EcrScanError> {
        self.general.validate()?;
        self.storage.validate()?;
        self.findings.validate()
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> EcrScanError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl GeneralConfig {
    /// 로그 레벨과 형식을 검증합니다.
    pub fn validate(&self) -> Result<(), EcrScanError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 행 저장 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 대상 버킷 이름
    pub bucket_name: String,
    /// 오브젝트 키 접두사 (`<prefix>-<repo>-<digest12>-<timestamp>.csv`)
    pub key_prefix: String,
    /// 키 끝에 임의 8자리 hex를 붙여 같은 초 안의 충돌을 피할지 여부
    pub unique_suffix: bool,
}

impl StorageConfig {
    /// 버킷 이름과 키 접두사를 검증합니다.
    pub fn validate(&self) -> Result<(), EcrScanError> {
        if self.bucket_name.trim().is_empty() {
            return Err(invalid(
                "storage.bucket_name",
                format!("must not be empty (set {ENV_BUCKET_NAME})"),
            ));
        }

        if self.key_prefix.is_empty() {
            return Err(invalid("storage.key_prefix", "must not be empty"));
        }

        // 키 접두사는 오브젝트 "경로"가 되므로 상위 경로 이동을 막는다
        if self.key_prefix.split('/').any(|part| part == "..") {
            return Err(invalid(
                "storage.key_prefix",
                "must not contain '..' segments",
            ));
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_name: String::new(),
            key_prefix: "ecr-scan".to_owned(),
            unique_suffix: false,
        }
    }
}

/// finding 전송 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingsConfig {
    /// finding 전송 활성화 여부 (비활성화 시 행만 저장)
    pub enabled: bool,
    /// `GeneratorId` 값
    pub generator_id: String,
    /// `ProductFields.ProductName` 값
    pub product_name: String,
}

impl FindingsConfig {
    /// 전송이 켜져 있으면 생성기 ID가 비어 있지 않아야 합니다.
    pub fn validate(&self) -> Result<(), EcrScanError> {
        if self.enabled && self.generator_id.is_empty() {
            return Err(invalid(
                "findings.generator_id",
                "must not be empty when findings are enabled",
            ));
        }
        Ok(())
    }
}

impl Default for FindingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            generator_id: "ecr-scan-lambda".to_owned(),
            product_name: "ECR Scan".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> EcrScanConfig {
        let mut config = EcrScanConfig::default();
        config.storage.bucket_name = "scan-results".to_owned();
        config
    }

    #[test]
    fn default_config_has_sane_values() {
        let config = EcrScanConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.storage.key_prefix, "ecr-scan");
        assert!(!config.storage.unique_suffix);
        assert!(config.findings.enabled);
        assert_eq!(config.findings.generator_id, "ecr-scan-lambda");
        assert_eq!(config.findings.product_name, "ECR Scan");
    }

    #[test]
    fn default_config_requires_bucket() {
        let err = EcrScanConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("storage.bucket_name"));
    }

    #[test]
    fn config_with_bucket_passes_validation() {
        valid().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = EcrScanConfig::parse("").unwrap();
        assert_eq!(config.storage.key_prefix, "ecr-scan");
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[storage]
bucket_name = "my-bucket"
unique_suffix = true
"#;
        let config = EcrScanConfig::parse(toml).unwrap();
        assert_eq!(config.storage.bucket_name, "my-bucket");
        assert!(config.storage.unique_suffix);
        // key_prefix는 기본값 유지
        assert_eq!(config.storage.key_prefix, "ecr-scan");
        assert_eq!(config.general.log_format, "json");
    }

    #[test]
    fn parse_malformed_toml_is_parse_error() {
        let err = EcrScanConfig::parse("[storage\nbucket_name =").unwrap_err();
        assert!(matches!(
            err,
            EcrScanError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = valid();
        config.general.log_level = "verbose".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = valid();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_bucket() {
        let mut config = valid();
        config.storage.bucket_name = "   ".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let mut config = valid();
        config.storage.key_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_traversal_prefix() {
        let mut config = valid();
        config.storage.key_prefix = "scans/../other".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_nested_prefix() {
        let mut config = valid();
        config.storage.key_prefix = "raw/ecr-scan".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_generator_when_enabled() {
        let mut config = valid();
        config.findings.generator_id = String::new();
        assert!(config.validate().is_err());

        config.findings.enabled = false;
        config.validate().unwrap();
    }

    #[test]
    fn section_validation_skips_other_sections() {
        let mut config = EcrScanConfig::default();
        assert!(config.storage.validate().is_err());
        config.general.validate().unwrap();
        config.findings.validate().unwrap();

        config.general.log_format = "xml".to_owned();
        let err = config.general.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_format"));
    }

    #[test]
    #[serial_test::serial]
    fn override_string_reads_env() {
        let mut value = "original".to_owned();
        // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_ECRSCAN_STR", "overridden") };
        override_string(&mut value, "TEST_ECRSCAN_STR");
        unsafe { std::env::remove_var("TEST_ECRSCAN_STR") };
        assert_eq!(value, "overridden");
    }

    #[test]
    #[serial_test::serial]
    fn override_bool_ignores_garbage() {
        let mut value = true;
        // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_ECRSCAN_BOOL_BAD", "not-a-bool") };
        override_bool(&mut value, "TEST_ECRSCAN_BOOL_BAD");
        unsafe { std::env::remove_var("TEST_ECRSCAN_BOOL_BAD") };
        assert!(value);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = valid();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = EcrScanConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.storage.bucket_name, "scan-results");
        assert_eq!(parsed.findings.product_name, "ECR Scan");
    }
}
