//! ecrscan.toml 통합 설정 테스트
//!
//! - ecrscan.toml.example 파싱 테스트
//! - 환경변수 우선순위 테스트 (BUCKET_NAME 포함)
//! - 파일 로딩 에러 테스트

use ecrscan_core::config::EcrScanConfig;
use ecrscan_core::error::{ConfigError, EcrScanError};

fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let originals: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| ((*k).to_owned(), std::env::var(k).ok()))
        .collect();
    // SAFETY: 호출하는 테스트는 serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        for (k, v) in vars {
            std::env::set_var(k, v);
        }
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        for (k, original) in originals {
            match original {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
    result
}

// =============================================================================
// ecrscan.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let content = include_str!("../../../ecrscan.toml.example");
    let config = EcrScanConfig::parse(content).expect("example config should parse");
    config.validate().expect("example config should validate");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(
        config.storage.bucket_name,
        "ecrscanlambdastack-ecr-scan-results"
    );
    assert_eq!(config.storage.key_prefix, "ecr-scan");
    assert!(!config.storage.unique_suffix);
    assert!(config.findings.enabled);
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../ecrscan.toml.example");
    let example = EcrScanConfig::parse(content).expect("should parse");
    let defaults = EcrScanConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.storage.key_prefix, defaults.storage.key_prefix);
    assert_eq!(example.storage.unique_suffix, defaults.storage.unique_suffix);
    assert_eq!(example.findings.generator_id, defaults.findings.generator_id);
    assert_eq!(example.findings.product_name, defaults.findings.product_name);
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[storage]
bucket_name = "b"

[glue]
database = "ecr_scan_db"
"#;
    let config = EcrScanConfig::parse(toml).expect("unknown sections should be ignored");
    assert_eq!(config.storage.bucket_name, "b");
}

#[test]
fn wrong_type_returns_parse_error() {
    let toml = r#"
[storage]
unique_suffix = "yes please"
"#;
    let err = EcrScanConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        EcrScanError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn bucket_name_env_sets_bucket() {
    let config = with_env(&[("BUCKET_NAME", "from-stack")], || {
        EcrScanConfig::from_env().expect("BUCKET_NAME alone should be enough")
    });
    assert_eq!(config.storage.bucket_name, "from-stack");
}

#[test]
#[serial_test::serial]
fn prefixed_bucket_env_wins_over_bucket_name() {
    let config = with_env(
        &[
            ("BUCKET_NAME", "from-stack"),
            ("ECRSCAN_STORAGE_BUCKET_NAME", "explicit"),
        ],
        || EcrScanConfig::from_env().expect("should load"),
    );
    assert_eq!(config.storage.bucket_name, "explicit");
}

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"

[storage]
bucket_name = "from-file"
"#;
    let config = with_env(
        &[
            ("ECRSCAN_GENERAL_LOG_LEVEL", "debug"),
            ("ECRSCAN_STORAGE_UNIQUE_SUFFIX", "true"),
        ],
        || {
            let mut config = EcrScanConfig::parse(toml).expect("should parse");
            config.apply_env_overrides();
            config
        },
    );
    assert_eq!(config.general.log_level, "debug");
    assert!(config.storage.unique_suffix);
    assert_eq!(config.storage.bucket_name, "from-file");
}

#[test]
#[serial_test::serial]
fn from_env_without_bucket_fails_validation() {
    let original = std::env::var("BUCKET_NAME").ok();
    let original_prefixed = std::env::var("ECRSCAN_STORAGE_BUCKET_NAME").ok();
    // SAFETY: serial_test로 직렬화됨
    unsafe {
        std::env::remove_var("BUCKET_NAME");
        std::env::remove_var("ECRSCAN_STORAGE_BUCKET_NAME");
    }

    let result = EcrScanConfig::from_env();

    // SAFETY: 테스트 정리
    unsafe {
        if let Some(val) = original {
            std::env::set_var("BUCKET_NAME", val);
        }
        if let Some(val) = original_prefixed {
            std::env::set_var("ECRSCAN_STORAGE_BUCKET_NAME", val);
        }
    }

    assert!(matches!(
        result,
        Err(EcrScanError::Config(ConfigError::InvalidValue { .. }))
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = EcrScanConfig::from_file("/tmp/ecrscan_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result,
        Err(EcrScanError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_from_disk_applies_env_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ecrscan.toml");
    tokio::fs::write(&path, "[storage]\nbucket_name = \"disk-bucket\"\n")
        .await
        .unwrap();

    let config = EcrScanConfig::load(&path).await.expect("should load");
    // 환경에 BUCKET_NAME이 있으면 그 값이 이긴다
    let expected = std::env::var("ECRSCAN_STORAGE_BUCKET_NAME")
        .or_else(|_| std::env::var("BUCKET_NAME"))
        .unwrap_or_else(|_| "disk-bucket".to_owned());
    assert_eq!(config.storage.bucket_name, expected);
}
