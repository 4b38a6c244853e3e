//! 로그 초기화
//!
//! `[general]` 설정의 `log_format`에 따라 subscriber 계층을 고릅니다.
//! CloudWatch가 줄마다 수신 시각을 붙이므로 JSON 출력에는 시각을 넣지 않습니다.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ecrscan_core::config::GeneralConfig;

/// 전역 tracing subscriber를 한 번 설치합니다.
///
/// 필터는 `RUST_LOG`가 있으면 그것을, 없으면 `log_level`을 씁니다.
/// `json`은 Lambda 기본값, `pretty`는 로컬 실행용입니다. 그 밖의 형식은 에러입니다.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .without_time()
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("json subscriber init failed: {e}")
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("pretty subscriber init failed: {e}")
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}
