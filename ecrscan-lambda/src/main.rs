//! ecrscan-lambda -- ECR 스캔 완료 이벤트 처리 Lambda
//!
//! 시작 시 설정, 로깅, AWS 클라이언트를 한 번 초기화하고 이후 모든 호출에서
//! 같은 파이프라인을 재사용합니다.

mod aws;
mod handler;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{run, service_fn};

use ecrscan_core::config::EcrScanConfig;
use ecrscan_processor::ScanPipelineBuilder;

use crate::aws::{S3ObjectStore, SecurityHubSink};

/// 설정 파일 경로를 지정하는 환경변수 (선택)
const ENV_CONFIG_PATH: &str = "ECRSCAN_CONFIG";

async fn load_config() -> Result<EcrScanConfig> {
    match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => EcrScanConfig::load(&path)
            .await
            .with_context(|| format!("failed to load config from {path}")),
        _ => EcrScanConfig::from_env().context("failed to load config from environment"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().await?;
    logging::init_tracing(&config.general)?;
    ecrscan_core::metrics::describe_metrics();

    tracing::info!(
        bucket = %config.storage.bucket_name,
        findings_enabled = config.findings.enabled,
        "ecrscan-lambda starting"
    );

    let sdk_config = aws_config::load_from_env().await;
    let store = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)));
    let sink = Arc::new(SecurityHubSink::new(aws_sdk_securityhub::Client::new(
        &sdk_config,
    )));

    let pipeline = ScanPipelineBuilder::new()
        .config(config)
        .object_store(store)
        .finding_sink(sink)
        .build()
        .context("failed to build scan pipeline")?;

    run(service_fn(|event| handler::function_handler(event, &pipeline)))
        .await
        .map_err(|e| anyhow::anyhow!("lambda runtime error: {}", e))
}
