//! `ecrscan process` command handler
//!
//! Runs the same pipeline as the Lambda, with a directory standing in for the
//! bucket and a JSON Lines file standing in for the findings service.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use ecrscan_core::config::EcrScanConfig;
use ecrscan_processor::{JsonLinesSink, LocalObjectStore, ScanPipelineBuilder};

use crate::cli::ProcessArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Bucket sub-directory used when neither flag, config nor environment name one.
pub const DEFAULT_LOCAL_BUCKET: &str = "ecr-scan-results";
/// Findings file name under the output directory.
pub const FINDINGS_FILE: &str = "findings.jsonl";

/// Execute the `process` command.
pub async fn execute(
    args: ProcessArgs,
    config: EcrScanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(&args, config).await?;
    writer.render(&report)
}

async fn run(args: &ProcessArgs, mut config: EcrScanConfig) -> Result<ProcessReport, CliError> {
    if let Some(bucket) = &args.bucket {
        config.storage.bucket_name = bucket.clone();
    } else if config.storage.bucket_name.trim().is_empty() {
        config.storage.bucket_name = DEFAULT_LOCAL_BUCKET.to_owned();
    }

    let event = super::load_event(&args.event).await?;

    let findings_path = args.out_dir.join(FINDINGS_FILE);
    let pipeline = ScanPipelineBuilder::new()
        .config(config)
        .object_store(Arc::new(LocalObjectStore::new(&args.out_dir)))
        .finding_sink(Arc::new(JsonLinesSink::new(&findings_path)))
        .build()?;

    let outcome = pipeline.process_event(&event).await?;
    info!(%outcome, "event processed locally");

    Ok(ProcessReport {
        event_id: outcome.event_id,
        row_path: args.out_dir.join(&outcome.row.bucket).join(&outcome.row.key),
        findings_path: outcome.finding_id.as_ref().map(|_| findings_path),
        finding_id: outcome.finding_id,
        severity: outcome.severity.to_string(),
    })
}

/// Where the row and finding were written.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub event_id: String,
    pub row_path: PathBuf,
    pub finding_id: Option<String>,
    pub findings_path: Option<PathBuf>,
    pub severity: String,
}

impl Render for ProcessReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Event: {}", self.event_id.bold())?;
        writeln!(w, "Row: {}", self.row_path.display())?;
        match (&self.finding_id, &self.findings_path) {
            (Some(id), Some(path)) => {
                writeln!(w, "Finding: {id}")?;
                writeln!(w, "Findings file: {}", path.display())?;
            }
            _ => writeln!(w, "Finding: {}", "disabled".dimmed())?,
        }
        writeln!(w, "Severity: {}", self.severity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::commands::fixtures::EVENT;

    fn args(dir: &Path, bucket: Option<&str>) -> ProcessArgs {
        let event = dir.join("event.json");
        std::fs::write(&event, EVENT).unwrap();
        ProcessArgs {
            event,
            out_dir: dir.join("out"),
            bucket: bucket.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn writes_row_and_finding_under_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), None);

        let report = run(&args, EcrScanConfig::default()).await.unwrap();

        assert!(report.row_path.starts_with(dir.path().join("out").join(DEFAULT_LOCAL_BUCKET)));
        let csv = std::fs::read_to_string(&report.row_path).unwrap();
        assert!(csv.contains(",0,5,0,2,0,v1|latest"));

        let findings = std::fs::read_to_string(report.findings_path.unwrap()).unwrap();
        assert_eq!(findings.lines().count(), 1);
        assert_eq!(report.severity, "HIGH");
    }

    #[tokio::test]
    async fn bucket_flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), Some("replay"));
        let mut config = EcrScanConfig::default();
        config.storage.bucket_name = "from-config".to_owned();

        let report = run(&args, config).await.unwrap();
        assert!(report.row_path.starts_with(dir.path().join("out").join("replay")));
    }

    #[tokio::test]
    async fn disabled_findings_write_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), None);
        let mut config = EcrScanConfig::default();
        config.findings.enabled = false;

        let report = run(&args, config).await.unwrap();
        assert!(report.finding_id.is_none());
        assert!(!dir.path().join("out").join(FINDINGS_FILE).exists());
    }
}
