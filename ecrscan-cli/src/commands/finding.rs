//! `ecrscan finding` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use ecrscan_core::config::EcrScanConfig;
use ecrscan_core::finding::SecurityFinding;
use ecrscan_core::types::SeverityLabel;
use ecrscan_processor::FindingBuilder;

use crate::cli::EventArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `finding` command.
///
/// Only the `[general]` and `[findings]` sections are used and validated;
/// no bucket is needed.
pub async fn execute(
    args: EventArgs,
    config: EcrScanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    config.general.validate()?;
    config.findings.validate()?;
    let report = build_report(&args.event, &config).await?;
    writer.render(&report)
}

async fn build_report(path: &Path, config: &EcrScanConfig) -> Result<FindingReport, CliError> {
    let event = super::load_event(path).await?;
    let finding = FindingBuilder::new(&config.findings).build(&event);
    Ok(FindingReport { finding })
}

/// The derived finding; JSON output is the full ASFF document.
#[derive(Serialize)]
#[serde(transparent)]
pub struct FindingReport {
    finding: SecurityFinding,
}

impl Render for FindingReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let f = &self.finding;
        let label = f.label().as_str();
        let label_colored = match f.label() {
            SeverityLabel::Critical => label.red().bold(),
            SeverityLabel::High => label.red(),
            SeverityLabel::Medium => label.yellow(),
            SeverityLabel::Low => label.normal(),
            SeverityLabel::Informational => label.dimmed(),
        };

        writeln!(w, "Finding: {}", f.id.bold())?;
        writeln!(w, "Title: {}", f.title)?;
        writeln!(w, "Severity: {label_colored}")?;
        writeln!(
            w,
            "Severity counts: {}",
            f.finding_provider_fields.severity.original
        )?;
        writeln!(w)?;

        if f.vulnerabilities.is_empty() {
            writeln!(w, "{}", "No vulnerabilities listed.".green())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<20} {:<10} {:<25} Version",
            "Name", "Severity", "Package"
        )?;
        writeln!(w, "{}", "-".repeat(72))?;
        for v in &f.vulnerabilities {
            writeln!(
                w,
                "{:<20} {:<10} {:<25} {}",
                v.name, v.severity, v.package_name, v.package_version
            )?;
        }

        Ok(())
    }
}
