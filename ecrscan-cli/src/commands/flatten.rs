//! `ecrscan flatten` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use ecrscan_core::row::FlatRow;
use ecrscan_processor::encode::encode_csv;
use ecrscan_processor::flatten;

use crate::cli::EventArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `flatten` command.
pub async fn execute(args: EventArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = build_report(&args.event).await?;
    writer.render(&report)
}

async fn build_report(path: &Path) -> Result<FlattenReport, CliError> {
    let event = super::load_event(path).await?;
    let row = flatten(&event);
    let csv = encode_csv(&row).map_err(ecrscan_core::error::EcrScanError::from)?;
    Ok(FlattenReport { row, csv })
}

/// The flattened row; JSON output is the column/value object.
#[derive(Serialize)]
#[serde(transparent)]
pub struct FlattenReport {
    row: FlatRow,
    #[serde(skip)]
    csv: Vec<u8>,
}

impl Render for FlattenReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        w.write_all(&self.csv)
    }
}
