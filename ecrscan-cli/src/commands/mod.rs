//! Command handlers -- one module per subcommand

pub mod finding;
pub mod flatten;
pub mod process;

use std::path::Path;

use tracing::debug;

use ecrscan_core::config::EcrScanConfig;
use ecrscan_core::error::EcrScanError;
use ecrscan_core::event::ScanCompletionEvent;

use crate::error::CliError;

/// Read and validate a saved event file.
pub(crate) async fn load_event(path: &Path) -> Result<ScanCompletionEvent, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    let event = ScanCompletionEvent::from_json_str(&text).map_err(EcrScanError::from)?;
    debug!(path = %path.display(), event = %event, "event loaded");
    Ok(event)
}

/// Log level when no configuration file is given.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "warn";

/// Load configuration from an optional file plus environment overrides.
///
/// Without a file the log level drops to [`DEFAULT_LOG_LEVEL`].
/// Validation is left to the caller so command-line overrides can apply first.
pub(crate) async fn load_config(path: Option<&Path>) -> Result<EcrScanConfig, CliError> {
    let mut config = match path {
        Some(path) => EcrScanConfig::from_file(path).await?,
        None => {
            let mut config = EcrScanConfig::default();
            config.general.log_level = DEFAULT_LOG_LEVEL.to_owned();
            config
        }
    };
    config.apply_env_overrides();
    Ok(config)
}
