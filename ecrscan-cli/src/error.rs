//! CLI-specific error types and exit code mapping

use ecrscan_core::error::EcrScanError;

/// CLI-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (event file read, stdout write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped processing error.
    #[error("{0}")]
    Core(#[from] EcrScanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 1    | General error                   |
    /// | 2    | Configuration error             |
    /// | 3    | Invalid event                   |
    /// | 4    | Row write or finding submission |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(EcrScanError::Config(_)) => 2,
            Self::Core(EcrScanError::Event(_)) => 3,
            Self::Core(EcrScanError::Storage(_) | EcrScanError::Publish(_)) => 4,
            Self::Io(_) | Self::Core(EcrScanError::Io(_)) => 10,
            Self::JsonSerialize(_) => 1,
        }
    }
}
