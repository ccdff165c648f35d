//! Error types for the CLI

use classcharts_client::ClassChartsError;
use thiserror::Error;

/// Main CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login or request failed
    #[error("{0}")]
    Client(#[from] ClassChartsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
