//! Client error types.

use std::fmt;

use sheetctl_google::SheetsError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Credential, authorization or Sheets API error.
    Sheets(SheetsError),
    /// Console IO error.
    Io(std::io::Error),
    /// Bad command-line input.
    Input(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Sheets(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sheets(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SheetsError> for ClientError {
    fn from(err: SheetsError) -> Self {
        Self::Sheets(err)
    }
}

impl From<sheetctl_core::ValuesError> for ClientError {
    fn from(err: sheetctl_core::ValuesError) -> Self {
        Self::Input(err.to_string())
    }
}
