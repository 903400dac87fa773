//! Error types for credential, authorization and Sheets API operations.

use std::fmt;
use thiserror::Error;

/// The category of a [`SheetsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetsErrorCode {
    /// Client descriptor or token file is missing, unreadable or malformed.
    Configuration,
    /// Persisting a token failed.
    Io,
    /// The Sheets API rejected the request (non-2xx status).
    Api,
    /// Code exchange or token refresh failed, or no usable token was returned.
    Authentication,
    /// The request could not be sent or the response body could not be read.
    Network,
    /// A successful response whose body did not have the expected shape.
    InvalidResponse,
}

impl SheetsErrorCode {
    /// Returns true if the process should stop rather than carry on.
    ///
    /// Configuration and authentication problems will not fix themselves
    /// on the next command; API and transport failures might.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration | Self::Authentication)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::Io => "io_error",
            Self::Api => "api_error",
            Self::Authentication => "authentication_failed",
            Self::Network => "network_error",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for SheetsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from loading credentials, authorizing, or calling the Sheets API.
#[derive(Debug, Error)]
pub struct SheetsError {
    code: SheetsErrorCode,
    message: String,
    /// HTTP status returned by the vendor, for `Api` and `Authentication` errors.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SheetsError {
    pub fn new(code: SheetsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Configuration, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Io, message)
    }

    /// Creates an API error carrying the vendor's HTTP status.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Api, message).with_status(status)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Authentication, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Network, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::InvalidResponse, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> SheetsErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.code, status, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// A specialized Result type for this crate.
pub type SheetsResult<T> = Result<T, SheetsError>;
