//! Sheets client configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Configuration shared by the authorizer and the Sheets client.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/spreadsheets"]`.
    pub scopes: Vec<String>,

    /// Path to the client descriptor JSON.
    ///
    /// Defaults to `~/.config/sheetctl/credentials.json`.
    pub credentials_path: PathBuf,

    /// Path to the token file.
    ///
    /// Defaults to `~/.local/share/sheetctl/token.json`.
    pub token_path: PathBuf,

    /// Base URL of the Sheets API, without a trailing slash.
    pub api_base: String,

    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            credentials_path: Self::default_credentials_path(),
            token_path: Self::default_token_path(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout: None,
            user_agent: format!("sheetctl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SheetsConfig {
    /// Read/write access to spreadsheets.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/spreadsheets";

    pub const DEFAULT_API_BASE: &'static str = "https://sheets.googleapis.com/v4";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_credentials_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetctl")
            .join("credentials.json")
    }

    pub fn default_token_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetctl")
            .join("token.json")
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the API base URL. A trailing slash is dropped.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        let url = Url::parse(&self.api_base)
            .map_err(|e| format!("invalid api_base {:?}: {}", self.api_base, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("api_base must be http(s), got {}", url.scheme()));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err("timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}
