//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/sheetctl/config.toml` by default. Every key is optional:
//!
//! ```toml
//! credentials_path = "~/.config/sheetctl/credentials.json"
//! token_path = "~/.local/share/sheetctl/token.json"
//! scopes = ["https://www.googleapis.com/auth/spreadsheets"]
//! timeout_secs = 30
//! api_base = "https://sheets.googleapis.com/v4"
//! on_api_error = "warn"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sheetctl_google::{SheetsConfig, SheetsError};

/// What the binary does when a create/write/read call fails at the API or
/// transport level.
///
/// Configuration and authentication failures are always fatal regardless
/// of this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the failure and exit successfully.
    #[default]
    Warn,
    /// Report the failure and exit with a non-zero status.
    Fail,
}

impl ErrorPolicy {
    /// Returns true if `err` should be logged and swallowed.
    pub fn tolerates(&self, err: &SheetsError) -> bool {
        *self == Self::Warn && !err.is_fatal()
    }
}

/// Configuration for the sheetctl client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// OAuth client descriptor JSON downloaded from the Cloud Console.
    pub credentials_path: Option<PathBuf>,

    /// Where the token record is stored.
    pub token_path: Option<PathBuf>,

    /// OAuth scopes to request.
    pub scopes: Option<Vec<String>>,

    /// Request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,

    /// Sheets API base URL.
    pub api_base: Option<String>,

    pub on_api_error: ErrorPolicy,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetctl")
            .join("config.toml")
    }

    /// Builds the validated Sheets configuration from these settings.
    pub fn to_sheets_config(&self) -> Result<SheetsConfig, String> {
        let mut config = SheetsConfig::new()
            .with_timeout(self.timeout_secs.map(Duration::from_secs));

        if let Some(ref path) = self.credentials_path {
            config = config.with_credentials_path(expand_home(path));
        }
        if let Some(ref path) = self.token_path {
            config = config.with_token_path(expand_home(path));
        }
        if let Some(ref scopes) = self.scopes {
            config = config.with_scopes(scopes.clone());
        }
        if let Some(ref base) = self.api_base {
            config = config.with_api_base(base.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.on_api_error, ErrorPolicy::Warn);

        let sheets = config.to_sheets_config().unwrap();
        assert!(sheets.timeout.is_none());
        assert_eq!(sheets.scopes, vec![SheetsConfig::DEFAULT_SCOPE.to_string()]);
    }

    #[test]
    fn full_file() {
        let config = ClientConfig::from_toml(
            r#"
            credentials_path = "/etc/sheetctl/credentials.json"
            token_path = "/var/lib/sheetctl/token.json"
            scopes = ["https://www.googleapis.com/auth/spreadsheets.readonly"]
            timeout_secs = 30
            api_base = "http://127.0.0.1:8080/v4"
            on_api_error = "fail"
            "#,
        )
        .unwrap();

        assert_eq!(config.on_api_error, ErrorPolicy::Fail);

        let sheets = config.to_sheets_config().unwrap();
        assert_eq!(sheets.credentials_path, PathBuf::from("/etc/sheetctl/credentials.json"));
        assert_eq!(sheets.token_path, PathBuf::from("/var/lib/sheetctl/token.json"));
        assert_eq!(sheets.timeout, Some(Duration::from_secs(30)));
        assert_eq!(sheets.api_base, "http://127.0.0.1:8080/v4");
        assert_eq!(
            sheets.scopes,
            vec!["https://www.googleapis.com/auth/spreadsheets.readonly".to_string()]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ClientConfig::from_toml("on_api_error = \"explode\"").is_err());
        assert!(ClientConfig::from_toml("timeout_secs = \"soon\"").is_err());

        let config = ClientConfig::from_toml("scopes = []").unwrap();
        assert!(config.to_sheets_config().is_err());

        let config = ClientConfig::from_toml("timeout_secs = 0").unwrap();
        assert!(config.to_sheets_config().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 7\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.timeout_secs, Some(7));
        assert!(ClientConfig::load_from(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn home_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/sheets/token.json")),
                home.join("sheets/token.json")
            );
        }
        assert_eq!(
            expand_home(Path::new("/abs/token.json")),
            PathBuf::from("/abs/token.json")
        );
    }

    #[test]
    fn policy_tolerates_only_transient_errors() {
        let api = SheetsError::api(500, "backend error");
        let auth = SheetsError::authentication("invalid_grant");
        let config = SheetsError::configuration("bad token file");

        assert!(ErrorPolicy::Warn.tolerates(&api));
        assert!(!ErrorPolicy::Warn.tolerates(&auth));
        assert!(!ErrorPolicy::Warn.tolerates(&config));
        assert!(!ErrorPolicy::Fail.tolerates(&api));
    }

    #[test]
    fn config_serializes_back() {
        let config = ClientConfig {
            timeout_secs: Some(5),
            on_api_error: ErrorPolicy::Fail,
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("on_api_error = \"fail\""));
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }
}
