//! OAuth client descriptor loading.
//!
//! The descriptor is the JSON file downloaded from the Google Cloud Console
//! for an OAuth client of type "Desktop app":
//!
//! ```json
//! {
//!   "installed": {
//!     "client_id": "...apps.googleusercontent.com",
//!     "client_secret": "...",
//!     "redirect_uris": ["http://localhost"],
//!     "auth_uri": "https://accounts.google.com/o/oauth2/auth",
//!     "token_uri": "https://oauth2.googleapis.com/token"
//!   }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{SheetsError, SheetsResult};

/// Google's OAuth authorization endpoint.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The OAuth client application's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    pub client_id: String,
    pub client_secret: String,
    /// First entry of `redirect_uris`.
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Top level of the credentials JSON file.
#[derive(Debug, Deserialize)]
struct DescriptorFile {
    installed: Option<InstalledSection>,
    web: Option<InstalledSection>,
}

#[derive(Debug, Deserialize)]
struct InstalledSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientDescriptor {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }

    /// Overrides the token endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Parses a descriptor from the credentials JSON.
    ///
    /// The `installed` section wins over `web` when both are present.
    pub fn from_json(json: &str) -> SheetsResult<Self> {
        let file: DescriptorFile = serde_json::from_str(json).map_err(|e| {
            SheetsError::configuration(format!("failed to parse credentials JSON: {}", e))
                .with_source(e)
        })?;

        let section = file.installed.or(file.web).ok_or_else(|| {
            SheetsError::configuration("credentials file must contain an 'installed' section")
        })?;

        if section.client_id.is_empty() {
            return Err(SheetsError::configuration("client_id is empty"));
        }

        let redirect_uri = section.redirect_uris.into_iter().next().ok_or_else(|| {
            SheetsError::configuration("credentials file has no redirect_uris")
        })?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            redirect_uri,
            auth_uri: section
                .auth_uri
                .unwrap_or_else(|| GOOGLE_AUTH_URI.to_string()),
            token_uri: section
                .token_uri
                .unwrap_or_else(|| GOOGLE_TOKEN_URI.to_string()),
        })
    }
}

/// Reads and parses the client descriptor file.
///
/// A missing file is a configuration error: the descriptor has to be
/// downloaded from the Google Cloud Console before anything else works.
pub fn load_client_descriptor(path: impl AsRef<Path>) -> SheetsResult<ClientDescriptor> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        SheetsError::configuration(format!(
            "failed to read credentials file {}: {} (download it from \
             https://console.cloud.google.com/apis/credentials)",
            path.display(),
            e
        ))
        .with_source(e)
    })?;

    let descriptor = ClientDescriptor::from_json(&content)?;
    debug!("loaded client descriptor from {}", path.display());
    Ok(descriptor)
}
