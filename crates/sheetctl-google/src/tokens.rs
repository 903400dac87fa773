//! Token record persistence.
//!
//! The token file uses the same JSON shape Google's own client libraries
//! write, so a `token.json` produced by them can be reused as-is:
//!
//! ```json
//! {
//!   "access_token": "ya29...",
//!   "refresh_token": "1//0g...",
//!   "scope": "https://www.googleapis.com/auth/spreadsheets",
//!   "token_type": "Bearer",
//!   "expiry_date": 1700000000000
//! }
//! ```
//!
//! There is no locking: two processes writing the same token file race and
//! the last writer wins.

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{SheetsError, SheetsResult};

/// Margin subtracted from the server-reported lifetime so a token is
/// refreshed slightly before it actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Space-separated scopes that were granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiry, stored as milliseconds since the Unix epoch.
    #[serde(
        default,
        rename = "expiry_date",
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    /// Fields written by other clients (`id_token`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            scope: None,
            token_type: None,
            expires_at: None,
            extra: Map::new(),
        }
    }

    /// Builds a record from a token endpoint response.
    ///
    /// `expires_in_secs` is the lifetime reported by the server. The stored
    /// expiry is truncated to whole milliseconds so that a saved record
    /// reloads identical to the one in memory.
    pub fn from_grant(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        scope: Option<String>,
        token_type: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let expires_at = expires_in_secs.and_then(|secs| {
            let now = Utc::now();
            let at = TimeDelta::try_seconds(secs.saturating_sub(EXPIRY_MARGIN_SECS))
                .and_then(|lifetime| now.checked_add_signed(lifetime));
            match at {
                Some(at) => DateTime::from_timestamp_millis(at.timestamp_millis()),
                // Out of range: a non-positive lifetime is already expired,
                // an absurdly long one never expires.
                None if secs <= 0 => Some(now),
                None => {
                    warn!("ignoring out-of-range token lifetime of {} seconds", secs);
                    None
                }
            }
        });

        Self {
            access_token: access_token.into(),
            refresh_token,
            scope,
            token_type,
            expires_at,
            extra: Map::new(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the access token is past its expiry.
    ///
    /// A record without an expiry is never considered expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Returns true if the granted scopes include every one of `required`.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        let granted: Vec<&str> = self
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default();
        required.iter().all(|scope| granted.contains(&scope.as_str()))
    }
}

/// Loads a token record, returning `Ok(None)` when the file does not exist.
///
/// A file that exists but cannot be read or parsed is a configuration error:
/// the caller must not continue with a half-authorized handle.
pub fn load_token_record(path: impl AsRef<Path>) -> SheetsResult<Option<TokenRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("no token file at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SheetsError::configuration(format!("failed to read token file: {}", e)).with_source(e)
    })?;

    let record: TokenRecord = serde_json::from_str(&content).map_err(|e| {
        SheetsError::configuration(format!(
            "failed to parse token file {}: {}",
            path.display(),
            e
        ))
        .with_source(e)
    })?;

    debug!("loaded token from {}", path.display());
    Ok(Some(record))
}

/// Overwrites the token file with `record`.
///
/// Writes to a temporary sibling first and renames it into place. On Unix
/// the file is made readable by the owner only.
pub fn save_token_record(path: impl AsRef<Path>, record: &TokenRecord) -> SheetsResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SheetsError::io(format!("failed to create token directory: {}", e)).with_source(e)
        })?;
    }

    let content = serde_json::to_string_pretty(record).map_err(|e| {
        SheetsError::io(format!("failed to serialize token: {}", e)).with_source(e)
    })?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(|e| {
        SheetsError::io(format!("failed to write token file: {}", e)).with_source(e)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        SheetsError::io(format!("failed to rename token file: {}", e)).with_source(e)
    })?;

    info!("token stored to {}", path.display());
    Ok(())
}

/// Removes the token file. Returns false if there was nothing to remove.
pub fn clear_token_record(path: impl AsRef<Path>) -> SheetsResult<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| {
        SheetsError::io(format!("failed to remove token file: {}", e)).with_source(e)
    })?;
    info!("removed token file {}", path.display());
    Ok(true)
}
