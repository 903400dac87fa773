//! OAuth 2.0 authorization for installed applications.
//!
//! The flow is split into two calls so any front end can drive it:
//!
//! 1. [`Authorizer::auth_url`] builds the consent URL (with a PKCE challenge
//!    and a random state) for the operator to open.
//! 2. [`Authorizer::exchange_code`] trades the code the operator pasted back
//!    for a [`TokenRecord`].
//!
//! [`Authorizer::with_stored_token`] turns an existing record into an
//! [`AuthorizedHandle`]; [`Authorizer::refresh`] renews an expired one.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::SheetsConfig;
use crate::credentials::ClientDescriptor;
use crate::error::{SheetsError, SheetsResult};
use crate::tokens::TokenRecord;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// Builds the HTTP client used for token and API requests.
pub(crate) fn http_client(config: &SheetsConfig) -> SheetsResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| {
        SheetsError::configuration(format!("failed to create HTTP client: {}", e)).with_source(e)
    })
}

/// Step one of the authorization flow: the URL to visit plus the secrets
/// needed to complete the exchange.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Consent page URL to show the operator.
    pub url: String,
    /// Random state echoed back by the consent page on loopback redirects.
    pub state: String,
    /// PKCE code verifier, sent with the code exchange.
    pub code_verifier: String,
}

impl AuthorizationRequest {
    fn new(descriptor: &ClientDescriptor, scopes: &[String]) -> Self {
        let code_verifier = random_urlsafe(CODE_VERIFIER_LENGTH);
        let challenge = compute_challenge(&code_verifier);
        let state = random_urlsafe(16);

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            descriptor.auth_uri,
            urlencoding::encode(&descriptor.client_id),
            urlencoding::encode(&descriptor.redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&challenge),
            urlencoding::encode(&state),
        );

        Self {
            url,
            state,
            code_verifier,
        }
    }
}

fn random_urlsafe(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// SHA-256 challenge for a code verifier (RFC 7636, S256).
fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// An unauthenticated signer bound to a client descriptor.
#[derive(Debug, Clone)]
pub struct Authorizer {
    descriptor: ClientDescriptor,
    scopes: Vec<String>,
    http_client: reqwest::Client,
}

impl Authorizer {
    pub fn new(descriptor: ClientDescriptor, config: &SheetsConfig) -> SheetsResult<Self> {
        Ok(Self {
            descriptor,
            scopes: config.scopes.clone(),
            http_client: http_client(config)?,
        })
    }

    /// Attaches a stored token, producing a handle that signs requests.
    pub fn with_stored_token(&self, record: TokenRecord) -> SheetsResult<AuthorizedHandle> {
        if record.access_token.trim().is_empty() {
            return Err(SheetsError::configuration(
                "stored token has an empty access_token",
            ));
        }
        Ok(AuthorizedHandle {
            descriptor: self.descriptor.clone(),
            token: record,
            http_client: self.http_client.clone(),
        })
    }

    /// Builds the consent URL for the operator to visit.
    pub fn auth_url(&self) -> AuthorizationRequest {
        let request = AuthorizationRequest::new(&self.descriptor, &self.scopes);
        debug!("authorization URL: {}", request.url);
        request
    }

    /// Exchanges an authorization code for a token record.
    pub async fn exchange_code(
        &self,
        request: &AuthorizationRequest,
        code: &str,
    ) -> SheetsResult<TokenRecord> {
        let code = code.trim();
        if code.is_empty() {
            return Err(SheetsError::authentication("authorization code is empty"));
        }

        let params = [
            ("client_id", self.descriptor.client_id.as_str()),
            ("client_secret", self.descriptor.client_secret.as_str()),
            ("code", code),
            ("code_verifier", request.code_verifier.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.descriptor.redirect_uri.as_str()),
        ];

        let response = self.token_request(&params, "token exchange").await?;
        let scope = response.scope.or_else(|| Some(self.scopes.join(" ")));

        info!("successfully obtained tokens");
        Ok(TokenRecord::from_grant(
            response.access_token,
            response.refresh_token,
            scope,
            response.token_type,
            response.expires_in,
        ))
    }

    /// Uses the refresh token in `record` to obtain a new access token.
    ///
    /// Returns a new record; the refresh token is carried over unless the
    /// server issued a new one.
    pub async fn refresh(&self, record: &TokenRecord) -> SheetsResult<TokenRecord> {
        let refresh_token = record.refresh_token.as_deref().ok_or_else(|| {
            SheetsError::authentication("no refresh token - re-authentication required")
        })?;

        let params = [
            ("client_id", self.descriptor.client_id.as_str()),
            ("client_secret", self.descriptor.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.token_request(&params, "token refresh").await?;

        info!("successfully refreshed access token");
        let mut fresh = TokenRecord::from_grant(
            response.access_token,
            response
                .refresh_token
                .or_else(|| record.refresh_token.clone()),
            response.scope.or_else(|| record.scope.clone()),
            response.token_type.or_else(|| record.token_type.clone()),
            response.expires_in,
        );
        fresh.extra = record.extra.clone();
        Ok(fresh)
    }

    /// Posts a form to the token endpoint and parses the grant.
    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> SheetsResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.descriptor.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                SheetsError::authentication(format!("{} request failed: {}", what, e))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SheetsError::authentication(format!("failed to read {} response: {}", what, e))
                .with_source(e)
        })?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(SheetsError::authentication(format!("{} failed: {}", what, reason))
                .with_status(status.as_u16()));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            SheetsError::authentication(format!("invalid {} response: {}", what, e))
        })?;

        if token.access_token.is_empty() {
            return Err(SheetsError::authentication(format!(
                "{} returned no access token",
                what
            )));
        }

        Ok(token)
    }
}

/// A capability that signs outgoing API requests.
#[derive(Clone)]
pub struct AuthorizedHandle {
    descriptor: ClientDescriptor,
    token: TokenRecord,
    http_client: reqwest::Client,
}

impl AuthorizedHandle {
    pub fn token(&self) -> &TokenRecord {
        &self.token
    }

    pub fn client_id(&self) -> &str {
        &self.descriptor.client_id
    }

    /// Returns a request builder with the bearer token attached.
    pub(crate) fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .bearer_auth(&self.token.access_token)
    }
}

impl fmt::Debug for AuthorizedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedHandle")
            .field("client_id", &self.descriptor.client_id)
            .field("expires_at", &self.token.expires_at)
            .finish_non_exhaustive()
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Error body from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}
