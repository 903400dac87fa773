//! Authorization commands and the console side of the OAuth flow.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use sheetctl_google::{
    AuthorizationRequest, AuthorizedHandle, Authorizer, SheetsConfig, SheetsError, TokenRecord,
    clear_token_record, load_client_descriptor, load_token_record, save_token_record,
};

use crate::error::ClientResult;

/// Progress of the console authorization flow.
enum AcquireState {
    /// URL printed, waiting for the operator to paste a code.
    AwaitingCode(AuthorizationRequest),
    /// Code read, exchanging it at the token endpoint.
    Exchanging {
        request: AuthorizationRequest,
        code: String,
    },
    Done(TokenRecord),
}

/// Runs the console authorization flow and persists the resulting token.
///
/// Prints the consent URL to `output`, blocks on one line of `input`, and
/// exchanges it for a token. A failure to save the token is logged and the
/// token is still returned, so the current command can go ahead.
pub async fn interactive_acquire<R, W>(
    authorizer: &Authorizer,
    token_path: &Path,
    open_browser: bool,
    input: &mut R,
    output: &mut W,
) -> ClientResult<TokenRecord>
where
    R: BufRead,
    W: Write,
{
    let request = authorizer.auth_url();
    writeln!(output, "Authorize this app by visiting this url: {}", request.url)?;
    if open_browser && let Err(e) = open::that(&request.url) {
        warn!("failed to open browser: {}", e);
    }

    let mut state = AcquireState::AwaitingCode(request);
    loop {
        state = match state {
            AcquireState::AwaitingCode(request) => {
                write!(output, "Enter the code from that page here: ")?;
                output.flush()?;

                let mut line = String::new();
                input.read_line(&mut line)?;
                let code = line.trim();
                if code.is_empty() {
                    return Err(SheetsError::authentication("no authorization code entered").into());
                }
                AcquireState::Exchanging {
                    request,
                    code: code.to_string(),
                }
            }
            AcquireState::Exchanging { request, code } => {
                debug!("exchanging authorization code");
                AcquireState::Done(authorizer.exchange_code(&request, &code).await?)
            }
            AcquireState::Done(record) => {
                if let Err(e) = save_token_record(token_path, &record) {
                    warn!("could not store token: {}", e);
                } else {
                    writeln!(output, "Token stored to {}", token_path.display())?;
                }
                return Ok(record);
            }
        };
    }
}

/// Loads credentials and token and returns a handle ready to sign requests.
///
/// With no stored token, runs the console flow on `input`/`output` first. An
/// expired token with a refresh token is refreshed and stored again.
pub async fn authorized_handle<R, W>(
    config: &SheetsConfig,
    input: &mut R,
    output: &mut W,
) -> ClientResult<AuthorizedHandle>
where
    R: BufRead,
    W: Write,
{
    let descriptor = load_client_descriptor(&config.credentials_path)?;
    let authorizer = Authorizer::new(descriptor, config)?;

    let record = match load_token_record(&config.token_path)? {
        Some(record) if record.is_expired() && record.refresh_token.is_some() => {
            debug!("stored token expired, refreshing");
            let fresh = authorizer.refresh(&record).await?;
            if let Err(e) = save_token_record(&config.token_path, &fresh) {
                warn!("could not store refreshed token: {}", e);
            }
            fresh
        }
        Some(record) if record.is_expired() => {
            warn!("stored token expired and has no refresh token, re-authorizing");
            interactive_acquire(&authorizer, &config.token_path, false, input, output).await?
        }
        Some(record) => record,
        None => {
            info!("no stored token, starting authorization");
            interactive_acquire(&authorizer, &config.token_path, false, input, output).await?
        }
    };

    if record.scope.is_some() && !record.has_scopes(&config.scopes) {
        warn!("stored token lacks some configured scopes; run 'sheetctl auth --force'");
    }

    Ok(authorizer.with_stored_token(record)?)
}

/// `sheetctl auth`: authorize and store a token.
pub async fn login<R, W>(
    config: &SheetsConfig,
    force: bool,
    open_browser: bool,
    input: &mut R,
    output: &mut W,
) -> ClientResult<()>
where
    R: BufRead,
    W: Write,
{
    let descriptor = load_client_descriptor(&config.credentials_path)?;
    let authorizer = Authorizer::new(descriptor, config)?;

    if !force && load_token_record(&config.token_path)?.is_some() {
        writeln!(output, "Already authorized ({}).", config.token_path.display())?;
        writeln!(output, "Use --force to re-authorize.")?;
        return Ok(());
    }

    interactive_acquire(&authorizer, &config.token_path, open_browser, input, output).await?;
    writeln!(output, "Authorization successful.")?;
    Ok(())
}

/// `sheetctl logout`: delete the stored token.
pub fn logout<W: Write>(config: &SheetsConfig, output: &mut W) -> ClientResult<()> {
    if clear_token_record(&config.token_path)? {
        writeln!(output, "Removed {}", config.token_path.display())?;
    } else {
        writeln!(output, "No stored token.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use sheetctl_google::{ClientDescriptor, SheetsErrorCode};

    use crate::error::ClientError;

    fn write_descriptor(dir: &Path, token_uri: &str) -> std::path::PathBuf {
        let path = dir.join("credentials.json");
        let json = serde_json::json!({
            "installed": {
                "client_id": "A",
                "client_secret": "B",
                "redirect_uris": ["C"],
                "token_uri": token_uri,
            }
        });
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    fn config_in(dir: &Path, token_uri: &str) -> SheetsConfig {
        SheetsConfig::new()
            .with_credentials_path(write_descriptor(dir, token_uri))
            .with_token_path(dir.join("token.json"))
    }

    fn sheets_error(err: ClientError) -> SheetsError {
        match err {
            ClientError::Sheets(err) => err,
            other => panic!("expected a Sheets error, got {}", other),
        }
    }

    #[tokio::test]
    async fn absent_token_prints_url_then_waits_for_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:9/token");

        // EOF on input: the flow stops at the prompt without exchanging.
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let err = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap_err();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Authorize this app by visiting this url: "));
        assert!(printed.contains("client_id=A&"));
        assert!(printed.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fspreadsheets"));
        assert!(printed.ends_with("Enter the code from that page here: "));

        assert_eq!(sheets_error(err).code(), SheetsErrorCode::Authentication);
        assert!(!dir.path().join("token.json").exists());
    }

    #[tokio::test]
    async fn code_exchange_persists_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), "4/xyz".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.abc","refresh_token":"1//r","expires_in":3599}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &format!("{}/token", server.url()));

        let mut input = Cursor::new(b"4/xyz\n".to_vec());
        let mut output = Vec::new();
        let handle = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(handle.token().access_token, "ya29.abc");

        let stored = load_token_record(&config.token_path).unwrap().unwrap();
        assert_eq!(&stored, handle.token());
    }

    #[tokio::test]
    async fn stored_token_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:9/token");
        save_token_record(&config.token_path, &TokenRecord::new("ya29.stored")).unwrap();

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let handle = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap();

        assert_eq!(handle.token().access_token, "ya29.stored");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_stored() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.fresh","expires_in":3599}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &format!("{}/token", server.url()));
        let stale = TokenRecord::new("ya29.old")
            .with_refresh_token("1//r")
            .with_expiry(chrono_past());
        save_token_record(&config.token_path, &stale).unwrap();

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let handle = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap();

        assert_eq!(handle.token().access_token, "ya29.fresh");
        let stored = load_token_record(&config.token_path).unwrap().unwrap();
        assert_eq!(stored.access_token, "ya29.fresh");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//r"));
    }

    #[tokio::test]
    async fn rejected_refresh_is_fatal_and_keeps_stored_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &format!("{}/token", server.url()));
        let stale = TokenRecord::new("ya29.old")
            .with_refresh_token("1//revoked")
            .with_expiry(chrono_past());
        save_token_record(&config.token_path, &stale).unwrap();

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let err = sheets_error(
            authorized_handle(&config, &mut input, &mut output)
                .await
                .unwrap_err(),
        );

        mock.assert_async().await;
        assert_eq!(err.code(), SheetsErrorCode::Authentication);
        assert_eq!(err.status(), Some(400));
        assert!(err.is_fatal());
        assert_eq!(load_token_record(&config.token_path).unwrap(), Some(stale));
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_during_prompt_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:9/token");
        let descriptor = load_client_descriptor(&config.credentials_path).unwrap();
        let authorizer = Authorizer::new(descriptor, &config).unwrap();

        let mut input = Cursor::new(b"4/xyz\n".to_vec());
        let mut output = Vec::new();
        let err = sheets_error(
            interactive_acquire(&authorizer, &config.token_path, false, &mut input, &mut output)
                .await
                .unwrap_err(),
        );

        assert_eq!(err.code(), SheetsErrorCode::Authentication);
        assert!(err.is_fatal());
        assert!(!config.token_path.exists());
        assert!(!String::from_utf8(output).unwrap().contains("Token stored"));
    }

    fn chrono_past() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(1_600_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn malformed_token_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:9/token");
        std::fs::write(&config.token_path, "garbage").unwrap();

        let mut input = Cursor::new(b"code\n".to_vec());
        let mut output = Vec::new();
        let err = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap_err();
        assert_eq!(sheets_error(err).code(), SheetsErrorCode::Configuration);
    }

    #[tokio::test]
    async fn missing_descriptor_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = SheetsConfig::new()
            .with_credentials_path(dir.path().join("missing.json"))
            .with_token_path(dir.path().join("token.json"));

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let err = authorized_handle(&config, &mut input, &mut output)
            .await
            .unwrap_err();
        assert_eq!(sheets_error(err).code(), SheetsErrorCode::Configuration);
    }

    #[tokio::test]
    async fn login_without_force_keeps_existing_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:9/token");
        save_token_record(&config.token_path, &TokenRecord::new("ya29.kept")).unwrap();

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        login(&config, false, false, &mut input, &mut output)
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Already authorized"));
        let stored = load_token_record(&config.token_path).unwrap().unwrap();
        assert_eq!(stored.access_token, "ya29.kept");
    }

    #[test]
    fn logout_removes_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = SheetsConfig::new().with_token_path(dir.path().join("token.json"));
        save_token_record(&config.token_path, &TokenRecord::new("a")).unwrap();

        let mut output = Vec::new();
        logout(&config, &mut output).unwrap();
        assert!(!config.token_path.exists());

        let mut output = Vec::new();
        logout(&config, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No stored token.\n");
    }

    #[test]
    fn descriptor_helper_writes_installed_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path(), "http://t/token");
        let descriptor = load_client_descriptor(&path).unwrap();
        assert_eq!(
            descriptor,
            ClientDescriptor::new("A", "B", "C").with_token_uri("http://t/token")
        );
    }
}
