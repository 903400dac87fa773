//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod sheet;

use std::io::{BufRead, Write};

use tracing::warn;

use sheetctl_google::{SheetsClient, SheetsConfig};

use crate::cli::{Command, ConfigAction};
use crate::config::{ClientConfig, ErrorPolicy};
use crate::error::{ClientError, ClientResult};

/// Runs one command against the effective configuration.
///
/// `on_api_error` only applies to the API call made by `create`, `write` and
/// `read`. Loading credentials, authorizing, `auth` and `logout` always
/// report their failures.
pub async fn dispatch<R, W>(
    command: Command,
    config: &ClientConfig,
    input: &mut R,
    output: &mut W,
) -> ClientResult<()>
where
    R: BufRead,
    W: Write,
{
    let policy = config.on_api_error;

    match command {
        Command::Config { action } => match action {
            ConfigAction::Dump => config::dump(config, output),
            ConfigAction::Path => config::path(output),
        },
        Command::Auth { force, open } => {
            let sheets = sheets_config(config)?;
            auth::login(&sheets, force, open, input, output).await
        }
        Command::Logout => auth::logout(&sheets_config(config)?, output),
        Command::Create { title } => {
            let client = connect(config, input, output).await?;
            apply_policy(policy, sheet::create(&client, &title, output).await)
        }
        Command::Write {
            spreadsheet_id,
            range,
            values,
            input_option,
        } => {
            let client = connect(config, input, output).await?;
            let result = sheet::write(
                &client,
                &spreadsheet_id,
                &range,
                &values,
                input_option.into(),
                output,
            )
            .await;
            apply_policy(policy, result)
        }
        Command::Read {
            spreadsheet_id,
            range,
            json,
        } => {
            let client = connect(config, input, output).await?;
            apply_policy(
                policy,
                sheet::read(&client, &spreadsheet_id, &range, json, output).await,
            )
        }
    }
}

fn apply_policy(policy: ErrorPolicy, result: ClientResult<()>) -> ClientResult<()> {
    match result {
        Err(ClientError::Sheets(ref e)) if policy.tolerates(e) => {
            warn!("{}", e);
            Ok(())
        }
        other => other,
    }
}

fn sheets_config(config: &ClientConfig) -> ClientResult<SheetsConfig> {
    config.to_sheets_config().map_err(ClientError::Config)
}

/// Builds an authorized Sheets client, running the console flow if needed.
async fn connect<R, W>(config: &ClientConfig, input: &mut R, output: &mut W) -> ClientResult<SheetsClient>
where
    R: BufRead,
    W: Write,
{
    let sheets = sheets_config(config)?;
    let handle = auth::authorized_handle(&sheets, input, output).await?;
    Ok(SheetsClient::new(handle, &sheets))
}
