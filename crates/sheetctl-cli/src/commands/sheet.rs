//! Spreadsheet commands: create, write, read.

use std::io::Write;

use tracing::{debug, info};

use sheetctl_core::{column_count, parse_cells, render_json, render_tsv};
use sheetctl_google::{SheetsClient, ValueInputOption};

use crate::error::{ClientError, ClientResult};

/// `sheetctl create <title>`: prints the new spreadsheet's id.
pub async fn create<W: Write>(client: &SheetsClient, title: &str, output: &mut W) -> ClientResult<()> {
    let id = client.create_spreadsheet(title).await?;
    info!("created spreadsheet {:?}", title);
    writeln!(output, "{}", id)?;
    writeln!(output, "{}", SheetsClient::spreadsheet_url(&id))?;
    Ok(())
}

/// `sheetctl write <id> <range> <values>`
pub async fn write<W: Write>(
    client: &SheetsClient,
    spreadsheet_id: &str,
    range: &str,
    values: &str,
    input_option: ValueInputOption,
    output: &mut W,
) -> ClientResult<()> {
    let values = parse_cells(values)?;
    debug!(
        "writing {} rows x {} columns to {}",
        values.len(),
        column_count(&values),
        range
    );

    let summary = client
        .write_range(spreadsheet_id, range, &values, input_option)
        .await?;
    writeln!(
        output,
        "Updated {} cells in {}",
        summary.updated_cells,
        if summary.updated_range.is_empty() {
            range
        } else {
            summary.updated_range.as_str()
        }
    )?;
    Ok(())
}

/// `sheetctl read <id> <range>`
pub async fn read<W: Write>(
    client: &SheetsClient,
    spreadsheet_id: &str,
    range: &str,
    json: bool,
    output: &mut W,
) -> ClientResult<()> {
    let rows = client.read_range(spreadsheet_id, range).await?;

    if json {
        let rendered = render_json(&rows)
            .map_err(|e| ClientError::Input(format!("failed to render JSON: {}", e)))?;
        writeln!(output, "{}", rendered)?;
    } else if rows.is_empty() {
        writeln!(output, "No data found.")?;
    } else {
        writeln!(output, "{}", render_tsv(&rows))?;
    }
    Ok(())
}
