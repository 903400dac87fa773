//! Google Sheets API v4 client.
//!
//! Each operation is a single request. Nothing is batched, paginated or
//! retried; a failure is returned to the caller as-is.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use sheetctl_core::ValueMatrix;

use crate::config::SheetsConfig;
use crate::error::{SheetsError, SheetsResult};
use crate::oauth::AuthorizedHandle;

/// How the API interprets written values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored exactly as given, always as text.
    #[default]
    Raw,
    /// Parsed as if typed into the UI: numbers, dates and formulas.
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

impl fmt::Display for ValueInputOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary returned by a values update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

/// Sheets API client bound to an authorized handle.
#[derive(Debug)]
pub struct SheetsClient {
    handle: AuthorizedHandle,
    api_base: String,
}

impl SheetsClient {
    pub fn new(handle: AuthorizedHandle, config: &SheetsConfig) -> Self {
        Self {
            handle,
            api_base: config.api_base.clone(),
        }
    }

    /// Browser URL of a spreadsheet.
    pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            urlencoding::encode(spreadsheet_id)
        )
    }

    /// Creates an empty spreadsheet and returns its id.
    pub async fn create_spreadsheet(&self, title: &str) -> SheetsResult<String> {
        let url = format!("{}/spreadsheets", self.api_base);
        let body = json!({ "properties": { "title": title } });

        let request = self
            .handle
            .request(Method::POST, &url)
            .query(&[("fields", "spreadsheetId")])
            .json(&body);
        let created: CreateResponse = send(request).await?;

        if created.spreadsheet_id.is_empty() {
            return Err(SheetsError::invalid_response(
                "create response has no spreadsheetId",
            ));
        }

        debug!("created spreadsheet {}", created.spreadsheet_id);
        Ok(created.spreadsheet_id)
    }

    /// Overwrites `range` with exactly `values`.
    pub async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueMatrix,
        input_option: ValueInputOption,
    ) -> SheetsResult<UpdateSummary> {
        let url = self.values_url(spreadsheet_id, range);
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: values.clone(),
        };

        let request = self
            .handle
            .request(Method::PUT, &url)
            .query(&[("valueInputOption", input_option.as_str())])
            .json(&body);
        let summary: UpdateSummary = send(request).await?;

        debug!(
            "updated {} cells in {}",
            summary.updated_cells, summary.updated_range
        );
        Ok(summary)
    }

    /// Reads `range`. An empty range yields an empty matrix.
    pub async fn read_range(&self, spreadsheet_id: &str, range: &str) -> SheetsResult<ValueMatrix> {
        let url = self.values_url(spreadsheet_id, range);
        let request = self.handle.request(Method::GET, &url);
        let value_range: ValueRange = send(request).await?;

        debug!("read {} rows from {}", value_range.values.len(), range);
        Ok(value_range.values)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

/// Sends a request and decodes a JSON success body.
async fn send<T>(request: reqwest::RequestBuilder) -> SheetsResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            SheetsError::network("request timeout").with_source(e)
        } else if e.is_connect() {
            SheetsError::network(format!("connection failed: {}", e)).with_source(e)
        } else {
            SheetsError::network(format!("request failed: {}", e)).with_source(e)
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        SheetsError::network(format!("failed to read response: {}", e)).with_source(e)
    })?;

    if !status.is_success() {
        return Err(SheetsError::api(status.as_u16(), api_error_message(&body)));
    }

    serde_json::from_str(&body).map_err(|e| {
        SheetsError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
    })
}

/// Extracts `error.message` from a Google error body, or falls back to the
/// raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    #[serde(default)]
    spreadsheet_id: String,
}

/// A value range as sent to and received from the API.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: ValueMatrix,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}
