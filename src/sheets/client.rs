// src/sheets/client.rs
use reqwest::{header, Response, StatusCode, Url};
use std::time::Duration;

use crate::config::SheetConfig;
use crate::sheets::models::{AppendResponse, ValueRange, ValueRangeBody};
use crate::sheets::RecordSink;
use crate::utils::error::SheetsError;

const SHEETS_USER_AGENT: &str = concat!("labsheet/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates a reqwest client configured for Sheets API interaction.
fn build_sheets_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(SHEETS_USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

/// Quotes a worksheet title for use in A1 notation (`'My Sheet'`).
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Human-facing link to the spreadsheet.
pub fn sheet_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", sheet_id)
}

/// Google Sheets v4 `values` client bound to one worksheet.
pub struct SheetsClient {
    http: reqwest::Client,
    config: SheetConfig,
}

impl SheetsClient {
    pub fn new(config: SheetConfig) -> Result<Self, SheetsError> {
        let http = build_sheets_client()?;
        Ok(Self { http, config })
    }

    /// Builds `{api_base}/v4/spreadsheets/{id}/values/{range}{suffix}` with each
    /// segment percent-encoded.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| SheetsError::Url(format!("{}: {}", self.config.api_base, e)))?;
        let last = format!("{}{}", range, suffix);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Url(format!("{} cannot be a base URL", self.config.api_base)))?;
            segments.pop_if_empty().extend([
                "v4",
                "spreadsheets",
                self.config.sheet_id.as_str(),
                "values",
                last.as_str(),
            ]);
        }
        Ok(url)
    }

    fn whole_sheet_range(&self) -> String {
        quote_sheet_title(&self.config.worksheet)
    }

    fn header_range(&self) -> String {
        format!("{}!1:1", quote_sheet_title(&self.config.worksheet))
    }

    async fn get_rows(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "")?;
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response, range)?;

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::Parse(e.to_string()))?;
        Ok(body.into_rows())
    }
}

/// Maps non-2xx responses onto `SheetsError` variants.
fn check_status(response: Response, range: &str) -> Result<Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::error!("HTTP error status: {} for range: {}", status, range);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            tracing::warn!("Received {} - check the access token and that the sheet is shared with its account.", status);
            Err(SheetsError::Unauthorized(status))
        }
        StatusCode::NOT_FOUND => Err(SheetsError::NotFound(range.to_string())),
        _ => Err(SheetsError::Http(status)),
    }
}

impl RecordSink for SheetsClient {
    async fn header_row(&self) -> Result<Vec<String>, SheetsError> {
        let rows = self.get_rows(&self.header_range()).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        self.get_rows(&self.whole_sheet_range()).await
    }

    async fn append_row(&self, row: &[String]) -> Result<(), SheetsError> {
        let range = self.whole_sheet_range();
        let mut url = self.values_url(&range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&ValueRangeBody::single_row(row))
            .send()
            .await?;
        let response = check_status(response, &range)?;

        let body: AppendResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Parse(e.to_string()))?;
        if let Some(updates) = body.updates {
            tracing::debug!(
                "Appended {} row(s) at {}",
                updates.updated_rows,
                updates.updated_range.unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn replace_header(&self, header_row: &[String]) -> Result<(), SheetsError> {
        let range = self.header_range();

        // Clear first so a wider old header leaves no stray cells behind.
        let clear_url = self.values_url(&range, ":clear")?;
        tracing::debug!("POST {}", clear_url);
        let response = self
            .http
            .post(clear_url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response, &range)?;

        let mut update_url = self.values_url(&range, "")?;
        update_url
            .query_pairs_mut()
            .append_pair("valueInputOption", "RAW");
        tracing::debug!("PUT {}", update_url);
        let response = self
            .http
            .put(update_url)
            .bearer_auth(&self.config.access_token)
            .json(&ValueRangeBody::single_row(header_row))
            .send()
            .await?;
        check_status(response, &range)?;

        Ok(())
    }
}
