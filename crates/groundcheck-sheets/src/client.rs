//! HTTP client for the public `gviz` export of a Google Sheet.

use std::time::Duration;

use async_trait::async_trait;
use groundcheck_core::{AppConfig, Record, RecordSource, SheetRange, SourceRow};
use reqwest::{Client, Url};

use crate::error::SheetsError;
use crate::gviz;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Reads one spreadsheet. Use [`SheetsClient::with_base_url`] to point at a
/// mock server in tests.
pub struct SheetsClient {
    client: Client,
    sheet_id: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SheetsClient {
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(sheet_id: &str, timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_url(sheet_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the client cannot be constructed, or
    /// [`SheetsError::Malformed`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        sheet_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("groundcheck/0.1 (sheet-reader)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| SheetsError::Malformed(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            sheet_id: sheet_id.to_owned(),
            base_url,
            max_retries: 3,
            backoff_base_ms: 500,
        })
    }

    /// # Errors
    ///
    /// See [`SheetsClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SheetsError> {
        Ok(
            Self::with_base_url(&config.sheet_id, config.sheets_timeout_secs, &config.sheets_base_url)?
                .with_retry(config.sheets_max_retries, config.sheets_retry_backoff_ms),
        )
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Reads the rows of `range.sheet_name` selected by `range`.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Http`] on network failure or non-2xx status, after
    ///   retries.
    /// - [`SheetsError::Malformed`] / [`SheetsError::Deserialize`] if the
    ///   body is not a `gviz` table.
    pub async fn read_rows(&self, range: &SheetRange) -> Result<Vec<SourceRow>, SheetsError> {
        let url = self.build_url(&range.sheet_name)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_text(&url)
        })
        .await?;

        let rows = gviz::parse_rows(&body, &format!("sheet '{}'", range.sheet_name))?;
        tracing::info!(sheet = %range.sheet_name, total_rows = rows.len(), "sheet fetched");

        let selected = gviz::select_rows(rows, range);
        tracing::info!(
            sheet = %range.sheet_name,
            start_row = range.start_row,
            max_rows = range.max_rows,
            selected = selected.len(),
            "rows selected"
        );
        Ok(selected)
    }

    fn build_url(&self, sheet_name: &str) -> Result<Url, SheetsError> {
        let mut url = self
            .base_url
            .join(&format!("spreadsheets/d/{}/gviz/tq", self.sheet_id))
            .map_err(|e| SheetsError::Malformed(format!("invalid sheet id: {e}")))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("sheet", sheet_name);
        Ok(url)
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, SheetsError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RecordSource for SheetsClient {
    type Error = SheetsError;

    async fn read_records(&self, range: &SheetRange) -> Result<Vec<Record>, SheetsError> {
        let rows = self.read_rows(range).await?;
        Ok(rows.iter().map(Record::from_source_row).collect())
    }
}
