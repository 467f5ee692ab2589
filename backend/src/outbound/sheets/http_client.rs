//! Reqwest-backed Google Sheets v4 adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authentication, status mapping, and JSON decoding. Row semantics live in
//! the mirror service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{BatchUpdateDto, SpreadsheetDto, ValueRangeDto};
use super::errors::{map_status_error, map_transport_error};
use super::token::TokenSource;
use crate::domain::mirror::row::{LAST_COLUMN, id_column_range, quote_sheet_name};
use crate::domain::ports::{SheetLocator, SheetTarget, SpreadsheetClient, SpreadsheetError};

const METADATA_FIELDS: &str = "properties.title,sheets.properties(sheetId,title)";

/// Connection settings for [`GoogleSheetsClient`].
#[derive(Debug, Clone)]
pub struct SheetsClientConfig {
    /// Service-account JSON key location.
    pub credentials_path: PathBuf,
    /// Sheets REST base, normally `https://sheets.googleapis.com`.
    pub api_base: Url,
    /// Token endpoint used instead of the one in the key file.
    pub token_uri: Option<String>,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

/// Spreadsheet adapter speaking the Sheets v4 REST API.
pub struct GoogleSheetsClient {
    client: Client,
    api_base: Url,
    tokens: TokenSource,
}

impl GoogleSheetsClient {
    /// Build a client. Credentials are read lazily on the first `open`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: SheetsClientConfig, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let tokens = TokenSource::new(
            client.clone(),
            clock,
            config.credentials_path,
            config.token_uri,
        );
        Ok(Self {
            client,
            api_base: config.api_base,
            tokens,
        })
    }

    /// `{base}/v4/spreadsheets/` followed by `segments`.
    fn url(&self, segments: &[&str]) -> Result<Url, SpreadsheetError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SpreadsheetError::rejected(format!("{} cannot be a base URL", self.api_base))
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, SpreadsheetError> {
        let token = self.tokens.bearer().await?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SpreadsheetError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref())
            .map_err(|err| SpreadsheetError::decode(err.to_string()))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<(), SpreadsheetError> {
        let request = self.request(method, url).await?.json(body);
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }
}

/// Full-width A1 range for `rows` starting at one-based `first_row`.
fn block_range(sheet_name: &str, first_row: usize, rows: usize) -> String {
    let last_row = first_row + rows.saturating_sub(1);
    format!(
        "{}!A{first_row}:{LAST_COLUMN}{last_row}",
        quote_sheet_name(sheet_name)
    )
}

fn full_width_range(sheet_name: &str) -> String {
    format!("{}!A:{LAST_COLUMN}", quote_sheet_name(sheet_name))
}

fn resolve_target(
    locator: &SheetLocator,
    metadata: SpreadsheetDto,
) -> Result<SheetTarget, SpreadsheetError> {
    let sheet_names: Vec<String> = metadata
        .sheets
        .iter()
        .map(|sheet| sheet.properties.title.clone())
        .collect();
    let sheet_id = metadata
        .sheets
        .iter()
        .find(|sheet| sheet.properties.title == locator.sheet_name)
        .map(|sheet| sheet.properties.sheet_id)
        .ok_or_else(|| {
            SpreadsheetError::not_found(format!(
                "worksheet '{}' not found; available: {}",
                locator.sheet_name,
                sheet_names.join(", ")
            ))
        })?;
    Ok(SheetTarget {
        spreadsheet_id: locator.spreadsheet_id.clone(),
        sheet_name: locator.sheet_name.clone(),
        sheet_id,
        title: metadata.properties.title,
        sheet_names,
    })
}

#[async_trait]
impl SpreadsheetClient for GoogleSheetsClient {
    async fn open(&self, locator: &SheetLocator) -> Result<SheetTarget, SpreadsheetError> {
        self.tokens.reload().await?;
        let mut url = self.url(&[locator.spreadsheet_id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", METADATA_FIELDS);
        let request = self.request(Method::GET, url).await?;
        let metadata: SpreadsheetDto = self.send(request).await?;
        let target = resolve_target(locator, metadata)?;
        debug!(
            spreadsheet = %target.spreadsheet_id,
            sheet_id = target.sheet_id,
            "spreadsheet opened"
        );
        Ok(target)
    }

    async fn read_ids(&self, target: &SheetTarget) -> Result<Vec<String>, SpreadsheetError> {
        let range = id_column_range(&target.sheet_name);
        let mut url = self.url(&[target.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        let request = self.request(Method::GET, url).await?;
        let values: ValueRangeDto = self.send(request).await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    async fn clear(&self, target: &SheetTarget) -> Result<(), SpreadsheetError> {
        let range = format!("{}:clear", full_width_range(&target.sheet_name));
        let url = self.url(&[target.spreadsheet_id.as_str(), "values", range.as_str()])?;
        self.send_json(Method::POST, url, &serde_json::json!({})).await
    }

    async fn write_rows(
        &self,
        target: &SheetTarget,
        first_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SpreadsheetError> {
        if rows.is_empty() {
            return Ok(());
        }
        if first_row == 0 {
            return Err(SpreadsheetError::rejected("rows are numbered from 1"));
        }
        let range = block_range(&target.sheet_name, first_row, rows.len());
        let mut url = self.url(&[target.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRangeDto::rows(range, rows.to_vec());
        self.send_json(Method::PUT, url, &body).await
    }

    async fn append_row(
        &self,
        target: &SheetTarget,
        row: &[String],
    ) -> Result<(), SpreadsheetError> {
        let range = full_width_range(&target.sheet_name);
        let segment = format!("{range}:append");
        let mut url = self.url(&[target.spreadsheet_id.as_str(), "values", segment.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = ValueRangeDto::rows(range, vec![row.to_vec()]);
        self.send_json(Method::POST, url, &body).await
    }

    async fn delete_row(&self, target: &SheetTarget, row: usize) -> Result<(), SpreadsheetError> {
        let zero_based = row
            .checked_sub(1)
            .ok_or_else(|| SpreadsheetError::rejected("rows are numbered from 1"))?;
        let segment = format!("{}:batchUpdate", target.spreadsheet_id);
        let url = self.url(&[segment.as_str()])?;
        let body = BatchUpdateDto::delete_row(target.sheet_id, zero_based);
        self.send_json(Method::POST, url, &body).await
    }
}
