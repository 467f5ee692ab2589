//! Port for the external spreadsheet the archive is mirrored into.
//!
//! Rows are addressed one-based, matching the spreadsheet's own numbering;
//! row 1 is the header.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by spreadsheet adapters.
    pub enum SpreadsheetError {
        /// Service account credentials are missing or malformed.
        Credentials { message: String } =>
            "spreadsheet credentials invalid: {message}",
        /// The private key could not sign a token request.
        Key { message: String } =>
            "spreadsheet signing key invalid: {message}",
        /// The token endpoint or API host could not be reached.
        Unreachable { message: String } =>
            "spreadsheet service unreachable: {message}",
        /// The service account lacks access.
        PermissionDenied { message: String } =>
            "spreadsheet permission denied: {message}",
        /// The spreadsheet or worksheet does not exist.
        NotFound { message: String } =>
            "spreadsheet not found: {message}",
        /// The request failed in transit.
        Transport { message: String } =>
            "spreadsheet transport failed: {message}",
        /// The request exceeded its timeout.
        Timeout { message: String } =>
            "spreadsheet request timed out: {message}",
        /// The API applied rate limiting.
        RateLimited { message: String } =>
            "spreadsheet rate limited: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "spreadsheet response decode failed: {message}",
        /// The API refused the request.
        Rejected { message: String } =>
            "spreadsheet request rejected: {message}",
    }
}

impl SpreadsheetError {
    /// Whether a later attempt may succeed without operator action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. }
                | Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
        )
    }
}

/// Spreadsheet and worksheet the mirror writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLocator {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Resolved worksheet, as confirmed by a metadata probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Numeric worksheet id needed for structural edits.
    pub sheet_id: i64,
    /// Spreadsheet title.
    pub title: String,
    /// Every worksheet name in the spreadsheet.
    pub sheet_names: Vec<String>,
}

/// Port for row-level spreadsheet access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpreadsheetClient: Send + Sync {
    /// Probe the spreadsheet and resolve the worksheet in `locator`.
    async fn open(&self, locator: &SheetLocator) -> Result<SheetTarget, SpreadsheetError>;

    /// Column A from row 1 down to the last non-empty cell; blank cells are
    /// empty strings.
    async fn read_ids(&self, target: &SheetTarget) -> Result<Vec<String>, SpreadsheetError>;

    /// Clear every value on the worksheet.
    async fn clear(&self, target: &SheetTarget) -> Result<(), SpreadsheetError>;

    /// Write `rows` starting at `first_row`.
    async fn write_rows(
        &self,
        target: &SheetTarget,
        first_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SpreadsheetError>;

    /// Append `row` after the last non-empty row.
    async fn append_row(&self, target: &SheetTarget, row: &[String])
    -> Result<(), SpreadsheetError>;

    /// Remove row `row`, shifting the rows below it up.
    async fn delete_row(&self, target: &SheetTarget, row: usize) -> Result<(), SpreadsheetError>;
}
