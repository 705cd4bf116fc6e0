// src/sheets/mod.rs
pub mod client;
pub mod models;
pub mod sync;

use crate::utils::error::SheetsError;

#[allow(unused_imports)]
pub use client::{sheet_url, SheetsClient};
#[allow(unused_imports)]
pub use sync::{ensure_header, round_trip_test, save_records, RoundTripReport, SaveSummary};

/// A shared tabular store that accepts extracted rows.
///
/// Rows are plain strings in `extractors::HEADER` column order; the store owns its layout.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    /// First row of the sheet, empty when the sheet has no rows yet.
    async fn header_row(&self) -> Result<Vec<String>, SheetsError>;

    /// Every non-empty row, header included.
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError>;

    async fn append_row(&self, row: &[String]) -> Result<(), SheetsError>;

    /// Overwrites row 1 with `header_row`.
    async fn replace_header(&self, header_row: &[String]) -> Result<(), SheetsError>;

    async fn row_count(&self) -> Result<usize, SheetsError> {
        Ok(self.all_rows().await?.len())
    }
}
