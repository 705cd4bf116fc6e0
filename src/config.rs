// src/config.rs
use chrono::{DateTime, FixedOffset, Utc};

use crate::extractors::{FieldExtractor, TimestampSource};
use crate::utils::AppError;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// Clinic local time (+07:00).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Everything needed to reach one worksheet. Built at the CLI boundary and handed to
/// `SheetsClient::new`.
#[derive(Clone)]
pub struct SheetConfig {
    pub sheet_id: String,
    pub worksheet: String,
    pub access_token: String,
    pub api_base: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for SheetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetConfig")
            .field("sheet_id", &self.sheet_id)
            .field("worksheet", &self.worksheet)
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SheetConfig {
    /// Validates the raw CLI/env values. Both the sheet id and the token are required
    /// for any command that talks to the sheet.
    pub fn from_parts(
        sheet_id: Option<&str>,
        worksheet: &str,
        access_token: Option<&str>,
    ) -> Result<Self, AppError> {
        let sheet_id = sheet_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("SHEET_ID is not set (use --sheet-id or the SHEET_ID env var)".to_string()))?;
        let access_token = access_token
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "No Sheets access token (use --access-token or the SHEETS_ACCESS_TOKEN env var)".to_string(),
                )
            })?;
        let worksheet = worksheet.trim();
        if worksheet.is_empty() {
            return Err(AppError::Config("Worksheet name must not be empty".to_string()));
        }

        Ok(Self {
            sheet_id: sheet_id.to_string(),
            worksheet: worksheet.to_string(),
            access_token: access_token.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }
}

/// Settings for turning documents into records.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub test_name: String,
    pub timestamp_source: TimestampSource,
    pub utc_offset: FixedOffset,
}

impl ExtractorConfig {
    pub fn new(
        test_name: &str,
        timestamp_source: TimestampSource,
        utc_offset_hours: i32,
    ) -> Result<Self, AppError> {
        let test_name = test_name.trim();
        if test_name.is_empty() {
            return Err(AppError::Config("Test name must not be empty".to_string()));
        }
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| AppError::Config(format!("UTC offset out of range: {} hours", utc_offset_hours)))?;

        Ok(Self {
            test_name: test_name.to_string(),
            timestamp_source,
            utc_offset,
        })
    }

    pub fn extractor(&self) -> FieldExtractor {
        FieldExtractor::new(self.test_name.clone(), self.timestamp_source)
    }

    /// Current time in the configured offset, used for ingestion stamps and probe rows.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_config_requires_id_and_token() {
        let err = SheetConfig::from_parts(None, "Sheet1", Some("t")).unwrap_err();
        assert!(err.to_string().contains("SHEET_ID"));

        let err = SheetConfig::from_parts(Some("  "), "Sheet1", Some("t")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = SheetConfig::from_parts(Some("abc"), "Sheet1", None).unwrap_err();
        assert!(err.to_string().contains("access token"));

        let config = SheetConfig::from_parts(Some(" abc "), " Sheet1 ", Some("tok")).unwrap();
        assert_eq!(config.sheet_id, "abc");
        assert_eq!(config.worksheet, "Sheet1");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_sheet_config_debug_hides_token() {
        let config = SheetConfig::from_parts(Some("abc"), "Sheet1", Some("ya29.secret")).unwrap();
        let shown = format!("{:?}", config);
        assert!(!shown.contains("ya29.secret"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn test_extractor_config_offset() {
        let config = ExtractorConfig::new("COVID-19 (RT-PCR)", TimestampSource::Ingestion, 7).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), 7 * 3600);
        assert_eq!(config.now().offset().local_minus_utc(), 7 * 3600);

        assert!(ExtractorConfig::new("X", TimestampSource::Document, 30).is_err());
        assert!(ExtractorConfig::new("  ", TimestampSource::Document, 0).is_err());
    }
}
