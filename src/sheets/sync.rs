// src/sheets/sync.rs
use chrono::{DateTime, FixedOffset};

use crate::extractors::{ExtractedRecord, ResultClass, HEADER, TIMESTAMP_FORMAT};
use crate::sheets::RecordSink;
use crate::utils::error::SheetsError;

/// Rows shown back to the user after a round-trip probe.
const ROUND_TRIP_TAIL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub appended: usize,
    /// Row count after saving, header included.
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub total_rows: usize,
    pub last_rows: Vec<Vec<String>>,
}

fn header_row() -> Vec<String> {
    HEADER.iter().map(|h| h.to_string()).collect()
}

/// Makes sure row 1 holds exactly `HEADER`: writes it on an empty sheet and
/// replaces it when it differs.
pub async fn ensure_header<S: RecordSink>(sink: &S) -> Result<(), SheetsError> {
    let wanted = header_row();
    let current = sink.header_row().await?;

    if current.is_empty() {
        tracing::info!("Sheet is empty, writing header row");
        sink.append_row(&wanted).await?;
    } else if current != wanted {
        tracing::warn!("Replacing sheet header {:?} with {:?}", current, wanted);
        sink.replace_header(&wanted).await?;
    } else {
        tracing::debug!("Sheet header already matches");
    }
    Ok(())
}

/// Appends one row per record, in order, after ensuring the header.
pub async fn save_records<S: RecordSink>(
    sink: &S,
    records: &[ExtractedRecord],
) -> Result<SaveSummary, SheetsError> {
    ensure_header(sink).await?;

    let before = sink.row_count().await?;
    for record in records {
        sink.append_row(&record.to_row()).await?;
        tracing::debug!("Appended LN='{}' HN='{}'", record.specimen_number(), record.patient_number());
    }
    let after = sink.row_count().await?;

    let summary = SaveSummary {
        appended: after.saturating_sub(before),
        total_rows: after,
    };
    if summary.appended != records.len() {
        tracing::warn!(
            "Sent {} rows but the sheet grew by {}; someone else may be writing to it",
            records.len(),
            summary.appended
        );
    }
    tracing::info!("Saved {} rows. Now total rows (incl. header): {}", summary.appended, summary.total_rows);
    Ok(summary)
}

/// The fixed probe row written by `round_trip_test`.
pub fn probe_row(test_name: &str, now: DateTime<FixedOffset>) -> Vec<String> {
    vec![
        "TEST-LN".to_string(),
        "TEST-HN".to_string(),
        ResultClass::Detected.as_str().to_string(),
        test_name.to_string(),
        now.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

/// Writes a probe row and reads the sheet back, to check credentials and layout.
pub async fn round_trip_test<S: RecordSink>(
    sink: &S,
    test_name: &str,
    now: DateTime<FixedOffset>,
) -> Result<RoundTripReport, SheetsError> {
    ensure_header(sink).await?;
    sink.append_row(&probe_row(test_name, now)).await?;

    let rows = sink.all_rows().await?;
    let total_rows = rows.len();
    let last_rows = rows[total_rows.saturating_sub(ROUND_TRIP_TAIL)..].to_vec();

    tracing::info!("Rows in sheet (including header): {}", total_rows);
    Ok(RoundTripReport {
        total_rows,
        last_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{FieldExtractor, TimestampSource, DEFAULT_TEST_NAME};
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// In-memory stand-in for a worksheet.
    #[derive(Default)]
    struct MemorySheet {
        rows: Mutex<Vec<Vec<String>>>,
        header_replacements: Mutex<usize>,
    }

    impl MemorySheet {
        fn with_rows(rows: Vec<Vec<&str>>) -> Self {
            let rows = rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect();
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn rows(&self) -> Vec<Vec<String>> {
            self.rows.lock().unwrap().clone()
        }
    }

    impl RecordSink for MemorySheet {
        async fn header_row(&self) -> Result<Vec<String>, SheetsError> {
            Ok(self.rows.lock().unwrap().first().cloned().unwrap_or_default())
        }

        async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
            Ok(self.rows())
        }

        async fn append_row(&self, row: &[String]) -> Result<(), SheetsError> {
            self.rows.lock().unwrap().push(row.to_vec());
            Ok(())
        }

        async fn replace_header(&self, header_row: &[String]) -> Result<(), SheetsError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.is_empty() {
                rows.push(header_row.to_vec());
            } else {
                rows[0] = header_row.to_vec();
            }
            *self.header_replacements.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 16, 9, 26, 0)
            .unwrap()
    }

    fn record(text: &str) -> ExtractedRecord {
        FieldExtractor::new(DEFAULT_TEST_NAME, TimestampSource::Ingestion).extract(text, now())
    }

    #[test]
    fn test_header_written_on_empty_sheet() {
        let sheet = MemorySheet::default();
        tokio_test::block_on(ensure_header(&sheet)).unwrap();
        assert_eq!(sheet.rows(), vec![header_row()]);
        assert_eq!(*sheet.header_replacements.lock().unwrap(), 0);
    }

    #[test]
    fn test_mismatched_header_replaced() {
        let sheet = MemorySheet::with_rows(vec![
            vec!["LN", "HN", "RESULT", "TEST"],
            vec!["123456", "H0001", "Detected", "COVID-19 (RT-PCR)"],
        ]);
        tokio_test::block_on(ensure_header(&sheet)).unwrap();
        let rows = sheet.rows();
        assert_eq!(rows[0], header_row());
        assert_eq!(rows[1][0], "123456");
        assert_eq!(*sheet.header_replacements.lock().unwrap(), 1);
    }

    #[test]
    fn test_matching_header_untouched() {
        let sheet = MemorySheet::with_rows(vec![HEADER.to_vec()]);
        tokio_test::block_on(ensure_header(&sheet)).unwrap();
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(*sheet.header_replacements.lock().unwrap(), 0);
    }

    #[test]
    fn test_save_appends_rows_in_order() {
        let sheet = MemorySheet::default();
        let records = vec![
            record("LN: 20251015-001 HN H00001 Result: Positive"),
            record("LN: 20251015-002 HN H00002 Result: Negative"),
        ];

        let summary = tokio_test::block_on(save_records(&sheet, &records)).unwrap();
        assert_eq!(
            summary,
            SaveSummary {
                appended: 2,
                total_rows: 3
            }
        );

        let rows = sheet.rows();
        assert_eq!(rows[1], records[0].to_row());
        assert_eq!(
            rows[2],
            vec!["20251015-002", "H00002", "Not detected", DEFAULT_TEST_NAME, "16/10/2025 09:26"]
        );
    }

    #[test]
    fn test_save_nothing_still_writes_header() {
        let sheet = MemorySheet::default();
        let summary = tokio_test::block_on(save_records(&sheet, &[])).unwrap();
        assert_eq!(summary.appended, 0);
        assert_eq!(summary.total_rows, 1);
    }

    #[tokio::test]
    async fn test_round_trip_returns_last_five_rows() {
        let mut rows = vec![HEADER.to_vec()];
        let numbers: Vec<String> = (0..8).map(|i| format!("10000{}", i)).collect();
        for n in &numbers {
            rows.push(vec![n.as_str(), "H0001", "Detected", DEFAULT_TEST_NAME, ""]);
        }
        let sheet = MemorySheet::with_rows(rows);

        let report = round_trip_test(&sheet, DEFAULT_TEST_NAME, now()).await.unwrap();
        assert_eq!(report.total_rows, 10);
        assert_eq!(report.last_rows.len(), 5);
        assert_eq!(report.last_rows[4], probe_row(DEFAULT_TEST_NAME, now()));
        assert_eq!(report.last_rows[0][0], "100004");
    }

    #[tokio::test]
    async fn test_round_trip_on_empty_sheet() {
        let sheet = MemorySheet::default();
        let report = round_trip_test(&sheet, DEFAULT_TEST_NAME, now()).await.unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.last_rows[0], header_row());
        assert_eq!(report.last_rows[1][0], "TEST-LN");
        assert_eq!(report.last_rows[1][4], "16/10/2025 09:26");
    }
}
