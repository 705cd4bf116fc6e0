// src/main.rs
mod config;
mod extractors;
mod pdf;
mod sheets;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use config::{ExtractorConfig, SheetConfig, DEFAULT_UTC_OFFSET_HOURS, DEFAULT_WORKSHEET};
use extractors::{ExtractedRecord, TimestampSource, DEFAULT_TEST_NAME};
use sheets::SheetsClient;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the lab report to spreadsheet tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Where the "Approved Date Time" column comes from
    #[arg(long, value_enum, env = "LABSHEET_TIMESTAMP_SOURCE", default_value_t = TimestampSource::Ingestion, global = true)]
    timestamp_source: TimestampSource,

    /// UTC offset in hours for ingestion stamps (clinic local time)
    #[arg(long, env = "LABSHEET_UTC_OFFSET_HOURS", default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_negative_numbers = true, global = true)]
    utc_offset_hours: i32,

    /// Test name written to every row
    #[arg(long, env = "LABSHEET_TEST_NAME", default_value = DEFAULT_TEST_NAME, global = true)]
    test_name: String,

    /// Debug logging for this tool (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    sheet: SheetArgs,
}

#[derive(ClapArgs, Debug)]
struct SheetArgs {
    /// Spreadsheet id (the part after /d/ in the sheet URL)
    #[arg(long, env = "SHEET_ID", global = true)]
    sheet_id: Option<String>,

    /// Worksheet (tab) title
    #[arg(long, env = "SHEET_WORKSHEET", default_value = DEFAULT_WORKSHEET, global = true)]
    worksheet: String,

    /// OAuth access token with the spreadsheets scope
    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract fields from lab report PDFs and print them
    Extract {
        /// PDF files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format for the extracted rows
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also write the batch and its metadata as JSON into this directory
        #[arg(short, long)]
        export_dir: Option<PathBuf>,
    },
    /// Extract fields and append them to the spreadsheet
    Save {
        /// PDF files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also write the batch and its metadata as JSON into this directory
        #[arg(short, long)]
        export_dir: Option<PathBuf>,
    },
    /// Write a probe row to the spreadsheet and read the last rows back
    TestSheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Records extracted from one batch, with the files they came from.
struct Batch {
    records: Vec<ExtractedRecord>,
    source_files: Vec<String>,
}

/// Processes each file to completion before starting the next. A file that cannot be read
/// is logged and skipped; the batch only fails when nothing could be read at all.
fn extract_batch(files: &[PathBuf], config: &ExtractorConfig) -> Result<Batch, AppError> {
    let extractor = config.extractor();
    let mut batch = Batch {
        records: Vec::with_capacity(files.len()),
        source_files: Vec::with_capacity(files.len()),
    };
    let mut failure_count = 0;

    for path in files {
        tracing::info!("Processing document: {}", path.display());

        match pdf::extract_text(path) {
            Ok(text) => {
                let record = extractor.extract(&text, config.now());
                if record.specimen_number().is_empty() || record.patient_number().is_empty() {
                    tracing::warn!("{}: LN or HN not found, row will have blanks", path.display());
                }
                batch.records.push(record);
                batch.source_files.push(path.display().to_string());
            }
            Err(e) => {
                tracing::error!("Skipping {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!(
        "Extraction finished. Success: {}, Failures: {}",
        batch.records.len(),
        failure_count
    );

    if batch.records.is_empty() && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any records from {} documents",
            failure_count
        )));
    }

    Ok(batch)
}

fn export_batch(dir: &Path, batch: &Batch, config: &ExtractorConfig) -> Result<(), AppError> {
    let storage = StorageManager::new(dir)?;
    let exported_at = config.now();
    storage.save_batch(&batch.records, exported_at)?;
    storage.save_batch_metadata(
        &batch.records,
        &batch.source_files,
        config.timestamp_source,
        exported_at,
    )?;
    Ok(())
}

fn sheet_client(args: &SheetArgs) -> Result<SheetsClient, AppError> {
    let config = SheetConfig::from_parts(
        args.sheet_id.as_deref(),
        &args.worksheet,
        args.access_token.as_deref(),
    )?;
    let url = sheets::sheet_url(&config.sheet_id);
    tracing::info!("Sheet in use: {}", url);
    println!("Sheet in use: {}", url);
    Ok(SheetsClient::new(config)?)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (RUST_LOG overrides --verbose)
    utils::logging::setup_logging(args.verbose);
    tracing::debug!("Starting with args: {:?}", args.command);

    // 3. Resolve extraction settings
    let extractor_config = ExtractorConfig::new(
        &args.test_name,
        args.timestamp_source,
        args.utc_offset_hours,
    )?;
    tracing::debug!("Extractor config: {:?}", extractor_config);

    match &args.command {
        Command::Extract {
            files,
            format,
            export_dir,
        } => {
            let batch = extract_batch(files, &extractor_config)?;
            match format {
                OutputFormat::Table => print!("{}", utils::table::render(&batch.records)),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&batch.records)
                        .map_err(|e| AppError::Processing(e.to_string()))?;
                    println!("{}", json);
                }
            }
            if let Some(dir) = export_dir {
                export_batch(dir, &batch, &extractor_config)?;
            }
        }
        Command::Save { files, export_dir } => {
            // Fail on missing sheet settings before reading any document.
            let client = sheet_client(&args.sheet)?;

            let batch = extract_batch(files, &extractor_config)?;
            print!("{}", utils::table::render(&batch.records));
            if let Some(dir) = export_dir {
                export_batch(dir, &batch, &extractor_config)?;
            }

            let summary = sheets::save_records(&client, &batch.records).await?;
            println!(
                "Saved {} rows. Now total rows (incl. header): {}",
                summary.appended, summary.total_rows
            );
        }
        Command::TestSheet => {
            let client = sheet_client(&args.sheet)?;
            let report = sheets::round_trip_test(
                &client,
                &extractor_config.test_name,
                extractor_config.now(),
            )
            .await?;
            println!("Rows in sheet (including header): {}", report.total_rows);
            println!("Last {} rows from the sheet:", report.last_rows.len());
            print!("{}", utils::table::render_rows(&report.last_rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_extract_arguments() {
        let args = Args::try_parse_from([
            "labsheet",
            "extract",
            "a.pdf",
            "b.pdf",
            "--format",
            "json",
            "--timestamp-source",
            "document",
        ])
        .unwrap();
        assert_eq!(args.timestamp_source, TimestampSource::Document);
        match args.command {
            Command::Extract { files, format, export_dir } => {
                assert_eq!(files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
                assert_eq!(format, OutputFormat::Json);
                assert!(export_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extract_requires_files() {
        assert!(Args::try_parse_from(["labsheet", "extract"]).is_err());
    }

    #[test]
    fn test_unreadable_batch_is_an_error() {
        let config = ExtractorConfig::new(DEFAULT_TEST_NAME, TimestampSource::Ingestion, 7).unwrap();
        let files = vec![PathBuf::from("notes.txt"), std::env::temp_dir().join("labsheet-absent.pdf")];
        let err = extract_batch(&files, &config).err().unwrap();
        assert!(matches!(err, AppError::Processing(_)));
    }

    #[test]
    fn test_bad_document_is_skipped_and_batch_continues() {
        let dir = std::env::temp_dir().join(format!("labsheet-batch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.pdf");
        let broken = dir.join("broken.pdf");
        let last = dir.join("last.pdf");
        std::fs::write(&first, pdf::fixtures::pdf_with_text("LN: 111111 HN H00001 Positive")).unwrap();
        std::fs::write(&broken, pdf::fixtures::pdf_with_undeclared_font("LN: 222222 HN H00002")).unwrap();
        std::fs::write(&last, pdf::fixtures::pdf_with_text("LN: 333333 HN H00003 Negative")).unwrap();

        let config = ExtractorConfig::new(DEFAULT_TEST_NAME, TimestampSource::Ingestion, 7).unwrap();
        let batch = extract_batch(&[first.clone(), broken, last.clone()], &config).unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(
            batch.source_files,
            vec![first.display().to_string(), last.display().to_string()]
        );
        assert_eq!(batch.records[0].specimen_number(), "111111");
        assert_eq!(batch.records[0].result(), "Detected");
        assert_eq!(batch.records[1].specimen_number(), "333333");
        assert_eq!(batch.records[1].result(), "Not detected");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
