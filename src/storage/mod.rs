// src/storage/mod.rs
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, FixedOffset};
use crate::extractors::{ExtractedRecord, TimestampSource};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    fn batch_stem(exported_at: DateTime<FixedOffset>) -> String {
        format!("records_{}", exported_at.format("%Y%m%d_%H%M%S_%3f"))
    }

    /// Writes `body` to a file that must not exist yet; earlier exports are never overwritten.
    fn write_new(file_path: &Path, body: &str) -> Result<(), StorageError> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(file_path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::FileExists(file_path.display().to_string()),
                _ => StorageError::IoError(e),
            })?;
        file.write_all(body.as_bytes())
            .map_err(StorageError::IoError)
    }

    /// Saves the extracted records of one batch as a JSON array
    pub fn save_batch(
        &self,
        records: &[ExtractedRecord],
        exported_at: DateTime<FixedOffset>,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.json", Self::batch_stem(exported_at)));

        let body = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        Self::write_new(&file_path, &body)?;

        tracing::info!("Saved {} records to {}", records.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the batch in JSON format
    pub fn save_batch_metadata(
        &self,
        records: &[ExtractedRecord],
        source_files: &[String],
        timestamp_source: TimestampSource,
        exported_at: DateTime<FixedOffset>,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", Self::batch_stem(exported_at)));

        let metadata = serde_json::json!({
            "record_count": records.len(),
            "source_files": source_files,
            "timestamp_source": timestamp_source,
            "export_timestamp": exported_at.to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        Self::write_new(&file_path, &metadata_str)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
