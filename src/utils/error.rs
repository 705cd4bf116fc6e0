// src/utils/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from {path}: {message}")]
    Extraction { path: String, message: String },

    #[error("Not a PDF document: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Access token rejected (HTTP {0}); check the token and sheet sharing")]
    Unauthorized(reqwest::StatusCode),

    #[error("Spreadsheet or worksheet not found: {0}")]
    NotFound(String),

    #[error("Invalid Sheets API URL: {0}")]
    Url(String),

    #[error("Failed to parse Sheets API response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("File already exists: {0}")]
    FileExists(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document processing failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Spreadsheet interaction failed: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
