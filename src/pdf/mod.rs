// src/pdf/mod.rs
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::utils::error::DocumentError;

/// Returns true when the path carries a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Reads a PDF from disk and returns its text, pages concatenated.
pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    let label = path.display().to_string();

    if !is_pdf(path) {
        return Err(DocumentError::Unsupported(label));
    }

    let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
        path: label.clone(),
        source,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), label);

    extract_text_from_bytes(&bytes, &label)
}

/// Converts in-memory PDF bytes to plain text. `label` is only used in errors and logs.
///
/// `pdf_extract` panics on some malformed documents (e.g. a page using a font its
/// resources never declare), so the call runs behind `catch_unwind` and a panic is
/// reported as an extraction error for this document only.
pub fn extract_text_from_bytes(bytes: &[u8], label: &str) -> Result<String, DocumentError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(DocumentError::Extraction {
                path: label.to_string(),
                message: e.to_string(),
            })
        }
        Err(_) => {
            return Err(DocumentError::Extraction {
                path: label.to_string(),
                message: "PDF parser panicked (malformed document)".to_string(),
            })
        }
    };

    if text.trim().is_empty() {
        // Image-only scans come back empty; the extractor will fill defaults.
        tracing::warn!("No text layer found in {}", label);
    } else {
        tracing::debug!("Extracted {} characters of text from {}", text.len(), label);
    }

    Ok(text)
}
