// src/extractors/fields.rs

// --- Imports ---
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Constants ---
pub const DEFAULT_TEST_NAME: &str = "COVID-19 (RT-PCR)";

/// Column order shared by the table, the export files and the sheet header row.
pub const HEADER: [&str; 5] = ["LN", "HN", "RESULT", "TEST", "Approved Date Time"];

/// Canonical timestamp layout written to the sheet.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

// Tried in order; the first one that parses wins.
const TIMESTAMP_PARSE_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

// --- Regex Patterns (Lazy Static) ---
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

// e.g. "LN: 20251015-001" or "LN 20251015"
static SPECIMEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bLN[:\- ]+([0-9]{6,}(?:-[0-9]{1,4})?)\b")
        .expect("Failed to compile SPECIMEN_RE")
});

// e.g. "HN: H00001" or "HN 1234"
static PATIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bHN[:\- ]+([A-Z]?\d{4,10})\b").expect("Failed to compile PATIENT_RE")
});

static RESULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Detected|Not\s*detected|Positive|Negative|Inconclusive)\b")
        .expect("Failed to compile RESULT_RE")
});

// e.g. "Approved Date Time: 16/10/2025 09:26:21"
static APPROVED_AT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bApproved\s*Date\s*Time\s*[:\-]?\s*(\d{1,2}/\d{1,2}/\d{4})\s+(\d{1,2}:\d{2}(?::\d{2})?)\b",
    )
    .expect("Failed to compile APPROVED_AT_RE")
});

// --- Data Structures ---

/// Normalized outcome of a diagnostic test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Detected,
    NotDetected,
    Inconclusive,
    Unknown,
}

impl ResultClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultClass::Detected => "Detected",
            ResultClass::NotDetected => "Not detected",
            ResultClass::Inconclusive => "Inconclusive",
            ResultClass::Unknown => "Unknown",
        }
    }

    /// Maps a matched result token (any case, any internal spacing) to its class.
    /// `None` means nothing was matched in the document.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return ResultClass::Unknown;
        };
        let key: String = token
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "detected" | "positive" => ResultClass::Detected,
            "notdetected" | "negative" => ResultClass::NotDetected,
            _ => ResultClass::Inconclusive,
        }
    }
}

impl std::fmt::Display for ResultClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the "Approved Date Time" column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// Read the approval timestamp printed in the report.
    Document,
    /// Stamp the moment the report was ingested.
    #[default]
    Ingestion,
}

/// One row of fields pulled out of a single lab report.
/// Missing fields are empty strings so every row has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    #[serde(rename = "LN")]
    specimen_number: String,
    #[serde(rename = "HN")]
    patient_number: String,
    #[serde(rename = "RESULT")]
    result: String,
    #[serde(rename = "TEST")]
    test_name: String,
    #[serde(rename = "Approved Date Time")]
    approved_at: String,
}

impl ExtractedRecord {
    pub fn specimen_number(&self) -> &str {
        &self.specimen_number
    }

    pub fn patient_number(&self) -> &str {
        &self.patient_number
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn approved_at(&self) -> &str {
        &self.approved_at
    }

    /// Field values in `HEADER` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.specimen_number.clone(),
            self.patient_number.clone(),
            self.result.clone(),
            self.test_name.clone(),
            self.approved_at.clone(),
        ]
    }
}

// --- Main Extractor Structure ---
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    test_name: String,
    timestamp_source: TimestampSource,
}

impl FieldExtractor {
    pub fn new(test_name: impl Into<String>, timestamp_source: TimestampSource) -> Self {
        Self {
            test_name: test_name.into(),
            timestamp_source,
        }
    }

    /// Builds a record from the raw text of one document.
    ///
    /// `ingested_at` is only consulted in `TimestampSource::Ingestion` mode; passing it in
    /// keeps extraction free of clock reads.
    pub fn extract(&self, raw_text: &str, ingested_at: DateTime<FixedOffset>) -> ExtractedRecord {
        let text = normalize_whitespace(raw_text);

        let specimen_number = first_capture(&SPECIMEN_RE, &text);
        let patient_number = first_capture(&PATIENT_RE, &text);
        let result_token = RESULT_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());
        let result = ResultClass::from_token(result_token);

        let approved_at = match self.timestamp_source {
            TimestampSource::Document => approved_at_from_text(&text),
            TimestampSource::Ingestion => ingested_at.format(TIMESTAMP_FORMAT).to_string(),
        };

        tracing::debug!(
            "Extracted LN='{}' HN='{}' RESULT='{}' approved='{}'",
            specimen_number,
            patient_number,
            result,
            approved_at
        );

        ExtractedRecord {
            specimen_number,
            patient_number,
            result: result.as_str().to_string(),
            test_name: self.test_name.clone(),
            approved_at,
        }
    }
}

// --- Helper Functions ---

/// Collapses every whitespace run (newlines and carriage returns included) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

fn first_capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Reads the labelled approval timestamp and reformats it to `TIMESTAMP_FORMAT`.
/// Returns an empty string when the label is missing or the value does not parse.
fn approved_at_from_text(text: &str) -> String {
    let Some(caps) = APPROVED_AT_RE.captures(text) else {
        return String::new();
    };
    let combined = format!("{} {}", &caps[1], &caps[2]);

    match parse_timestamp(&combined) {
        Some(parsed) => parsed.format(TIMESTAMP_FORMAT).to_string(),
        None => {
            tracing::warn!("Approval timestamp label found but value '{}' is not a valid date/time", combined);
            String::new()
        }
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
