// src/extractors/mod.rs
pub mod fields;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use fields::{
    ExtractedRecord,
    FieldExtractor,
    ResultClass,
    TimestampSource,
    DEFAULT_TEST_NAME,
    HEADER,
    TIMESTAMP_FORMAT,
};
