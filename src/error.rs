//! Error types.
//!
//! One enum per subsystem. None of them originate inside the statistics
//! engine: missing data is reported through zero-valued series and
//! data-quality counters, never through `Err`.

use chrono::NaiveDate;

/// Errors raised when constructing a [`TimeSeries`](crate::series::TimeSeries)
/// or an [`ExclusionMask`](crate::series::ExclusionMask).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("value at index {index} is not finite: {value}")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("value at index {index} is negative: {value}")]
    NegativeValue { index: usize, value: f64 },

    #[error("period {found} at index {index} does not follow {expected}")]
    NonContiguousPeriod {
        index: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("period at index {index} has granularity different from the series")]
    MixedGranularity { index: usize },

    #[error("exclusion index {index} out of range for series of length {len}")]
    MaskIndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while reading raw order or target feeds.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON array or newline-delimited JSON objects")]
    UnsupportedShape,
}

/// Errors raised while loading an [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
