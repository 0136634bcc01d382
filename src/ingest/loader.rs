//! JSON and NDJSON feed parsing.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::IngestError;

/// Parses either a JSON array of records or newline-delimited JSON objects.
///
/// Blank lines in NDJSON input are ignored. Errors carry the 1-based line
/// number of the offending record.
pub fn parse_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, IngestError> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(text).map_err(|source| IngestError::Json {
            line: source.line(),
            source,
        });
    }
    if !trimmed.starts_with('{') {
        return Err(IngestError::UnsupportedShape);
    }

    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line)
            .map_err(|source| IngestError::Json { line: i + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads and parses a feed file.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_records(&text)?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded feed");
    Ok(records)
}
