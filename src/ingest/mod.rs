//! Raw feed ingestion.
//!
//! Turns order and target exports (JSON arrays or NDJSON) into normalized
//! records. Input that cannot be parsed at all is an [`IngestError`];
//! individual bad fields are coerced to zero and counted in
//! [`DataQuality`].
//!
//! [`IngestError`]: crate::error::IngestError

mod loader;
mod quality;
mod records;

pub use loader::{load_records, parse_records};
pub use quality::{coerce_count, Coerced, DataQuality};
pub use records::{
    normalize_orders, normalize_targets, OrderRecord, PeriodStamp, RawOrderRecord,
    RawTargetRecord, TargetRecord,
};
