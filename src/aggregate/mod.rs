//! Aggregation of normalized records into aligned per-dimension series.
//!
//! # Components
//!
//! - [`aggregate_actual`] / [`AggregationBucket`] - order totals per period
//! - [`aggregate_target`] / [`target_series`] - target lookup with an
//!   explicit [`TargetPolicy`] for regions
//! - [`MtdSnapshot`] - month-to-date scorecard totals
//!
//! All series built from one record set share the same contiguous period
//! list, so per-area series always sum to the national series.

mod actual;
mod dimension;
mod mtd;
mod target;

pub use actual::{aggregate_actual, build_series, canonical_periods, series_for, AggregationBucket};
pub use dimension::Dimension;
pub use mtd::MtdSnapshot;
pub use target::{
    aggregate_target, region_target, target_series, TargetLookup, TargetPolicy, TargetSeries,
};
