//! # order-spc
//!
//! XmR statistical process control for order volumes.
//!
//! Raw daily order rows and target rows are aggregated into aligned weekly
//! or monthly series per dimension (national, region, area, product). Each
//! series gets individuals / moving-range control limits, and an anomaly
//! detector classifies points beyond the limits, runs near the limits,
//! unusual moving ranges, and holiday exclusions.
//!
//! ## Modules
//!
//! - [`period`] - weekly/monthly reporting periods and date parsing
//! - [`series`] - validated [`TimeSeries`](series::TimeSeries) and exclusion masks
//! - [`catalog`] - area/region/product tables and name normalization
//! - [`ingest`] - JSON/NDJSON feeds, lenient numeric coercion, data quality
//! - [`aggregate`] - per-dimension series, target lookup, MTD snapshot
//! - [`spc`] - XmR metrics and anomaly detection
//! - [`report`] - the end-to-end pipeline
//! - [`config`] - TOML configuration
//!
//! ## Design Philosophy
//!
//! - **Pure core**: metrics and detection are functions of immutable inputs
//! - **Resilient ingestion**: missing data yields zeros and counters, not errors
//! - **Fail fast at the boundary**: series are validated before analysis

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod period;
pub mod report;
pub mod series;
pub mod spc;
