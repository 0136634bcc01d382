//! Statistical process control for order series.
//!
//! Provides the XmR (individuals and moving range) metrics engine and the
//! anomaly detector built on it.
//!
//! # Pipeline
//!
//! - [`compute_metrics`] - center lines, natural process limits, upper
//!   range limit and quarter lines, optionally skipping excluded periods
//! - [`detect_anomalies`] - holiday exclusions, Rule 1 (beyond limits),
//!   moving-range rule, Rule 2 (runs near limits) and the final
//!   [`ProcessStatus`]
//!
//! Both are pure functions over immutable inputs.
//!
//! # References
//!
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical
//!   Process Control*, 2nd ed.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

mod anomaly;
mod chart;
mod metrics;
mod rules;

pub use anomaly::{
    detect_anomalies, Anomaly, AnomalyKind, AnomalySpan, Detection, DetectionRule, ProcessStatus,
};
pub use chart::{ControlLimits, PointMarker};
pub use metrics::{compute_metrics, XmrMetrics, D4_MR, E2};
pub use rules::{RUN_THRESHOLD, RUN_WINDOW};
