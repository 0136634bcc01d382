//! XmR (individuals and moving range) metrics.
//!
//! # Algorithm
//!
//! Given the included observations x_1, ..., x_k of a series (excluded
//! holiday periods are dropped, not zeroed):
//!
//! ```text
//! mR_i  = |x_i - x_{i-1}|            i = 2..k
//! X-bar = mean(x)
//! mR-bar = mean(mR)                  0 when k < 2
//! UNPL  = X-bar + 2.66 * mR-bar
//! LNPL  = X-bar - 2.66 * mR-bar      not clamped at zero
//! URL   = 3.27 * mR-bar
//! UQL   = (UNPL + X-bar) / 2
//! LQL   = (LNPL + X-bar) / 2
//! ```
//!
//! Moving ranges bridge excluded periods: the range is taken between the
//! two temporally adjacent *included* points, so removing an excluded
//! period from the series and omitting the mask gives identical limits.
//!
//! # Reference
//!
//! Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical Process
//! Control*, 2nd ed., Chapter 4.

use serde::Serialize;

use super::chart::ControlLimits;
use crate::series::{included_indices, ExclusionMask, TimeSeries};

/// Scaling factor for natural process limits.
///
/// E2 = 3 / d2(n=2) = 3 / 1.128 = 2.6596..., rounded as in the
/// individuals-chart literature.
pub const E2: f64 = 2.66;

/// Scaling factor for the upper range limit (D4 for n=2 moving ranges).
pub const D4_MR: f64 = 3.27;

/// Immutable XmR snapshot for one series.
///
/// A snapshot computed from an empty series is all zeros; use
/// [`XmrMetrics::is_insufficient`] before treating limits as a control
/// state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmrMetrics {
    /// Mean of the included observations.
    pub center_line_x: f64,
    /// Mean moving range.
    pub center_line_mr: f64,
    /// Upper natural process limit (UNPL), `X-bar + E2 * mR-bar`.
    pub upper_natural_process_limit: f64,
    /// Lower natural process limit (LNPL), `X-bar - E2 * mR-bar`. May be negative.
    pub lower_natural_process_limit: f64,
    /// Upper range limit (URL) of the mR chart, `D4 * mR-bar`.
    pub upper_range_limit: f64,
    /// Midpoint between the center line and UNPL.
    pub upper_quarter_line: f64,
    /// Midpoint between the center line and LNPL.
    pub lower_quarter_line: f64,
    /// Moving ranges between consecutive included observations.
    pub moving_ranges: Vec<f64>,
    /// Number of observations that contributed to the statistics.
    pub included_points: usize,
}

impl XmrMetrics {
    /// The all-zero snapshot returned for an empty series.
    pub fn insufficient() -> Self {
        Self {
            center_line_x: 0.0,
            center_line_mr: 0.0,
            upper_natural_process_limit: 0.0,
            lower_natural_process_limit: 0.0,
            upper_range_limit: 0.0,
            upper_quarter_line: 0.0,
            lower_quarter_line: 0.0,
            moving_ranges: Vec::new(),
            included_points: 0,
        }
    }

    /// Computes metrics from raw values, skipping masked indices.
    ///
    /// Non-finite values are not rejected here; they propagate as `NaN`
    /// limits. Build a [`TimeSeries`] first to validate input.
    pub fn from_values(values: &[f64], mask: Option<&ExclusionMask>) -> Self {
        let filtered: Vec<f64> = included_indices(values.len(), mask)
            .into_iter()
            .map(|i| values[i])
            .collect();
        if filtered.is_empty() {
            return Self::insufficient();
        }

        let moving_ranges: Vec<f64> = filtered
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .collect();

        let x_bar = mean(&filtered);
        let mr_bar = if moving_ranges.is_empty() {
            0.0
        } else {
            mean(&moving_ranges)
        };

        let unpl = x_bar + E2 * mr_bar;
        let lnpl = x_bar - E2 * mr_bar;

        Self {
            center_line_x: x_bar,
            center_line_mr: mr_bar,
            upper_natural_process_limit: unpl,
            lower_natural_process_limit: lnpl,
            upper_range_limit: D4_MR * mr_bar,
            upper_quarter_line: (unpl + x_bar) / 2.0,
            lower_quarter_line: (lnpl + x_bar) / 2.0,
            moving_ranges,
            included_points: filtered.len(),
        }
    }

    /// Fewer than two included observations: no variation estimate exists.
    pub fn is_insufficient(&self) -> bool {
        self.included_points < 2
    }

    /// Limits of the individuals (X) chart.
    pub fn natural_limits(&self) -> ControlLimits {
        ControlLimits {
            ucl: self.upper_natural_process_limit,
            cl: self.center_line_x,
            lcl: self.lower_natural_process_limit,
        }
    }

    /// Limits of the moving-range (mR) chart. The lower limit is always 0.
    pub fn range_limits(&self) -> ControlLimits {
        ControlLimits {
            ucl: self.upper_range_limit,
            cl: self.center_line_mr,
            lcl: 0.0,
        }
    }
}

/// Computes XmR metrics for `series`, honoring an optional exclusion mask.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use order_spc::period::{Granularity, Period};
/// use order_spc::series::TimeSeries;
/// use order_spc::spc::compute_metrics;
///
/// let first = Period::containing(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), Granularity::Weekly);
/// let series = TimeSeries::from_values(first, vec![95.0, 105.0]).unwrap();
/// let m = compute_metrics(&series, None);
/// assert!((m.center_line_x - 100.0).abs() < 1e-9);
/// assert!((m.upper_natural_process_limit - 126.6).abs() < 1e-9);
/// ```
pub fn compute_metrics(series: &TimeSeries, mask: Option<&ExclusionMask>) -> XmrMetrics {
    XmrMetrics::from_values(&series.values(), mask)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
