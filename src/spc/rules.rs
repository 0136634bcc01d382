//! Detection rules applied to an individuals series and its XmR metrics.
//!
//! - Rule 1: a single point beyond a natural process limit.
//! - Moving-range rule: a moving range above the upper range limit.
//! - Rule 2: at least 3 of 4 consecutive points beyond a quarter line.
//!
//! Every rule ignores excluded (holiday) indices. Each check returns plain
//! `(index, kind)` pairs; [`detect_anomalies`](super::detect_anomalies)
//! turns them into reported anomalies.
//!
//! # References
//!
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Wheeler, D.J. (2000). *Understanding Variation*, 2nd ed.

use std::collections::BTreeSet;

use super::anomaly::AnomalyKind;
use super::metrics::XmrMetrics;
use crate::series::ExclusionMask;

/// Number of consecutive periods examined by Rule 2.
pub const RUN_WINDOW: usize = 4;

/// Minimum number of near-limit points in a window to trigger Rule 2.
pub const RUN_THRESHOLD: usize = 3;

fn is_excluded(mask: Option<&ExclusionMask>, index: usize) -> bool {
    mask.is_some_and(|m| m.contains(index))
}

/// Rule 1: points strictly above UNPL (`Increase`) or below LNPL (`Decrease`).
pub(crate) fn check_beyond_limits(
    values: &[f64],
    metrics: &XmrMetrics,
    mask: Option<&ExclusionMask>,
) -> Vec<(usize, AnomalyKind)> {
    let mut signals = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if is_excluded(mask, i) {
            continue;
        }
        if v > metrics.upper_natural_process_limit {
            signals.push((i, AnomalyKind::Increase));
        } else if v < metrics.lower_natural_process_limit {
            signals.push((i, AnomalyKind::Decrease));
        }
    }
    signals
}

/// Moving ranges above URL.
///
/// `included` maps each filtered position back to its series index; a
/// range is attributed to the later of the two points forming it. Returns
/// `(series_index, moving_range)` pairs.
pub(crate) fn check_moving_ranges(included: &[usize], metrics: &XmrMetrics) -> Vec<(usize, f64)> {
    metrics
        .moving_ranges
        .iter()
        .enumerate()
        .filter(|&(_, &mr)| mr > metrics.upper_range_limit)
        .filter_map(|(j, &mr)| included.get(j + 1).map(|&i| (i, mr)))
        .collect()
}

/// Rule 2: windows of [`RUN_WINDOW`] consecutive periods with at least
/// [`RUN_THRESHOLD`] points beyond a quarter line.
///
/// A window is skipped entirely when any member is excluded or already in
/// `flagged` (Rule 1 takes priority). Returns `(window_start, kind)` pairs.
pub(crate) fn check_near_limit_runs(
    values: &[f64],
    metrics: &XmrMetrics,
    mask: Option<&ExclusionMask>,
    flagged: &BTreeSet<usize>,
) -> Vec<(usize, AnomalyKind)> {
    let mut signals = Vec::new();
    if values.len() < RUN_WINDOW {
        return signals;
    }

    for start in 0..=values.len() - RUN_WINDOW {
        let members = start..start + RUN_WINDOW;
        if members
            .clone()
            .any(|i| is_excluded(mask, i) || flagged.contains(&i))
        {
            continue;
        }

        let window = &values[members];
        let upper = window
            .iter()
            .filter(|&&v| v > metrics.upper_quarter_line)
            .count();
        let lower = window
            .iter()
            .filter(|&&v| v < metrics.lower_quarter_line)
            .count();
        if upper + lower < RUN_THRESHOLD {
            continue;
        }

        if upper >= lower && upper > 0 {
            signals.push((start, AnomalyKind::Increase));
        } else if lower > upper {
            signals.push((start, AnomalyKind::Decrease));
        }
    }
    signals
}
