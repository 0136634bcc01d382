//! Anomaly classification for one series.
//!
//! # Algorithm
//!
//! 1. Excluded (holiday) periods are reported as `HolidayExclusion` and take
//!    no part in any rule.
//! 2. Rule 1 flags single points beyond the natural process limits.
//! 3. The moving-range rule flags ranges above the upper range limit,
//!    attributed to the later period of the pair.
//! 4. Rule 2 flags 4-period windows with at least 3 points beyond a quarter
//!    line. Windows touching a Rule-1 point or an excluded period are skipped.
//! 5. The process status is the direction of the most recent Rule-1 or
//!    Rule-2 anomaly, or `Stable` if there is none.

use std::collections::BTreeSet;

use serde::Serialize;

use super::chart::PointMarker;
use super::metrics::XmrMetrics;
use super::rules::{self, RUN_WINDOW};
use crate::series::{included_indices, ExclusionMask, TimeSeries};

/// Classification of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Increase,
    Decrease,
    VariabilityIncrease,
    HolidayExclusion,
}

/// The rule that produced an anomaly, in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionRule {
    HolidayExclusion,
    BeyondLimits,
    MovingRange,
    NearLimitRun,
}

/// Periods an anomaly refers to, as zero-based series indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum AnomalySpan {
    Point { index: usize },
    /// Inclusive range.
    Range { start: usize, end: usize },
}

impl AnomalySpan {
    pub fn first(&self) -> usize {
        match *self {
            AnomalySpan::Point { index } => index,
            AnomalySpan::Range { start, .. } => start,
        }
    }

    pub fn last(&self) -> usize {
        match *self {
            AnomalySpan::Point { index } => index,
            AnomalySpan::Range { end, .. } => end,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first()..=self.last()).contains(&index)
    }
}

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub rule: DetectionRule,
    #[serde(flatten)]
    pub span: AnomalySpan,
    /// Label of the period, or `"<first> to <last>"` for a range.
    pub period_label: String,
    /// The point value; for a moving-range anomaly the range itself; for a
    /// Rule-2 window the mean of its values.
    pub value: f64,
    pub description: String,
}

/// Overall direction of a series after detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Increase,
    Decrease,
    Stable,
}

/// Output of one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Anomalies ordered by first period, then by rule.
    pub anomalies: Vec<Anomaly>,
    /// One marker per series period.
    pub markers: Vec<PointMarker>,
    pub status: ProcessStatus,
}

impl Detection {
    fn quiet(len: usize) -> Self {
        Self {
            anomalies: Vec::new(),
            markers: vec![PointMarker::None; len],
            status: ProcessStatus::Stable,
        }
    }

    /// Whether any Rule-1 or Rule-2 signal was raised.
    pub fn has_signals(&self) -> bool {
        self.anomalies.iter().any(|a| a.is_signal())
    }
}

impl Anomaly {
    /// Rule-1 and Rule-2 anomalies drive the process status.
    pub fn is_signal(&self) -> bool {
        matches!(
            self.rule,
            DetectionRule::BeyondLimits | DetectionRule::NearLimitRun
        )
    }
}

/// Classifies every period of `series` against `metrics`.
///
/// `metrics` should be computed from the same series and mask. Series of
/// length 0 or 1 produce no anomalies and a `Stable` status.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use order_spc::period::{Granularity, Period};
/// use order_spc::series::TimeSeries;
/// use order_spc::spc::{compute_metrics, detect_anomalies, AnomalyKind, ProcessStatus};
///
/// let first = Period::containing(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), Granularity::Weekly);
/// let mut values = vec![100.0; 10];
/// values.extend([500.0, 100.0]);
/// let series = TimeSeries::from_values(first, values).unwrap();
///
/// let metrics = compute_metrics(&series, None);
/// let detection = detect_anomalies(&series, &metrics, None);
/// assert_eq!(detection.status, ProcessStatus::Increase);
/// assert_eq!(detection.anomalies[0].kind, AnomalyKind::Increase);
/// ```
pub fn detect_anomalies(
    series: &TimeSeries,
    metrics: &XmrMetrics,
    mask: Option<&ExclusionMask>,
) -> Detection {
    let len = series.len();
    if len <= 1 {
        return Detection::quiet(len);
    }

    let values = series.values();
    let label = |i: usize| series.label(i).unwrap_or_default();
    let mut detection = Detection::quiet(len);
    let anomalies = &mut detection.anomalies;
    let markers = &mut detection.markers;

    if let Some(mask) = mask {
        for i in mask.excluded().filter(|&i| i < len) {
            markers[i].escalate(PointMarker::Holiday);
            anomalies.push(Anomaly {
                kind: AnomalyKind::HolidayExclusion,
                rule: DetectionRule::HolidayExclusion,
                span: AnomalySpan::Point { index: i },
                period_label: label(i),
                value: values[i],
                description: format!(
                    "{}: {:.0} excluded from control limits (holiday period)",
                    label(i),
                    values[i]
                ),
            });
        }
    }

    let mut flagged = BTreeSet::new();
    for (i, kind) in rules::check_beyond_limits(&values, metrics, mask) {
        flagged.insert(i);
        markers[i].escalate(PointMarker::BeyondLimit);
        let description = match kind {
            AnomalyKind::Increase => format!(
                "{}: {:.0} above upper natural process limit {:.1}",
                label(i),
                values[i],
                metrics.upper_natural_process_limit
            ),
            _ => format!(
                "{}: {:.0} below lower natural process limit {:.1}",
                label(i),
                values[i],
                metrics.lower_natural_process_limit
            ),
        };
        anomalies.push(Anomaly {
            kind,
            rule: DetectionRule::BeyondLimits,
            span: AnomalySpan::Point { index: i },
            period_label: label(i),
            value: values[i],
            description,
        });
    }

    let included = included_indices(len, mask);
    for (i, range) in rules::check_moving_ranges(&included, metrics) {
        anomalies.push(Anomaly {
            kind: AnomalyKind::VariabilityIncrease,
            rule: DetectionRule::MovingRange,
            span: AnomalySpan::Point { index: i },
            period_label: label(i),
            value: range,
            description: format!(
                "{}: moving range {:.0} above upper range limit {:.1}",
                label(i),
                range,
                metrics.upper_range_limit
            ),
        });
    }

    for (start, kind) in rules::check_near_limit_runs(&values, metrics, mask, &flagged) {
        let end = start + RUN_WINDOW - 1;
        for marker in &mut markers[start..=end] {
            marker.escalate(PointMarker::NearLimitRun);
        }
        let window_mean = values[start..=end].iter().sum::<f64>() / RUN_WINDOW as f64;
        let (side, line) = match kind {
            AnomalyKind::Increase => ("upper", metrics.upper_quarter_line),
            _ => ("lower", metrics.lower_quarter_line),
        };
        let period_label = format!("{} to {}", label(start), label(end));
        anomalies.push(Anomaly {
            kind,
            rule: DetectionRule::NearLimitRun,
            span: AnomalySpan::Range { start, end },
            description: format!(
                "{}: at least 3 of {} periods beyond {} quarter line {:.1}",
                period_label, RUN_WINDOW, side, line
            ),
            period_label,
            value: window_mean,
        });
    }

    anomalies.sort_by_key(|a| (a.span.first(), a.rule));

    detection.status = anomalies
        .iter()
        .filter(|a| a.is_signal())
        .max_by_key(|a| a.span.last())
        .map_or(ProcessStatus::Stable, |a| match a.kind {
            AnomalyKind::Decrease => ProcessStatus::Decrease,
            _ => ProcessStatus::Increase,
        });

    detection
}
