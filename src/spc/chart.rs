//! Core control chart types.
//!
//! Defines the building blocks shared by the metrics engine and the anomaly
//! detector: control limits and the per-point markers handed to the
//! presentation layer.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation*, 2nd ed.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use serde::Serialize;

/// Control limits for one chart.
///
/// Represents the upper limit, center line, and lower limit of either the
/// individuals (X) chart or the moving-range (mR) chart.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl` for limits derived from a finite series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlLimits {
    /// Upper limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Whether `value` lies strictly outside the limits.
    pub fn is_beyond(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }
}

/// Visual marker assigned to each period of an individuals chart.
///
/// Variants are ordered by priority: a higher-priority marker is never
/// replaced by a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointMarker {
    /// Ordinary point.
    None,
    /// Member of a run of points near a natural process limit.
    NearLimitRun,
    /// Excluded from the statistics (holiday period).
    Holiday,
    /// Point beyond a natural process limit.
    BeyondLimit,
}

impl PointMarker {
    /// Raises `self` to `other` if `other` has higher priority.
    pub fn escalate(&mut self, other: PointMarker) {
        if other > *self {
            *self = other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_limits_construction() {
        let limits = ControlLimits {
            ucl: 30.0,
            cl: 25.0,
            lcl: 20.0,
        };
        assert!((limits.ucl - 30.0).abs() < f64::EPSILON);
        assert!((limits.cl - 25.0).abs() < f64::EPSILON);
        assert!((limits.lcl - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_beyond_is_strict() {
        let limits = ControlLimits {
            ucl: 30.0,
            cl: 25.0,
            lcl: 20.0,
        };
        assert!(!limits.is_beyond(30.0));
        assert!(!limits.is_beyond(20.0));
        assert!(limits.is_beyond(30.1));
        assert!(limits.is_beyond(19.9));
        assert!(!limits.is_beyond(f64::NAN));
    }

    #[test]
    fn test_marker_priority() {
        let mut marker = PointMarker::None;
        marker.escalate(PointMarker::NearLimitRun);
        assert_eq!(marker, PointMarker::NearLimitRun);
        marker.escalate(PointMarker::BeyondLimit);
        assert_eq!(marker, PointMarker::BeyondLimit);
        marker.escalate(PointMarker::Holiday);
        assert_eq!(marker, PointMarker::BeyondLimit);
    }
}
