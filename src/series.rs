//! Ordered per-period series and holiday exclusion masks.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::SeriesError;
use crate::period::{Granularity, Period};

/// One observation of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// A chronologically ordered series of per-period order counts.
///
/// # Invariants
///
/// - Periods share one granularity and are contiguous (no gaps, no duplicates).
/// - Every value is finite and non-negative.
///
/// Both are checked on construction, so the metrics engine and anomaly
/// detector never see `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    granularity: Granularity,
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Builds a series of `values` starting at `first` and advancing one
    /// period per value.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use order_spc::period::{Granularity, Period};
    /// use order_spc::series::TimeSeries;
    ///
    /// let first = Period::containing(
    ///     NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
    ///     Granularity::Weekly,
    /// );
    /// let series = TimeSeries::from_values(first, vec![120.0, 135.0, 128.0]).unwrap();
    /// assert_eq!(series.labels(), vec!["2025-03-03", "2025-03-10", "2025-03-17"]);
    /// ```
    pub fn from_values(first: Period, values: Vec<f64>) -> Result<Self, SeriesError> {
        let mut points = Vec::with_capacity(values.len());
        let mut period = Some(first);
        for (index, value) in values.into_iter().enumerate() {
            check_value(index, value)?;
            let Some(current) = period else {
                return Err(SeriesError::NonContiguousPeriod {
                    index,
                    expected: NaiveDate::MAX,
                    found: NaiveDate::MAX,
                });
            };
            points.push(SeriesPoint {
                period: current,
                value,
            });
            period = current.succ();
        }
        Ok(Self {
            granularity: first.granularity(),
            points,
        })
    }

    /// Builds a series from explicit `(period, value)` pairs, validating
    /// order, contiguity and values.
    pub fn from_points(
        granularity: Granularity,
        points: Vec<(Period, f64)>,
    ) -> Result<Self, SeriesError> {
        let mut out: Vec<SeriesPoint> = Vec::with_capacity(points.len());
        for (index, (period, value)) in points.into_iter().enumerate() {
            check_value(index, value)?;
            if period.granularity() != granularity {
                return Err(SeriesError::MixedGranularity { index });
            }
            if let Some(prev) = out.last() {
                let expected = prev.period.succ();
                if expected != Some(period) {
                    return Err(SeriesError::NonContiguousPeriod {
                        index,
                        expected: expected.map_or(NaiveDate::MAX, |p| p.start()),
                        found: period.start(),
                    });
                }
            }
            out.push(SeriesPoint { period, value });
        }
        Ok(Self {
            granularity,
            points: out,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.period.label()).collect()
    }

    pub fn label(&self, index: usize) -> Option<String> {
        self.points.get(index).map(|p| p.period.label())
    }

    /// Index of `period` within the series, if present.
    pub fn position(&self, period: Period) -> Option<usize> {
        let first = self.points.first()?.period;
        if period.granularity() != self.granularity || period < first {
            return None;
        }
        self.points
            .binary_search_by(|p| p.period.cmp(&period))
            .ok()
    }
}

fn check_value(index: usize, value: f64) -> Result<(), SeriesError> {
    if !value.is_finite() {
        return Err(SeriesError::NonFiniteValue { index, value });
    }
    if value < 0.0 {
        return Err(SeriesError::NegativeValue { index, value });
    }
    Ok(())
}

/// Indices of a series excluded from statistical calculation (typically
/// holiday periods) while still being reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExclusionMask {
    series_len: usize,
    excluded: BTreeSet<usize>,
}

impl ExclusionMask {
    /// Creates a mask over a series of length `series_len`.
    ///
    /// Fails if any index is outside `[0, series_len)`.
    pub fn new(
        indices: impl IntoIterator<Item = usize>,
        series_len: usize,
    ) -> Result<Self, SeriesError> {
        let mut excluded = BTreeSet::new();
        for index in indices {
            if index >= series_len {
                return Err(SeriesError::MaskIndexOutOfRange {
                    index,
                    len: series_len,
                });
            }
            excluded.insert(index);
        }
        Ok(Self {
            series_len,
            excluded,
        })
    }

    /// Masks every period of `series` that contains one of `holidays`.
    ///
    /// Holidays outside the series span are ignored.
    pub fn from_holidays(series: &TimeSeries, holidays: &[NaiveDate]) -> Self {
        let excluded = holidays
            .iter()
            .filter_map(|&day| series.position(Period::containing(day, series.granularity())))
            .collect();
        Self {
            series_len: series.len(),
            excluded,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.excluded.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    pub fn series_len(&self) -> usize {
        self.series_len
    }

    /// Excluded indices in ascending order.
    pub fn excluded(&self) -> impl Iterator<Item = usize> + '_ {
        self.excluded.iter().copied()
    }
}

/// Indices of `0..len` that are not masked, in ascending order.
pub fn included_indices(len: usize, mask: Option<&ExclusionMask>) -> Vec<usize> {
    (0..len)
        .filter(|&i| mask.map_or(true, |m| !m.contains(i)))
        .collect()
}
