//! Actual order aggregation.

use std::collections::BTreeMap;

use super::dimension::Dimension;
use crate::error::SeriesError;
use crate::ingest::OrderRecord;
use crate::period::{Granularity, Period};
use crate::series::TimeSeries;

/// Sums `orders` per period over the records accepted by `filter`.
///
/// Records for which `period_key` returns `None` are skipped; malformed
/// counts were already coerced to zero during normalization. The map is
/// keyed by [`Period`], so iteration is in calendar order.
pub fn aggregate_actual<K, F>(
    records: &[OrderRecord],
    period_key: K,
    filter: F,
) -> BTreeMap<Period, f64>
where
    K: Fn(&OrderRecord) -> Option<Period>,
    F: Fn(&OrderRecord) -> bool,
{
    let mut totals = BTreeMap::new();
    for record in records {
        if !filter(record) {
            continue;
        }
        if let Some(period) = period_key(record) {
            *totals.entry(period).or_insert(0.0) += record.orders;
        }
    }
    totals
}

/// The contiguous period list spanning every dated record.
///
/// Every series built from the same records uses this list, which keeps
/// series aligned across dimensions.
pub fn canonical_periods(records: &[OrderRecord], granularity: Granularity) -> Vec<Period> {
    let mut periods = records.iter().filter_map(|r| r.stamp.period(granularity));
    let Some(first) = periods.next() else {
        return Vec::new();
    };
    let (min, max) = periods.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Period::span(min, max)
}

/// Per-dimension series under construction.
///
/// Records are folded in one at a time; [`finish`](Self::finish) turns the
/// running totals into validated, aligned [`TimeSeries`]. A dimension that
/// no record matches finishes as an all-zero series of full length.
#[derive(Debug, Clone)]
pub struct AggregationBucket {
    granularity: Granularity,
    periods: Vec<Period>,
    totals: BTreeMap<Dimension, Vec<f64>>,
}

impl AggregationBucket {
    pub fn new(granularity: Granularity, periods: Vec<Period>, dimensions: Vec<Dimension>) -> Self {
        let totals = dimensions
            .into_iter()
            .map(|d| (d, vec![0.0; periods.len()]))
            .collect();
        Self {
            granularity,
            periods,
            totals,
        }
    }

    /// Adds `record` to every dimension it matches. Records outside the
    /// period list are ignored.
    pub fn fold(&mut self, record: &OrderRecord) {
        let Some(period) = record.stamp.period(self.granularity) else {
            return;
        };
        let Ok(slot) = self.periods.binary_search(&period) else {
            return;
        };
        for (dimension, values) in &mut self.totals {
            if dimension.matches(record) {
                values[slot] += record.orders;
            }
        }
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Finalizes every dimension into an immutable series.
    pub fn finish(self) -> Result<BTreeMap<Dimension, TimeSeries>, SeriesError> {
        let periods = self.periods;
        let granularity = self.granularity;
        self.totals
            .into_iter()
            .map(|(dimension, values)| {
                let points = periods.iter().copied().zip(values).collect();
                TimeSeries::from_points(granularity, points).map(|s| (dimension, s))
            })
            .collect()
    }
}

/// Builds one aligned series per dimension from `records`.
pub fn build_series(
    records: &[OrderRecord],
    granularity: Granularity,
    dimensions: Vec<Dimension>,
) -> Result<BTreeMap<Dimension, TimeSeries>, SeriesError> {
    let periods = canonical_periods(records, granularity);
    let mut bucket = AggregationBucket::new(granularity, periods, dimensions);
    for record in records {
        bucket.fold(record);
    }
    bucket.finish()
}

/// Builds the series of a single dimension over `periods`.
pub fn series_for(
    records: &[OrderRecord],
    granularity: Granularity,
    periods: &[Period],
    dimension: &Dimension,
) -> Result<TimeSeries, SeriesError> {
    let totals = aggregate_actual(
        records,
        |r| r.stamp.period(granularity),
        |r| dimension.matches(r),
    );
    let points = periods
        .iter()
        .map(|&p| (p, totals.get(&p).copied().unwrap_or(0.0)))
        .collect();
    TimeSeries::from_points(granularity, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ingest::{normalize_orders, DataQuality, RawOrderRecord};
    use serde_json::json;

    fn orders(rows: Vec<serde_json::Value>) -> Vec<OrderRecord> {
        let raw: Vec<RawOrderRecord> = rows
            .into_iter()
            .map(|v| serde_json::from_value(v).expect("valid row"))
            .collect();
        normalize_orders(raw, &Catalog::default(), &mut DataQuality::default())
    }

    fn sample() -> Vec<OrderRecord> {
        orders(vec![
            json!({"Date": "3/3/2025", "Area": "JAKARTA", "Product": "M-CASH", "Orders": 10}),
            json!({"Date": "3/4/2025", "Area": "JAVA 1", "Product": "T-CASH", "Orders": 5}),
            json!({"Date": "3/5/2025", "Area": "KALIMANTAN", "Product": "M-CASH", "Orders": "7"}),
            // week of 3/10 has no data
            json!({"Date": "3/18/2025", "Area": "SUMATERA 2", "Product": "Q-PAY", "Orders": 4}),
            json!({"Date": "3/19/2025", "Area": "PAPUA", "Product": "Q-PAY", "Orders": 100}),
            json!({"Date": "3/19/2025", "Area": "JAKARTA", "Orders": "bad"}),
        ])
    }

    #[test]
    fn test_aggregate_actual_weekly() {
        let records = sample();
        let totals = aggregate_actual(
            &records,
            |r| r.stamp.period(Granularity::Weekly),
            |r| r.region.as_deref() == Some("Java"),
        );
        let labels: Vec<(String, f64)> = totals.iter().map(|(p, v)| (p.label(), *v)).collect();
        assert_eq!(
            labels,
            vec![("2025-03-03".to_string(), 15.0), ("2025-03-17".to_string(), 0.0)]
        );
    }

    #[test]
    fn test_canonical_periods_fill_gaps() {
        let periods = canonical_periods(&sample(), Granularity::Weekly);
        let labels: Vec<String> = periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2025-03-03", "2025-03-10", "2025-03-17"]);
        assert!(canonical_periods(&[], Granularity::Weekly).is_empty());
    }

    #[test]
    fn test_build_series_alignment() {
        let records = sample();
        let catalog = Catalog::default();
        let series = build_series(&records, Granularity::Weekly, Dimension::all(&catalog))
            .expect("valid series");

        let national = &series[&Dimension::National];
        assert_eq!(national.values(), vec![22.0, 0.0, 4.0]);

        // An area with no records is all zeros and full length.
        let bali = &series[&Dimension::Area("BALI NUSRA".to_string())];
        assert_eq!(bali.values(), vec![0.0, 0.0, 0.0]);

        let area_sum: Vec<f64> = (0..national.len())
            .map(|i| {
                catalog
                    .areas()
                    .iter()
                    .map(|a| series[&Dimension::Area(a.to_string())].values()[i])
                    .sum()
            })
            .collect();
        assert_eq!(area_sum, national.values());

        let m_cash = &series[&Dimension::Product("M-Cash".to_string())];
        assert_eq!(m_cash.values(), vec![17.0, 0.0, 0.0]);
    }

    #[test]
    fn test_series_for_matches_bucket() {
        let records = sample();
        let periods = canonical_periods(&records, Granularity::Weekly);
        let dim = Dimension::Region("Sumatera".to_string());
        let single = series_for(&records, Granularity::Weekly, &periods, &dim).expect("valid");
        let all = build_series(&records, Granularity::Weekly, vec![dim.clone()]).expect("valid");
        assert_eq!(single, all[&dim]);
    }

    #[test]
    fn test_monthly_bucketing() {
        let records = orders(vec![
            json!({"Date": "2025-07-31", "Area": "JAKARTA", "Orders": 1}),
            json!({"Date": "2025-09-01", "Area": "JAKARTA", "Orders": 2}),
        ]);
        let series = build_series(&records, Granularity::Monthly, vec![Dimension::National])
            .expect("valid");
        let national = &series[&Dimension::National];
        assert_eq!(national.labels(), vec!["2025-07", "2025-08", "2025-09"]);
        assert_eq!(national.values(), vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_empty_records() {
        let series = build_series(&[], Granularity::Weekly, vec![Dimension::National])
            .expect("valid");
        assert!(series[&Dimension::National].is_empty());
    }
}
