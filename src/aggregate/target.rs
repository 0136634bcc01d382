//! Target lookup.
//!
//! Target feeds carry one row per `(period, level, product, area)`. A
//! region's target can come either from its own row or from the sum of its
//! areas' rows; both appear in real feeds, so the choice is an explicit
//! [`TargetPolicy`] recorded alongside every region target series.
//!
//! A feed may be finer than the requested granularity (weekly rows read
//! into a monthly report). Rows with distinct stamps inside one period are
//! summed; rows repeating the same stamp are duplicates and only the first
//! counts.

use serde::{Deserialize, Serialize};

use super::dimension::Dimension;
use crate::catalog::{canonical_key, Catalog, PositionLevel, ProductLevel};
use crate::error::SeriesError;
use crate::ingest::{PeriodStamp, TargetRecord};
use crate::period::{Granularity, Period};
use crate::series::TimeSeries;

/// Result of a target lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TargetLookup {
    Found(f64),
    /// No row matched; the target counts as zero.
    Missing,
}

impl TargetLookup {
    pub fn value(self) -> f64 {
        match self {
            TargetLookup::Found(v) => v,
            TargetLookup::Missing => 0.0,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, TargetLookup::Found(_))
    }
}

/// How region-level targets are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Use the region's own target row.
    #[default]
    DirectRow,
    /// Sum the target rows of the region's areas.
    SumOfAreas,
}

/// Target and achievement summed over the rows of one lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TargetTotals {
    target: f64,
    achievement: f64,
}

impl TargetTotals {
    fn combined(self, other: TargetTotals) -> Self {
        Self {
            target: self.target + other.target,
            achievement: self.achievement + other.achievement,
        }
    }
}

fn lookup_totals(
    targets: &[TargetRecord],
    period: Period,
    level: PositionLevel,
    product: &ProductLevel,
    area: Option<&str>,
) -> Option<TargetTotals> {
    let area_key = area.map(canonical_key);
    if level != PositionLevel::National && area_key.is_none() {
        tracing::debug!(
            period = %period,
            ?level,
            ?product,
            area = "-",
            "target lookup miss: no area given"
        );
        return None;
    }

    let matches = targets.iter().filter(|t| {
        t.level == level
            && &t.product == product
            && t.stamp.period(period.granularity()) == Some(period)
            && (level == PositionLevel::National || t.area == area_key)
    });

    let mut totals: Option<TargetTotals> = None;
    let mut seen: Vec<&PeriodStamp> = Vec::new();
    let mut duplicates = 0usize;
    for row in matches {
        if seen.contains(&&row.stamp) {
            duplicates += 1;
            continue;
        }
        seen.push(&row.stamp);
        let row_totals = TargetTotals {
            target: row.target,
            achievement: row.achievement,
        };
        totals = Some(totals.map_or(row_totals, |t| t.combined(row_totals)));
    }

    if totals.is_none() {
        tracing::debug!(
            period = %period,
            ?level,
            ?product,
            area = area.unwrap_or("-"),
            "target lookup miss"
        );
    }
    if duplicates > 0 {
        tracing::warn!(
            period = %period,
            ?level,
            ?product,
            area = area.unwrap_or("-"),
            duplicates,
            "duplicate target rows; using the first"
        );
    }
    totals
}

fn region_totals(
    targets: &[TargetRecord],
    period: Period,
    region: &str,
    product: &ProductLevel,
    catalog: &Catalog,
    policy: TargetPolicy,
) -> Option<TargetTotals> {
    match policy {
        TargetPolicy::DirectRow => {
            lookup_totals(targets, period, PositionLevel::Region, product, Some(region))
        }
        // Missing areas contribute zero; the region is found if any area is.
        TargetPolicy::SumOfAreas => catalog
            .areas_in(region)
            .into_iter()
            .filter_map(|a| lookup_totals(targets, period, PositionLevel::Area, product, Some(a)))
            .reduce(TargetTotals::combined),
    }
}

/// Target for `(period, level, product, area)`.
///
/// `area` is ignored for national rows and required otherwise. Rows with
/// distinct stamps inside `period` are summed. When a feed repeats a stamp,
/// the first row wins and a warning is logged.
pub fn aggregate_target(
    targets: &[TargetRecord],
    period: Period,
    level: PositionLevel,
    product: &ProductLevel,
    area: Option<&str>,
) -> TargetLookup {
    lookup_totals(targets, period, level, product, area)
        .map_or(TargetLookup::Missing, |t| TargetLookup::Found(t.target))
}

/// Region target under `policy`.
///
/// With [`TargetPolicy::SumOfAreas`] the result is `Found` if at least one
/// area row exists; missing areas contribute zero.
pub fn region_target(
    targets: &[TargetRecord],
    period: Period,
    region: &str,
    product: &ProductLevel,
    catalog: &Catalog,
    policy: TargetPolicy,
) -> TargetLookup {
    region_totals(targets, period, region, product, catalog, policy)
        .map_or(TargetLookup::Missing, |t| TargetLookup::Found(t.target))
}

/// Target and achievement series of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSeries {
    pub series: TimeSeries,
    /// Achievement reported by the target feed, aligned with `series`.
    pub achievement: TimeSeries,
    /// Policy used, for region dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<TargetPolicy>,
    /// Periods with no matching target row (reported as zero).
    pub misses: usize,
}

/// Looks up the target and achievement of `dimension` for each of
/// `periods`.
///
/// National and area dimensions use the all-products total; product
/// dimensions use the national row of that product.
pub fn target_series(
    targets: &[TargetRecord],
    granularity: Granularity,
    periods: &[Period],
    dimension: &Dimension,
    catalog: &Catalog,
    policy: TargetPolicy,
) -> Result<TargetSeries, SeriesError> {
    let lookup = |period: Period| match dimension {
        Dimension::National => lookup_totals(
            targets,
            period,
            PositionLevel::National,
            &ProductLevel::Total,
            None,
        ),
        Dimension::Region(region) => {
            region_totals(targets, period, region, &ProductLevel::Total, catalog, policy)
        }
        Dimension::Area(area) => lookup_totals(
            targets,
            period,
            PositionLevel::Area,
            &ProductLevel::Total,
            Some(area),
        ),
        Dimension::Product(product) => lookup_totals(
            targets,
            period,
            PositionLevel::National,
            &ProductLevel::Product(product.clone()),
            None,
        ),
    };

    let mut misses = 0;
    let mut target_points = Vec::with_capacity(periods.len());
    let mut achievement_points = Vec::with_capacity(periods.len());
    for &period in periods {
        let totals = lookup(period).unwrap_or_else(|| {
            misses += 1;
            TargetTotals::default()
        });
        target_points.push((period, totals.target));
        achievement_points.push((period, totals.achievement));
    }

    Ok(TargetSeries {
        series: TimeSeries::from_points(granularity, target_points)?,
        achievement: TimeSeries::from_points(granularity, achievement_points)?,
        policy: matches!(dimension, Dimension::Region(_)).then_some(policy),
        misses,
    })
}
