//! End-to-end report pipeline.
//!
//! normalized records → aligned series per dimension → XmR metrics →
//! anomalies and status, plus target series and the MTD snapshot. Each
//! dimension is independent and analyzed on the rayon pool; output order is
//! the [`Dimension`] order.

use rayon::prelude::*;
use serde::Serialize;

use crate::aggregate::{
    build_series, target_series, Dimension, MtdSnapshot, TargetPolicy, TargetSeries,
};
use crate::config::AnalysisConfig;
use crate::error::SeriesError;
use crate::ingest::{
    normalize_orders, normalize_targets, DataQuality, OrderRecord, RawOrderRecord,
    RawTargetRecord, TargetRecord,
};
use crate::period::{Granularity, Period};
use crate::series::{ExclusionMask, TimeSeries};
use crate::spc::{compute_metrics, detect_anomalies, Detection, XmrMetrics};

/// Normalized order and target feeds with their data-quality counters.
#[derive(Debug, Clone, Default)]
pub struct Feeds {
    pub orders: Vec<OrderRecord>,
    pub targets: Vec<TargetRecord>,
    pub order_quality: DataQuality,
    pub target_quality: DataQuality,
}

impl Feeds {
    /// Normalizes raw feeds against the configured catalog and granularity
    /// and logs any data-quality issues.
    pub fn normalize(
        orders: Vec<RawOrderRecord>,
        targets: Vec<RawTargetRecord>,
        config: &AnalysisConfig,
    ) -> Self {
        let granularity = config.granularity;

        let mut order_quality = DataQuality::default();
        let orders = normalize_orders(orders, &config.catalog, &mut order_quality);
        order_quality.unresolved_periods = orders
            .iter()
            .filter(|r| r.stamp.is_unresolved(granularity))
            .count();
        order_quality.log("orders");

        let mut target_quality = DataQuality::default();
        let targets = normalize_targets(targets, &config.catalog, &mut target_quality);
        target_quality.unresolved_periods = targets
            .iter()
            .filter(|t| t.stamp.is_unresolved(granularity))
            .count();
        if target_quality.records > 0 {
            target_quality.log("targets");
        }

        Self {
            orders,
            targets,
            order_quality,
            target_quality,
        }
    }
}

/// Metrics and detection output for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesAnalysis {
    pub series: TimeSeries,
    /// Excluded (holiday) indices.
    pub excluded: Vec<usize>,
    pub metrics: XmrMetrics,
    /// Fewer than two included points: limits carry no information.
    pub insufficient_data: bool,
    #[serde(flatten)]
    pub detection: Detection,
}

/// Runs the metrics engine and anomaly detector over one series.
pub fn analyze_series(series: TimeSeries, mask: Option<&ExclusionMask>) -> SeriesAnalysis {
    let metrics = compute_metrics(&series, mask);
    let detection = detect_anomalies(&series, &metrics, mask);
    SeriesAnalysis {
        excluded: mask.map(|m| m.excluded().collect()).unwrap_or_default(),
        insufficient_data: metrics.is_insufficient(),
        series,
        metrics,
        detection,
    }
}

/// Report section for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    #[serde(flatten)]
    pub analysis: SeriesAnalysis,
    /// Targets aligned with the series; absent when no target feed was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSeries>,
}

/// Full analysis output handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub granularity: Granularity,
    pub periods: Vec<Period>,
    pub target_policy: TargetPolicy,
    pub dimensions: Vec<DimensionReport>,
    pub mtd: MtdSnapshot,
    pub order_quality: DataQuality,
    pub target_quality: DataQuality,
}

/// Builds the report for every catalog dimension.
pub fn build_report(feeds: &Feeds, config: &AnalysisConfig) -> Result<Report, SeriesError> {
    let granularity = config.granularity;
    let catalog = &config.catalog;

    let series: Vec<(Dimension, TimeSeries)> =
        build_series(&feeds.orders, granularity, Dimension::all(catalog))?
            .into_iter()
            .collect();
    let periods: Vec<Period> = series
        .first()
        .map(|(_, s)| s.points().iter().map(|p| p.period).collect())
        .unwrap_or_default();

    let dimensions = series
        .into_par_iter()
        .map(|(dimension, series)| -> Result<DimensionReport, SeriesError> {
            let mask = ExclusionMask::from_holidays(&series, &config.holidays);
            let mask = (!mask.is_empty()).then_some(mask);
            let target = if feeds.targets.is_empty() {
                None
            } else {
                Some(target_series(
                    &feeds.targets,
                    granularity,
                    &periods,
                    &dimension,
                    catalog,
                    config.target_policy,
                )?)
            };
            let analysis = analyze_series(series, mask.as_ref());
            tracing::debug!(
                %dimension,
                status = ?analysis.detection.status,
                anomalies = analysis.detection.anomalies.len(),
                "dimension analyzed"
            );
            Ok(DimensionReport {
                dimension,
                analysis,
                target,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let month = config.mtd_period().or_else(|| {
        feeds
            .orders
            .iter()
            .filter_map(|r| r.stamp.period(Granularity::Monthly))
            .max()
    });
    let mtd = MtdSnapshot::build(&feeds.orders, catalog, month);

    tracing::info!(
        dimensions = dimensions.len(),
        periods = periods.len(),
        signals = dimensions
            .iter()
            .filter(|d| d.analysis.detection.has_signals())
            .count(),
        "report built"
    );

    Ok(Report {
        granularity,
        periods,
        target_policy: config.target_policy,
        dimensions,
        mtd,
        order_quality: feeds.order_quality.clone(),
        target_quality: feeds.target_quality.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spc::{AnomalyKind, ProcessStatus};
    use chrono::{Days, NaiveDate};
    use serde_json::json;

    fn weekly_orders(area: &str, counts: &[u32]) -> Vec<RawOrderRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date");
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let day = start + Days::new(7 * i as u64 + 1);
                serde_json::from_value(json!({
                    "Date": day.format("%Y-%m-%d").to_string(),
                    "Area": area,
                    "Product": "M-CASH",
                    "Orders": n,
                }))
                .expect("valid row")
            })
            .collect()
    }

    #[test]
    fn test_analyze_series_degenerate() {
        let first = Period::containing(
            NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date"),
            Granularity::Weekly,
        );
        let series = TimeSeries::from_values(first, vec![]).expect("valid");
        let analysis = analyze_series(series, None);
        assert!(analysis.insufficient_data);
        assert!(analysis.detection.anomalies.is_empty());
        assert_eq!(analysis.detection.status, ProcessStatus::Stable);
    }

    #[test]
    fn test_report_flags_spike_in_one_area() {
        let mut counts = vec![100; 10];
        counts.extend([500, 100]);
        let mut raw = weekly_orders("JAKARTA", &counts);
        raw.extend(weekly_orders("SULAWESI", &[50; 12]));

        let config = AnalysisConfig::default();
        let feeds = Feeds::normalize(raw, Vec::new(), &config);
        let report = build_report(&feeds, &config).expect("valid report");

        assert_eq!(report.periods.len(), 12);
        assert_eq!(report.dimensions.len(), 1 + 3 + 10 + 4);
        assert_eq!(report.dimensions[0].dimension, Dimension::National);

        let jakarta = report
            .dimensions
            .iter()
            .find(|d| d.dimension == Dimension::Area("JAKARTA".to_string()))
            .expect("jakarta present");
        assert_eq!(jakarta.analysis.detection.status, ProcessStatus::Increase);
        assert_eq!(jakarta.analysis.detection.anomalies[0].kind, AnomalyKind::Increase);
        assert!(jakarta.target.is_none());

        let sulawesi = report
            .dimensions
            .iter()
            .find(|d| d.dimension == Dimension::Area("SULAWESI".to_string()))
            .expect("sulawesi present");
        assert_eq!(sulawesi.analysis.detection.status, ProcessStatus::Stable);

        let bali = report
            .dimensions
            .iter()
            .find(|d| d.dimension == Dimension::Area("BALI NUSRA".to_string()))
            .expect("bali present");
        assert_eq!(bali.analysis.series.len(), 12);
        assert!(bali.analysis.detection.anomalies.is_empty());
    }

    #[test]
    fn test_holidays_mask_every_dimension() {
        let mut counts = vec![100; 10];
        counts.extend([500, 100]);
        let raw = weekly_orders("JAKARTA", &counts);
        let config = AnalysisConfig {
            holidays: vec![NaiveDate::from_ymd_opt(2025, 5, 14).expect("valid date")],
            ..AnalysisConfig::default()
        };
        let feeds = Feeds::normalize(raw, Vec::new(), &config);
        let report = build_report(&feeds, &config).expect("valid report");

        for d in &report.dimensions {
            assert_eq!(d.analysis.excluded, vec![10], "{}", d.dimension);
        }
        let national = &report.dimensions[0];
        assert_eq!(national.analysis.detection.status, ProcessStatus::Stable);
        assert_eq!(
            national.analysis.detection.anomalies[0].kind,
            AnomalyKind::HolidayExclusion
        );
    }

    #[test]
    fn test_report_with_targets() {
        let raw = weekly_orders("JAVA 1", &[10, 12, 11]);
        let targets: Vec<RawTargetRecord> = vec![
            json!({"Week": "2025-03-03", "Area": "National", "Product": "Orders", "Target": 30}),
            json!({"Week": "2025-03-10", "Area": "National", "Product": "Orders", "Target": 31, "Achievement": 29}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).expect("valid row"))
        .collect();

        let config = AnalysisConfig::default();
        let feeds = Feeds::normalize(raw, targets, &config);
        let report = build_report(&feeds, &config).expect("valid report");

        let national_target = report.dimensions[0].target.as_ref().expect("target series");
        assert_eq!(national_target.series.values(), vec![30.0, 31.0, 0.0]);
        assert_eq!(national_target.misses, 1);
        assert_eq!(national_target.achievement.values(), vec![0.0, 29.0, 0.0]);

        let json = serde_json::to_value(&report.dimensions[0]).expect("serialize");
        assert_eq!(json["target"]["achievement"]["points"][1]["value"], 29.0);
        assert_eq!(report.target_quality.records, 2);
        assert_eq!(report.mtd.month.map(|m| m.label()), Some("2025-03".to_string()));
        assert!((report.mtd.national - 33.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_keyed_orders_counted_in_weekly_report() {
        let mut raw = weekly_orders("JAKARTA", &[5, 6]);
        raw.push(
            serde_json::from_value(json!({"Month": "2025-03", "Area": "JAKARTA", "Orders": 40}))
                .expect("valid row"),
        );

        let weekly = AnalysisConfig::default();
        let feeds = Feeds::normalize(raw.clone(), Vec::new(), &weekly);
        assert_eq!(feeds.order_quality.unresolved_periods, 1);
        assert_eq!(feeds.order_quality.unparseable_periods, 0);
        let report = build_report(&feeds, &weekly).expect("valid report");
        assert_eq!(report.order_quality.unresolved_periods, 1);
        assert_eq!(report.dimensions[0].analysis.series.values(), vec![5.0, 6.0]);

        let monthly = AnalysisConfig {
            granularity: Granularity::Monthly,
            ..AnalysisConfig::default()
        };
        let feeds = Feeds::normalize(raw, Vec::new(), &monthly);
        assert_eq!(feeds.order_quality.unresolved_periods, 0);
        let report = build_report(&feeds, &monthly).expect("valid report");
        assert_eq!(report.dimensions[0].analysis.series.values(), vec![51.0]);
    }

    #[test]
    fn test_report_serializes() {
        let config = AnalysisConfig::default();
        let feeds = Feeds::normalize(weekly_orders("JAKARTA", &[1, 2, 3]), Vec::new(), &config);
        let report = build_report(&feeds, &config).expect("valid report");
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["granularity"], "weekly");
        assert_eq!(value["dimensions"][0]["dimension"]["level"], "national");
        assert_eq!(value["dimensions"][0]["status"], "stable");
        assert_eq!(value["periods"][0], "2025-03-03");
    }
}
