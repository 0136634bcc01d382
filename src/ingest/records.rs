//! Raw feed records and their normalized forms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::quality::{coerce_count, DataQuality};
use crate::catalog::{canonical_key, Catalog, PositionLevel, ProductLevel};
use crate::period::{parse_date, Granularity, Period};

/// When a record happened: a calendar date, a pre-computed period key, or
/// both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodStamp {
    pub date: Option<NaiveDate>,
    /// Week start date or `YYYY-MM` month key.
    pub key: Option<String>,
}

impl PeriodStamp {
    /// Resolves the stamp to a period of the given granularity, preferring
    /// the calendar date.
    pub fn period(&self, granularity: Granularity) -> Option<Period> {
        self.date
            .map(|d| Period::containing(d, granularity))
            .or_else(|| {
                self.key
                    .as_deref()
                    .and_then(|k| Period::parse_key(k, granularity))
            })
    }

    /// A stamp is present but names no period of `granularity`, e.g. a bare
    /// `YYYY-MM` key read into a weekly report.
    pub fn is_unresolved(&self, granularity: Granularity) -> bool {
        !self.is_empty() && self.period(granularity).is_none()
    }

    fn is_empty(&self) -> bool {
        self.date.is_none() && self.key.is_none()
    }
}

/// One transaction-day row as exported by the order feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderRecord {
    #[serde(rename = "Date", alias = "date", default)]
    pub date: Option<String>,
    #[serde(rename = "Week", alias = "week", default)]
    pub week: Option<String>,
    #[serde(rename = "Month", alias = "month", default)]
    pub month: Option<String>,
    #[serde(rename = "Area", alias = "area", default)]
    pub area: Option<String>,
    #[serde(rename = "Product", alias = "product", default)]
    pub product: Option<String>,
    #[serde(rename = "Orders", alias = "orders", alias = "Transactions", default)]
    pub orders: Option<Value>,
}

/// One target row as exported by the target feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTargetRecord {
    #[serde(rename = "Week", alias = "week", alias = "Date", alias = "date", default)]
    pub week: Option<String>,
    #[serde(rename = "Month", alias = "month", default)]
    pub month: Option<String>,
    #[serde(rename = "Position", alias = "position", alias = "Level", alias = "level", default)]
    pub position: Option<String>,
    #[serde(rename = "Area", alias = "area", alias = "Region", alias = "region", default)]
    pub area: Option<String>,
    #[serde(rename = "Product", alias = "product", default)]
    pub product: Option<String>,
    #[serde(rename = "Target", alias = "target", default)]
    pub target: Option<Value>,
    #[serde(rename = "Achievement", alias = "achievement", default)]
    pub achievement: Option<Value>,
}

/// A normalized order row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub stamp: PeriodStamp,
    /// Canonical area name, or the canonicalized raw text if unknown.
    pub area: String,
    /// Region of the area; `None` for areas missing from the catalog.
    pub region: Option<String>,
    /// Product display name; `None` for unknown or absent products.
    pub product: Option<String>,
    pub orders: f64,
}

/// A normalized target row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    pub stamp: PeriodStamp,
    pub level: PositionLevel,
    pub product: ProductLevel,
    /// Canonical key of the region or area; `None` for national rows.
    pub area: Option<String>,
    pub target: f64,
    pub achievement: f64,
}

fn stamp_from(date: Option<&str>, key: Option<&str>) -> PeriodStamp {
    PeriodStamp {
        date: date.and_then(parse_date),
        key: key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string),
    }
}

/// Normalizes order rows against `catalog`.
///
/// Rows are never dropped: unknown areas keep `region = None` and are left
/// out of every dimension by the aggregator.
pub fn normalize_orders(
    raw: Vec<RawOrderRecord>,
    catalog: &Catalog,
    quality: &mut DataQuality,
) -> Vec<OrderRecord> {
    raw.into_iter()
        .map(|r| {
            quality.records += 1;

            let stamp = stamp_from(r.date.as_deref(), r.week.as_deref().or(r.month.as_deref()));
            if stamp.is_empty() {
                quality.unparseable_periods += 1;
            }

            let raw_area = r.area.as_deref().unwrap_or_default();
            let area = catalog
                .area(raw_area)
                .map_or_else(|| canonical_key(raw_area), str::to_string);
            let region = catalog.region_of(&area).map(str::to_string);
            if region.is_none() {
                quality.unknown_areas += 1;
            }

            let product = r
                .product
                .as_deref()
                .and_then(|p| catalog.product(p))
                .map(str::to_string);
            if r.product.is_some() && product.is_none() {
                quality.unknown_products += 1;
            }

            let orders = coerce_count(r.orders.as_ref());
            quality.note(orders);

            OrderRecord {
                stamp,
                area,
                region,
                product,
                orders: orders.value(),
            }
        })
        .collect()
}

/// Normalizes target rows against `catalog`.
///
/// Rows whose level or product cannot be resolved are skipped and counted,
/// since they cannot match any lookup.
pub fn normalize_targets(
    raw: Vec<RawTargetRecord>,
    catalog: &Catalog,
    quality: &mut DataQuality,
) -> Vec<TargetRecord> {
    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        quality.records += 1;

        let stamp = stamp_from(r.week.as_deref(), r.month.as_deref().or(r.week.as_deref()));
        if stamp.is_empty() {
            quality.unparseable_periods += 1;
        }

        let area_column = r.area.as_deref().unwrap_or("National");
        let level = r
            .position
            .as_deref()
            .and_then(PositionLevel::parse)
            .or_else(|| catalog.infer_level(area_column));
        let Some(level) = level else {
            quality.unknown_areas += 1;
            continue;
        };

        let Some(product) = catalog.product_level(r.product.as_deref().unwrap_or("Orders")) else {
            quality.unknown_products += 1;
            continue;
        };

        let target = coerce_count(r.target.as_ref());
        quality.note(target);
        let achievement = coerce_count(r.achievement.as_ref());
        if r.achievement.is_some() {
            quality.note(achievement);
        }

        out.push(TargetRecord {
            stamp,
            level,
            product,
            area: match level {
                PositionLevel::National => None,
                _ => Some(canonical_key(area_column)),
            },
            target: target.value(),
            achievement: achievement.value(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_order(value: Value) -> RawOrderRecord {
        serde_json::from_value(value).expect("valid raw order")
    }

    fn raw_target(value: Value) -> RawTargetRecord {
        serde_json::from_value(value).expect("valid raw target")
    }

    #[test]
    fn test_normalize_order_row() {
        let catalog = Catalog::default();
        let mut q = DataQuality::default();
        let rows = normalize_orders(
            vec![raw_order(json!({
                "Date": "3/5/2025", "Area": "Java 1", "Product": "M-CASH", "Orders": "15"
            }))],
            &catalog,
            &mut q,
        );
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.stamp.date, NaiveDate::from_ymd_opt(2025, 3, 5));
        assert_eq!(r.area, "JAVA 1");
        assert_eq!(r.region.as_deref(), Some("Java"));
        assert_eq!(r.product.as_deref(), Some("M-Cash"));
        assert!((r.orders - 15.0).abs() < f64::EPSILON);
        assert_eq!(q.issues(), 0);
    }

    #[test]
    fn test_malformed_order_row_is_kept_as_zero() {
        let catalog = Catalog::default();
        let mut q = DataQuality::default();
        let rows = normalize_orders(
            vec![
                raw_order(json!({"date": "2025-03-05", "area": "PAPUA", "orders": 4})),
                raw_order(json!({"Date": "2025-03-05", "Area": "JAKARTA", "Product": "X", "Orders": "n/a"})),
                raw_order(json!({"Area": "JAKARTA"})),
            ],
            &catalog,
            &mut q,
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].region, None);
        assert_eq!(rows[1].orders, 0.0);
        assert_eq!(rows[1].product, None);
        assert_eq!(q.records, 3);
        assert_eq!(q.unknown_areas, 1);
        assert_eq!(q.unknown_products, 1);
        assert_eq!(q.malformed_values, 1);
        assert_eq!(q.missing_values, 1);
        assert_eq!(q.unparseable_periods, 1);
    }

    #[test]
    fn test_order_with_precomputed_month_key() {
        let catalog = Catalog::default();
        let mut q = DataQuality::default();
        let rows = normalize_orders(
            vec![raw_order(json!({"Month": "2025-08", "Area": "SULAWESI", "Orders": 3}))],
            &catalog,
            &mut q,
        );
        let period = rows[0].stamp.period(Granularity::Monthly).expect("period");
        assert_eq!(period.label(), "2025-08");
        assert_eq!(rows[0].stamp.period(Granularity::Weekly), None);
        assert!(rows[0].stamp.is_unresolved(Granularity::Weekly));
        assert!(!rows[0].stamp.is_unresolved(Granularity::Monthly));
        assert!(!PeriodStamp::default().is_unresolved(Granularity::Weekly));
    }

    #[test]
    fn test_normalize_target_levels() {
        let catalog = Catalog::default();
        let mut q = DataQuality::default();
        let rows = normalize_targets(
            vec![
                raw_target(json!({"Week": "2025-03-03", "Area": "National", "Product": "Orders", "Target": 1000, "Achievement": 950})),
                raw_target(json!({"Week": "2025-03-03", "Area": "East Indo", "Product": "Q-PAY", "Target": "120"})),
                raw_target(json!({"Week": "2025-03-03", "Position": "Area", "Area": "java 1", "Product": "Orders", "Target": 80})),
                raw_target(json!({"Week": "2025-03-03", "Position": "Regional", "Area": "Java", "Product": "Orders", "Target": 300})),
            ],
            &catalog,
            &mut q,
        );
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].level, PositionLevel::National);
        assert_eq!(rows[0].area, None);
        assert_eq!(rows[0].product, ProductLevel::Total);
        assert!((rows[0].achievement - 950.0).abs() < f64::EPSILON);
        assert_eq!(rows[1].level, PositionLevel::Region);
        assert_eq!(rows[1].area.as_deref(), Some("EAST INDO"));
        assert_eq!(rows[1].product, ProductLevel::Product("Q-Pay".to_string()));
        assert_eq!(rows[2].level, PositionLevel::Area);
        assert_eq!(rows[2].area.as_deref(), Some("JAVA 1"));
        assert_eq!(rows[3].level, PositionLevel::Region);
        assert_eq!(q.issues(), 0);
    }

    #[test]
    fn test_unresolvable_target_rows_are_skipped() {
        let catalog = Catalog::default();
        let mut q = DataQuality::default();
        let rows = normalize_targets(
            vec![
                raw_target(json!({"Week": "2025-03-03", "Area": "Atlantis", "Product": "Orders", "Target": 1})),
                raw_target(json!({"Week": "2025-03-03", "Area": "Java", "Product": "Gold", "Target": 1})),
            ],
            &catalog,
            &mut q,
        );
        assert!(rows.is_empty());
        assert_eq!(q.unknown_areas, 1);
        assert_eq!(q.unknown_products, 1);
    }
}
