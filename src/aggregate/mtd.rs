//! Month-to-date totals.
//!
//! A flat snapshot of one month's orders: national, per region, per
//! product, and region × product. Used for scorecards rather than for
//! control charts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::ingest::OrderRecord;
use crate::period::{Granularity, Period};

/// Month-to-date order totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtdSnapshot {
    /// The month covered, or `None` when built over every record.
    pub month: Option<Period>,
    pub national: f64,
    pub regions: BTreeMap<String, f64>,
    pub products: BTreeMap<String, f64>,
    /// region → product → orders
    pub region_products: BTreeMap<String, BTreeMap<String, f64>>,
    /// Orders from areas missing in the catalog, left out of every total.
    pub unattributed: f64,
}

impl MtdSnapshot {
    /// Totals `records` falling in `month` (all records if `None`).
    ///
    /// Every catalog region and product appears in the snapshot, with zero
    /// when it had no orders.
    pub fn build(records: &[OrderRecord], catalog: &Catalog, month: Option<Period>) -> Self {
        let mut regions: BTreeMap<String, f64> = catalog
            .regions()
            .into_iter()
            .map(|r| (r.to_string(), 0.0))
            .collect();
        let mut products: BTreeMap<String, f64> = catalog
            .products()
            .into_iter()
            .map(|p| (p.to_string(), 0.0))
            .collect();
        let mut region_products: BTreeMap<String, BTreeMap<String, f64>> = regions
            .keys()
            .map(|r| (r.clone(), products.clone()))
            .collect();
        let mut national = 0.0;
        let mut unattributed = 0.0;

        let in_month = |r: &OrderRecord| {
            month.map_or(true, |m| r.stamp.period(Granularity::Monthly) == Some(m))
        };

        for record in records.iter().filter(|r| in_month(*r)) {
            let Some(region) = record.region.as_deref() else {
                unattributed += record.orders;
                continue;
            };
            national += record.orders;
            *regions.entry(region.to_string()).or_insert(0.0) += record.orders;

            if let Some(product) = record.product.as_deref() {
                *products.entry(product.to_string()).or_insert(0.0) += record.orders;
                *region_products
                    .entry(region.to_string())
                    .or_default()
                    .entry(product.to_string())
                    .or_insert(0.0) += record.orders;
            }
        }

        Self {
            month,
            national,
            regions,
            products,
            region_products,
            unattributed,
        }
    }

    /// The region with the most orders. Ties resolve to the alphabetically
    /// first region.
    pub fn top_region(&self) -> Option<(&str, f64)> {
        self.regions
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, &orders)| (name.as_str(), orders))
    }
}
