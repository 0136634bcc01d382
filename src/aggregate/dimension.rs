//! Reporting dimensions.

use std::fmt;

use serde::Serialize;

use crate::catalog::{canonical_key, Catalog};
use crate::ingest::OrderRecord;

/// A slice of the order data that gets its own series.
///
/// Only records whose area is in the catalog belong to any dimension, so
/// the areas (or regions) of a catalog partition the national total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "level", content = "name", rename_all = "snake_case")]
pub enum Dimension {
    National,
    /// Region display name, e.g. `"East Indo"`.
    Region(String),
    /// Canonical area name, e.g. `"JAVA 1"`.
    Area(String),
    /// Product display name, e.g. `"M-Cash"`.
    Product(String),
}

impl Dimension {
    /// Every dimension the catalog defines: national, then regions, areas
    /// and products, each sorted.
    pub fn all(catalog: &Catalog) -> Vec<Dimension> {
        let mut dims = vec![Dimension::National];
        dims.extend(catalog.regions().into_iter().map(|r| Dimension::Region(r.to_string())));
        dims.extend(catalog.areas().into_iter().map(|a| Dimension::Area(a.to_string())));
        dims.extend(catalog.products().into_iter().map(|p| Dimension::Product(p.to_string())));
        dims
    }

    /// Whether `record` contributes to this dimension.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        let Some(region) = record.region.as_deref() else {
            return false;
        };
        match self {
            Dimension::National => true,
            Dimension::Region(name) => canonical_key(region) == canonical_key(name),
            Dimension::Area(name) => record.area == canonical_key(name),
            Dimension::Product(name) => record.product.as_deref() == Some(name.as_str()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::National => write!(f, "National"),
            Dimension::Region(name) => write!(f, "Region {name}"),
            Dimension::Area(name) => write!(f, "Area {name}"),
            Dimension::Product(name) => write!(f, "Product {name}"),
        }
    }
}
