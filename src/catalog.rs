//! Dimension lookup tables and name normalization.
//!
//! Order feeds and target feeds spell the same area differently
//! (`"Java 1"`, `"JAVA 1"`, `" java  1 "`). All lookups go through
//! [`canonical_key`] so that casing and spacing never decide a match.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Canonical form of an area, region, or product key: trimmed, internal
/// whitespace collapsed to one space, upper-cased.
///
/// ```
/// use order_spc::catalog::canonical_key;
///
/// assert_eq!(canonical_key("  Java   1 "), "JAVA 1");
/// assert_eq!(canonical_key("bali nusra"), "BALI NUSRA");
/// ```
pub fn canonical_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Organizational level of a target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionLevel {
    National,
    Region,
    Area,
}

/// The one mapping from feed spellings to [`PositionLevel`].
const POSITION_LEVELS: &[(&str, PositionLevel)] = &[
    ("NATIONAL", PositionLevel::National),
    ("NASIONAL", PositionLevel::National),
    ("REGION", PositionLevel::Region),
    ("REGIONAL", PositionLevel::Region),
    ("AREA", PositionLevel::Area),
];

impl PositionLevel {
    /// Parses a position level as written in a target feed.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = canonical_key(raw);
        POSITION_LEVELS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|&(_, level)| level)
    }
}

/// Product column of a target row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductLevel {
    /// All products combined (`"Orders"` in target feeds).
    Total,
    /// A single product, by display name.
    Product(String),
}

/// Pseudo-product used by target feeds for the all-products total.
const TOTAL_PRODUCT_KEY: &str = "ORDERS";

/// Raw tables as written in configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct CatalogTables {
    /// Area name → region name.
    areas: BTreeMap<String, String>,
    /// Feed product key → display name.
    products: BTreeMap<String, String>,
}

impl Default for CatalogTables {
    fn default() -> Self {
        let areas = [
            ("BALI NUSRA", "East Indo"),
            ("KALIMANTAN", "East Indo"),
            ("SULAWESI", "East Indo"),
            ("JAKARTA", "Java"),
            ("JAVA 1", "Java"),
            ("JAVA 2", "Java"),
            ("JAVA 3", "Java"),
            ("SUMATERA 1", "Sumatera"),
            ("SUMATERA 2", "Sumatera"),
            ("SUMATERA 3", "Sumatera"),
        ];
        let products = [
            ("L-PAY", "L-Pay"),
            ("M-CASH", "M-Cash"),
            ("Q-PAY", "Q-Pay"),
            ("T-CASH", "T-Cash"),
        ];
        Self {
            areas: areas
                .iter()
                .map(|&(a, r)| (a.to_string(), r.to_string()))
                .collect(),
            products: products
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Area → region and product lookup tables.
///
/// The default catalog holds ten areas in three regions and four products.
/// Keys are stored canonicalized; display names are kept as configured.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CatalogTables")]
pub struct Catalog {
    /// canonical area → (display area, region display name)
    areas: BTreeMap<String, (String, String)>,
    /// canonical product key → display name
    products: BTreeMap<String, String>,
}

impl From<CatalogTables> for Catalog {
    fn from(tables: CatalogTables) -> Self {
        let areas = tables
            .areas
            .into_iter()
            .map(|(area, region)| {
                let key = canonical_key(&area);
                (key.clone(), (key, region.trim().to_string()))
            })
            .collect();
        let mut products: BTreeMap<String, String> = BTreeMap::new();
        for (key, name) in tables.products {
            let name = name.trim().to_string();
            // Display names resolve to themselves as well.
            products.insert(canonical_key(&name), name.clone());
            products.insert(canonical_key(&key), name);
        }
        Self { areas, products }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        CatalogTables::default().into()
    }
}

impl Catalog {
    /// Canonical area name, if the area is known.
    pub fn area(&self, raw: &str) -> Option<&str> {
        self.areas.get(&canonical_key(raw)).map(|(a, _)| a.as_str())
    }

    /// Region of a known area.
    pub fn region_of(&self, area: &str) -> Option<&str> {
        self.areas
            .get(&canonical_key(area))
            .map(|(_, r)| r.as_str())
    }

    /// Display name of a region, matched case-insensitively.
    pub fn region(&self, raw: &str) -> Option<&str> {
        let key = canonical_key(raw);
        self.areas
            .values()
            .map(|(_, r)| r.as_str())
            .find(|r| canonical_key(r) == key)
    }

    /// Display name of a product, from either a feed key or a display name.
    pub fn product(&self, raw: &str) -> Option<&str> {
        self.products.get(&canonical_key(raw)).map(String::as_str)
    }

    /// Product column of a target row. `"Orders"` denotes the total.
    pub fn product_level(&self, raw: &str) -> Option<ProductLevel> {
        if canonical_key(raw) == TOTAL_PRODUCT_KEY {
            return Some(ProductLevel::Total);
        }
        self.product(raw).map(|p| ProductLevel::Product(p.to_string()))
    }

    /// Known regions, sorted.
    pub fn regions(&self) -> Vec<&str> {
        self.areas
            .values()
            .map(|(_, r)| r.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Known areas (canonical names), sorted.
    pub fn areas(&self) -> Vec<&str> {
        self.areas.keys().map(String::as_str).collect()
    }

    /// Areas belonging to `region`, sorted.
    pub fn areas_in(&self, region: &str) -> Vec<&str> {
        let key = canonical_key(region);
        self.areas
            .iter()
            .filter(|(_, (_, r))| canonical_key(r) == key)
            .map(|(a, _)| a.as_str())
            .collect()
    }

    /// Known product display names, sorted.
    pub fn products(&self) -> Vec<&str> {
        self.products
            .values()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Infers the position level of a target row from its area column.
    pub fn infer_level(&self, area_column: &str) -> Option<PositionLevel> {
        if PositionLevel::parse(area_column) == Some(PositionLevel::National) {
            Some(PositionLevel::National)
        } else if self.region(area_column).is_some() {
            Some(PositionLevel::Region)
        } else if self.area(area_column).is_some() {
            Some(PositionLevel::Area)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("Java 1"), "JAVA 1");
        assert_eq!(canonical_key("\tjava\n 1  "), "JAVA 1");
        assert_eq!(canonical_key("East Indo"), "EAST INDO");
        assert_eq!(canonical_key(""), "");
    }

    #[test]
    fn test_position_level_table() {
        assert_eq!(PositionLevel::parse("National"), Some(PositionLevel::National));
        assert_eq!(PositionLevel::parse("nasional"), Some(PositionLevel::National));
        assert_eq!(PositionLevel::parse("Regional"), Some(PositionLevel::Region));
        assert_eq!(PositionLevel::parse(" region "), Some(PositionLevel::Region));
        assert_eq!(PositionLevel::parse("AREA"), Some(PositionLevel::Area));
        assert_eq!(PositionLevel::parse("branch"), None);
    }

    #[test]
    fn test_default_area_mapping() {
        let c = Catalog::default();
        assert_eq!(c.region_of("jakarta"), Some("Java"));
        assert_eq!(c.region_of("Bali  Nusra"), Some("East Indo"));
        assert_eq!(c.region_of("Sumatera 3"), Some("Sumatera"));
        assert_eq!(c.region_of("PAPUA"), None);
        assert_eq!(c.area("java 2"), Some("JAVA 2"));
        assert_eq!(c.regions(), vec!["East Indo", "Java", "Sumatera"]);
        assert_eq!(c.areas().len(), 10);
        assert_eq!(c.areas_in("JAVA"), vec!["JAKARTA", "JAVA 1", "JAVA 2", "JAVA 3"]);
    }

    #[test]
    fn test_product_mapping() {
        let c = Catalog::default();
        assert_eq!(c.product("M-CASH"), Some("M-Cash"));
        assert_eq!(c.product("m-cash"), Some("M-Cash"));
        assert_eq!(c.product("M-Cash"), Some("M-Cash"));
        assert_eq!(c.product("X-PAY"), None);
        assert_eq!(c.products(), vec!["L-Pay", "M-Cash", "Q-Pay", "T-Cash"]);
        assert_eq!(c.product_level("Orders"), Some(ProductLevel::Total));
        assert_eq!(
            c.product_level("T-CASH"),
            Some(ProductLevel::Product("T-Cash".to_string()))
        );
    }

    #[test]
    fn test_infer_level() {
        let c = Catalog::default();
        assert_eq!(c.infer_level("National"), Some(PositionLevel::National));
        assert_eq!(c.infer_level("East Indo"), Some(PositionLevel::Region));
        assert_eq!(c.infer_level("KALIMANTAN"), Some(PositionLevel::Area));
        assert_eq!(c.infer_level("Moon"), None);
    }

    #[test]
    fn test_catalog_from_config_tables() {
        let c: Catalog = toml::from_str(
            r#"
            [areas]
            "papua" = "East Indo"
            [products]
            "z-pay" = "Z-Pay"
            "#,
        )
        .expect("valid catalog");
        assert_eq!(c.region_of("PAPUA"), Some("East Indo"));
        assert_eq!(c.product("Z-PAY"), Some("Z-Pay"));
        assert_eq!(c.areas(), vec!["PAPUA"]);
    }
}
