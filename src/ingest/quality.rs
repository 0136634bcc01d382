//! Lenient numeric coercion and data-quality accounting.
//!
//! Upstream exports are occasionally incomplete: counts arrive as numbers,
//! numeric strings, `null`, or not at all. Anything that is not a finite,
//! non-negative number becomes `0.0` and is tallied in [`DataQuality`]
//! instead of failing the load.

use serde::Serialize;
use serde_json::Value;

/// Outcome of coercing one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Valid(f64),
    /// Field absent, `null`, or an empty string.
    Missing,
    /// Present but not a finite, non-negative number.
    Malformed,
}

impl Coerced {
    /// The value to aggregate: the number itself, or `0.0`.
    pub fn value(self) -> f64 {
        match self {
            Coerced::Valid(v) => v,
            Coerced::Missing | Coerced::Malformed => 0.0,
        }
    }
}

/// Coerces a raw JSON field into a count.
pub fn coerce_count(raw: Option<&Value>) -> Coerced {
    let parsed = match raw {
        None | Some(Value::Null) => return Coerced::Missing,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Coerced::Missing;
            }
            s.parse::<f64>().ok()
        }
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Coerced::Valid(v),
        _ => Coerced::Malformed,
    }
}

/// Counters for records absorbed rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    /// Records seen.
    pub records: usize,
    /// Numeric fields that were absent or null.
    pub missing_values: usize,
    /// Numeric fields that could not be read as a count.
    pub malformed_values: usize,
    /// Records without a usable date or period key.
    pub unparseable_periods: usize,
    /// Records whose stamp names no period at the analysis granularity
    /// (a month key in a weekly report). They fall out of every series.
    pub unresolved_periods: usize,
    /// Records whose area (or target area column) is not in the catalog.
    pub unknown_areas: usize,
    /// Records whose product is not in the catalog.
    pub unknown_products: usize,
}

impl DataQuality {
    /// Records a numeric coercion outcome.
    pub fn note(&mut self, coerced: Coerced) {
        match coerced {
            Coerced::Valid(_) => {}
            Coerced::Missing => self.missing_values += 1,
            Coerced::Malformed => self.malformed_values += 1,
        }
    }

    /// Number of absorbed problems of any kind.
    pub fn issues(&self) -> usize {
        self.missing_values
            + self.malformed_values
            + self.unparseable_periods
            + self.unresolved_periods
            + self.unknown_areas
            + self.unknown_products
    }

    pub fn merge(&mut self, other: &DataQuality) {
        self.records += other.records;
        self.missing_values += other.missing_values;
        self.malformed_values += other.malformed_values;
        self.unparseable_periods += other.unparseable_periods;
        self.unresolved_periods += other.unresolved_periods;
        self.unknown_areas += other.unknown_areas;
        self.unknown_products += other.unknown_products;
    }

    /// Emits a `warn` event when any problem was absorbed.
    pub fn log(&self, feed: &str) {
        if self.issues() == 0 {
            tracing::debug!(feed, records = self.records, "feed is clean");
            return;
        }
        tracing::warn!(
            feed,
            records = self.records,
            missing = self.missing_values,
            malformed = self.malformed_values,
            unparseable_periods = self.unparseable_periods,
            unresolved_periods = self.unresolved_periods,
            unknown_areas = self.unknown_areas,
            unknown_products = self.unknown_products,
            "data-quality issues coerced to zero or skipped"
        );
    }
}
