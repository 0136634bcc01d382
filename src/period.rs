//! Calendar reporting periods.
//!
//! A [`Period`] is identified by its start date: the Monday of an ISO week
//! for weekly reporting, or the first day of the month for monthly
//! reporting. Periods order by calendar date, never by label text, since
//! upstream feeds mix `M/D/YYYY` and `YYYY-MM-DD` formats.

use std::fmt;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

/// Reporting granularity of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// ISO weeks, starting Monday.
    Weekly,
    /// Calendar months.
    Monthly,
}

/// One reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: NaiveDate,
    granularity: Granularity,
}

impl Period {
    /// The period of the given granularity that contains `date`.
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Self {
        let start = match granularity {
            Granularity::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date - Days::new(offset)
            }
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
        };
        Self { start, granularity }
    }

    /// Parses a period key from a raw feed.
    ///
    /// Accepts full dates in any format understood by [`parse_date`], and
    /// pre-computed `YYYY-MM` month keys for monthly granularity.
    pub fn parse_key(key: &str, granularity: Granularity) -> Option<Self> {
        let key = key.trim();
        if let Some(month_start) = parse_month_key(key) {
            return match granularity {
                Granularity::Monthly => Some(Self::containing(month_start, granularity)),
                // A bare month does not identify a single week.
                Granularity::Weekly => None,
            };
        }
        parse_date(key).map(|date| Self::containing(date, granularity))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The period immediately after this one, or `None` at the end of the
    /// representable calendar.
    pub fn succ(&self) -> Option<Self> {
        let start = match self.granularity {
            Granularity::Weekly => self.start.checked_add_days(Days::new(7))?,
            Granularity::Monthly => self.start.checked_add_months(Months::new(1))?,
        };
        Some(Self {
            start,
            granularity: self.granularity,
        })
    }

    /// Display label: `YYYY-MM-DD` for weeks, `YYYY-MM` for months.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Every period from `first` through `last`, inclusive.
    ///
    /// Returns an empty vector when `last` precedes `first` or the two
    /// periods differ in granularity.
    pub fn span(first: Period, last: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        if first.granularity != last.granularity {
            return periods;
        }
        let mut current = Some(first);
        while let Some(period) = current {
            if period > last {
                break;
            }
            periods.push(period);
            current = period.succ();
        }
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Weekly => write!(f, "{}", self.start.format("%Y-%m-%d")),
            Granularity::Monthly => write!(f, "{}", self.start.format("%Y-%m")),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a calendar date from the formats seen in order and target feeds.
///
/// Supported: `YYYY-MM-DD`, `M/D/YYYY`, and timestamps whose date part is
/// one of those (`2025-03-03T00:00:00Z`, `3/3/2025 0:00`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    let head = raw
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%m/%d/%Y"))
        .ok()
}

fn parse_month_key(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 7 || raw.as_bytes().get(4) != Some(&b'-') {
        return None;
    }
    let year: i32 = raw.get(..4)?.parse().ok()?;
    let month: u32 = raw.get(5..)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}
