//! Monthly case trends over a trailing window.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DiseaseCase;

/// One (year, month[, province]) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub province: Option<String>,
    pub count: u64,
    pub outbreaks: u64,
}

impl TrendPoint {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Scoped dashboard point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

impl From<&TrendPoint> for MonthlyCount {
    fn from(point: &TrendPoint) -> Self {
        Self {
            month: point.label(),
            count: point.count,
        }
    }
}

/// National overview point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceTrend {
    pub date: String,
    pub province: String,
    pub diseases: u64,
    pub outbreaks: u64,
}

impl From<&TrendPoint> for ProvinceTrend {
    fn from(point: &TrendPoint) -> Self {
        Self {
            date: point.label(),
            province: point.province.clone().unwrap_or_default(),
            diseases: point.count,
            outbreaks: point.outbreaks,
        }
    }
}

/// Same instant `months` calendar months before `now`.
///
/// Day-of-month is clamped by chrono when the target month is shorter.
pub fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Bucket cases reported at or after the window start.
///
/// Output is ascending by (year, month, province) and holds only non-empty
/// buckets.
pub fn build_trend(
    cases: &[DiseaseCase],
    now: DateTime<Utc>,
    months: u32,
    by_province: bool,
) -> Vec<TrendPoint> {
    let start = window_start(now, months);
    let mut buckets: BTreeMap<(i32, u32, Option<String>), (u64, u64)> = BTreeMap::new();

    for case in cases.iter().filter(|c| c.reported_date >= start) {
        let province = by_province.then(|| case.location.province_label());
        let key = (case.reported_date.year(), case.reported_date.month(), province);
        let entry = buckets.entry(key).or_default();
        entry.0 += 1;
        entry.1 += u64::from(case.is_outbreak);
    }

    buckets
        .into_iter()
        .map(|((year, month, province), (count, outbreaks))| TrendPoint {
            year,
            month,
            province,
            count,
            outbreaks,
        })
        .collect()
}
