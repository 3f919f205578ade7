//! Hierarchical rollups of animals and disease cases.
//!
//! Every rollup is `(records, key function, accumulator) -> groups`; the
//! storage layer only supplies the record slices. Province, district and
//! sector rollups are computed independently from the same record set, so a
//! parent's counts always equal the sum over its children.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::classify::classify;
use crate::models::{AnimalRecord, DiseaseCase, HealthStatus, LocationSnapshot, Severity};

/// Administrative level used as the grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Province,
    District,
    Sector,
}

/// Location tuple identifying one rollup group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl LocationKey {
    /// Key for a location at the given level. Blank parts become "unknown".
    pub fn at(level: Level, location: &LocationSnapshot) -> Self {
        let province = location.province_label();
        match level {
            Level::Province => Self {
                province,
                district: None,
                sector: None,
            },
            Level::District => Self {
                province,
                district: Some(location.district_label()),
                sector: None,
            },
            Level::Sector => Self {
                province,
                district: Some(location.district_label()),
                sector: Some(location.sector_label()),
            },
        }
    }

    pub fn level(&self) -> Level {
        match (&self.district, &self.sector) {
            (None, _) => Level::Province,
            (Some(_), None) => Level::District,
            (Some(_), Some(_)) => Level::Sector,
        }
    }

    /// Most specific name in the tuple.
    pub fn name(&self) -> &str {
        self.sector
            .as_deref()
            .or(self.district.as_deref())
            .unwrap_or(&self.province)
    }

    /// The enclosing group one level up.
    pub fn parent(&self) -> Option<LocationKey> {
        match self.level() {
            Level::Province => None,
            Level::District => Some(Self {
                province: self.province.clone(),
                district: None,
                sector: None,
            }),
            Level::Sector => Some(Self {
                province: self.province.clone(),
                district: self.district.clone(),
                sector: None,
            }),
        }
    }
}

/// Animal counts by health status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalTotals {
    pub total: u64,
    pub healthy: u64,
    pub sick: u64,
    pub under_treatment: u64,
    pub recovered: u64,
    pub deceased: u64,
    /// Percent healthy, rounded; 0 when there are no animals
    pub health_rate: u32,
}

impl AnimalTotals {
    /// Count one animal. Call [`AnimalTotals::finish`] once all are counted.
    pub fn record(&mut self, status: HealthStatus) {
        self.total += 1;
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Sick => self.sick += 1,
            HealthStatus::UnderTreatment => self.under_treatment += 1,
            HealthStatus::Recovered => self.recovered += 1,
            HealthStatus::Deceased => self.deceased += 1,
        }
    }

    /// Fill in the derived rate.
    pub fn finish(mut self) -> Self {
        self.health_rate = health_rate(self.healthy, self.total);
        self
    }
}

/// Disease counts by severity, plus outbreaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseTotals {
    pub total: u64,
    pub active_outbreaks: u64,
    pub critical: u64,
    pub severe: u64,
    pub moderate: u64,
    pub mild: u64,
}

impl DiseaseTotals {
    pub fn record(&mut self, case: &DiseaseCase) {
        let class = classify(case);
        self.total += 1;
        self.active_outbreaks += class.outbreak_contribution;
        match class.severity_bucket {
            Severity::Critical => self.critical += 1,
            Severity::Severe => self.severe += 1,
            Severity::Moderate => self.moderate += 1,
            Severity::Mild => self.mild += 1,
        }
    }
}

/// Combined animal and disease counts for one location group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupResult {
    #[serde(flatten)]
    pub key: LocationKey,
    pub animals: AnimalTotals,
    pub diseases: DiseaseTotals,
}

/// A name with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// `round(healthy / total * 100)`, or 0 for an empty group.
pub fn health_rate(healthy: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((healthy as f64 / total as f64) * 100.0).round() as u32
}

/// Group records by key and fold each group with `accumulate`.
pub fn group_by<T, K, D, KF, AF>(records: &[T], key_fn: KF, accumulate: AF) -> BTreeMap<K, D>
where
    K: Ord,
    D: Default,
    KF: Fn(&T) -> K,
    AF: Fn(&mut D, &T),
{
    let mut groups: BTreeMap<K, D> = BTreeMap::new();
    for record in records {
        accumulate(groups.entry(key_fn(record)).or_default(), record);
    }
    groups
}

/// Animal totals per group.
pub fn rollup_animals<KF>(animals: &[AnimalRecord], key_fn: KF) -> BTreeMap<LocationKey, AnimalTotals>
where
    KF: Fn(&AnimalRecord) -> LocationKey,
{
    group_by(animals, key_fn, |totals: &mut AnimalTotals, a| {
        totals.record(a.health_status)
    })
    .into_iter()
    .map(|(key, totals)| (key, totals.finish()))
    .collect()
}

/// Disease totals per group.
pub fn rollup_cases<KF>(cases: &[DiseaseCase], key_fn: KF) -> BTreeMap<LocationKey, DiseaseTotals>
where
    KF: Fn(&DiseaseCase) -> LocationKey,
{
    group_by(cases, key_fn, |totals: &mut DiseaseTotals, c| totals.record(c))
}

/// Full outer merge: a group seen on only one side gets zeroed counts on the other.
pub fn merge_rollups(
    animals: BTreeMap<LocationKey, AnimalTotals>,
    mut diseases: BTreeMap<LocationKey, DiseaseTotals>,
) -> Vec<RollupResult> {
    let mut merged: Vec<RollupResult> = animals
        .into_iter()
        .map(|(key, animals)| {
            let diseases = diseases.remove(&key).unwrap_or_default();
            RollupResult {
                key,
                animals,
                diseases,
            }
        })
        .collect();
    merged.extend(diseases.into_iter().map(|(key, diseases)| RollupResult {
        key,
        animals: AnimalTotals::default(),
        diseases,
    }));
    merged
}

/// Roll both record sets up to one level and order the groups for display.
///
/// Animals group by their current location, cases by their report-time
/// snapshot.
pub fn rollup_level(animals: &[AnimalRecord], cases: &[DiseaseCase], level: Level) -> Vec<RollupResult> {
    let unknown = animals.iter().filter(|a| a.location.is_incomplete()).count()
        + cases.iter().filter(|c| c.location.is_incomplete()).count();
    if unknown > 0 {
        tracing::warn!(?level, unknown, "records without a full location grouped as unknown");
    }

    let animal_groups = rollup_animals(animals, |a| LocationKey::at(level, &a.location));
    let case_groups = rollup_cases(cases, |c| LocationKey::at(level, &c.location));
    let mut results = merge_rollups(animal_groups, case_groups);
    sort_for_level(&mut results, level);
    tracing::debug!(?level, groups = results.len(), "rollup computed");
    results
}

/// Provinces rank by animal count (largest first); districts and sectors list
/// by location tuple.
pub fn sort_for_level(results: &mut [RollupResult], level: Level) {
    match level {
        Level::Province => results.sort_by(|a, b| {
            b.animals
                .total
                .cmp(&a.animals.total)
                .then_with(|| a.key.cmp(&b.key))
        }),
        Level::District | Level::Sector => results.sort_by(|a, b| a.key.cmp(&b.key)),
    }
}

/// Totals over a whole slice.
pub fn tally_animals(animals: &[AnimalRecord]) -> AnimalTotals {
    let mut totals = AnimalTotals::default();
    for animal in animals {
        totals.record(animal.health_status);
    }
    totals.finish()
}

/// Totals over a whole slice.
pub fn tally_cases(cases: &[DiseaseCase]) -> DiseaseTotals {
    let mut totals = DiseaseTotals::default();
    for case in cases {
        totals.record(case);
    }
    totals
}

/// Occurrence counts, most frequent first, ties by name.
pub fn count_by<T, F>(records: &[T], name_fn: F) -> Vec<NamedCount>
where
    F: Fn(&T) -> String,
{
    let groups = group_by(records, name_fn, |n: &mut u64, _| *n += 1);
    let mut counts: Vec<NamedCount> = groups
        .into_iter()
        .map(|(name, count)| NamedCount { name, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

/// Like [`count_by`] but keyed by an extra grouping dimension, each list
/// truncated to `limit` entries.
pub fn top_counts_by<T, G, F>(records: &[T], group_fn: G, name_fn: F, limit: usize) -> BTreeMap<String, Vec<NamedCount>>
where
    G: Fn(&T) -> String,
    F: Fn(&T) -> String,
{
    let mut per_group: BTreeMap<String, Vec<&T>> = BTreeMap::new();
    for record in records {
        per_group.entry(group_fn(record)).or_default().push(record);
    }
    per_group
        .into_iter()
        .map(|(group, members)| {
            let mut counts = count_by(&members, |r| name_fn(r));
            counts.truncate(limit);
            (group, counts)
        })
        .collect()
}
