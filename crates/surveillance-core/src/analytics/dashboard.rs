//! Scoped dashboard: the summary a field user sees for their own area.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::rollup::{count_by, tally_animals, tally_cases, NamedCount};
use super::trend::{build_trend, MonthlyCount};
use crate::config::EngineConfig;
use crate::db::{AnimalFilter, CaseFilter, Database, DbResult};
use crate::models::{AnimalRecord, DiseaseCase, Scope, Severity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_animals: u64,
    pub healthy_animals: u64,
    pub sick_animals: u64,
    pub under_treatment: u64,
    pub total_diseases: u64,
    pub active_outbreaks: u64,
    /// Cases reported within the recent window
    pub recent_diseases: u64,
}

/// A chart slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: u64,
}

impl From<NamedCount> for ChartPoint {
    fn from(count: NamedCount) -> Self {
        Self {
            name: count.name,
            value: count.count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub animals_by_species: Vec<ChartPoint>,
    pub diseases_by_type: Vec<ChartPoint>,
    /// Mild to critical, present severities only
    pub diseases_by_severity: Vec<ChartPoint>,
    pub top_diseases: Vec<ChartPoint>,
    pub disease_trends: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub animals: Vec<AnimalRecord>,
    pub diseases: Vec<DiseaseCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedDashboard {
    pub stats: DashboardStats,
    pub charts: DashboardCharts,
    pub recent_activity: RecentActivity,
}

impl ScopedDashboard {
    /// Compute from records already restricted to one scope.
    ///
    /// Both slices must be ordered newest first, as the store returns them.
    pub fn compute(
        animals: &[AnimalRecord],
        cases: &[DiseaseCase],
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let animal_totals = tally_animals(animals);
        let case_totals = tally_cases(cases);
        let recent_cutoff = now - Duration::days(i64::from(config.recent_days));

        let stats = DashboardStats {
            total_animals: animal_totals.total,
            healthy_animals: animal_totals.healthy,
            sick_animals: animal_totals.sick,
            under_treatment: animal_totals.under_treatment,
            total_diseases: case_totals.total,
            active_outbreaks: case_totals.active_outbreaks,
            recent_diseases: cases
                .iter()
                .filter(|c| c.reported_date >= recent_cutoff)
                .count() as u64,
        };

        let severity_counts = count_by(cases, |c| c.severity.as_str().to_string());
        let diseases_by_severity = Severity::ALL
            .iter()
            .filter_map(|s| {
                severity_counts
                    .iter()
                    .find(|c| c.name == s.as_str())
                    .map(|c| ChartPoint {
                        name: c.name.clone(),
                        value: c.count,
                    })
            })
            .collect();

        let mut top_diseases = count_by(cases, |c| c.disease_name.clone());
        top_diseases.truncate(config.top_diseases_limit);

        let charts = DashboardCharts {
            animals_by_species: into_points(count_by(animals, AnimalRecord::canonical_species)),
            diseases_by_type: into_points(count_by(cases, |c| c.disease_type.as_str().to_string())),
            diseases_by_severity,
            top_diseases: into_points(top_diseases),
            disease_trends: build_trend(cases, now, config.scoped_trend_months, false)
                .iter()
                .map(MonthlyCount::from)
                .collect(),
        };

        let recent_activity = RecentActivity {
            animals: animals
                .iter()
                .take(config.recent_activity_limit)
                .cloned()
                .collect(),
            diseases: cases
                .iter()
                .take(config.recent_activity_limit)
                .cloned()
                .collect(),
        };

        Self {
            stats,
            charts,
            recent_activity,
        }
    }
}

fn into_points(counts: Vec<NamedCount>) -> Vec<ChartPoint> {
    counts.into_iter().map(ChartPoint::from).collect()
}

/// Loads a scope's records and computes its dashboard.
pub struct DashboardBuilder<'a> {
    db: &'a Database,
    config: &'a EngineConfig,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(db: &'a Database, config: &'a EngineConfig) -> Self {
        Self { db, config }
    }

    pub fn build(&self, scope: &Scope) -> DbResult<ScopedDashboard> {
        self.build_at(scope, Utc::now())
    }

    /// Build as of a fixed instant.
    pub fn build_at(&self, scope: &Scope, now: DateTime<Utc>) -> DbResult<ScopedDashboard> {
        let animals = self.db.list_animals(&AnimalFilter::within(scope))?;
        let cases = self.db.list_cases(&CaseFilter::within(scope))?;
        Ok(ScopedDashboard::compute(&animals, &cases, self.config, now))
    }
}
