//! National overview across every province, district and sector.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rollup::{
    count_by, group_by, rollup_level, top_counts_by, AnimalTotals, DiseaseTotals, Level,
    LocationKey, NamedCount, RollupResult,
};
use super::trend::{build_trend, ProvinceTrend};
use crate::config::EngineConfig;
use crate::db::{AnimalFilter, CaseFilter, Database, DbResult};
use crate::models::{AnimalRecord, DiseaseCase};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_animals: u64,
    pub total_diseases: u64,
    pub total_outbreaks: u64,
    pub total_provinces: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    pub province: String,
    pub animals: AnimalTotals,
    pub diseases: DiseaseTotals,
    pub species: Vec<NamedCount>,
    pub top_diseases: Vec<NamedCount>,
}

/// Flat animal counts carried on district and sector entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCounts {
    pub total_animals: u64,
    pub healthy_animals: u64,
    pub sick_animals: u64,
    pub health_rate: u32,
}

impl From<&AnimalTotals> for HealthCounts {
    fn from(t: &AnimalTotals) -> Self {
        Self {
            total_animals: t.total,
            healthy_animals: t.healthy,
            sick_animals: t.sick,
            health_rate: t.health_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictSummary {
    pub province: String,
    pub district: String,
    #[serde(flatten)]
    pub counts: HealthCounts,
    pub animals: AnimalTotals,
    pub diseases: DiseaseTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub province: String,
    pub district: String,
    pub sector: String,
    #[serde(flatten)]
    pub counts: HealthCounts,
    pub animals: AnimalTotals,
    pub diseases: DiseaseTotals,
    /// Species of every animal in the sector, one entry per animal
    pub species: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalOverview {
    pub overview: Overview,
    pub provinces: Vec<ProvinceSummary>,
    pub districts: Vec<DistrictSummary>,
    pub sectors: Vec<SectorSummary>,
    pub trends: Vec<ProvinceTrend>,
}

impl NationalOverview {
    /// Compute from the full record set.
    pub fn compute(
        animals: &[AnimalRecord],
        cases: &[DiseaseCase],
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let mut province_species = species_by(animals, Level::Province);
        let mut sector_species = group_by(
            animals,
            |a| LocationKey::at(Level::Sector, &a.location),
            |names: &mut Vec<String>, a| names.push(a.species.clone()),
        );
        let mut top_diseases = top_counts_by(
            cases,
            |c| c.location.province_label(),
            |c| c.disease_name.clone(),
            config.top_diseases_limit,
        );

        let provinces: Vec<ProvinceSummary> = rollup_level(animals, cases, Level::Province)
            .into_iter()
            .map(|r| {
                let species = province_species.remove(&r.key).unwrap_or_default();
                let top = top_diseases.remove(&r.key.province).unwrap_or_default();
                ProvinceSummary {
                    province: r.key.province,
                    animals: r.animals,
                    diseases: r.diseases,
                    species,
                    top_diseases: top,
                }
            })
            .collect();

        let districts = rollup_level(animals, cases, Level::District)
            .into_iter()
            .map(|r| {
                let (province, district, _) = split_key(&r);
                DistrictSummary {
                    province,
                    district,
                    counts: HealthCounts::from(&r.animals),
                    animals: r.animals,
                    diseases: r.diseases,
                }
            })
            .collect();

        let sectors = rollup_level(animals, cases, Level::Sector)
            .into_iter()
            .map(|r| {
                let species = sector_species.remove(&r.key).unwrap_or_default();
                let (province, district, sector) = split_key(&r);
                SectorSummary {
                    province,
                    district,
                    sector,
                    counts: HealthCounts::from(&r.animals),
                    animals: r.animals,
                    diseases: r.diseases,
                    species,
                }
            })
            .collect();

        let overview = Overview {
            total_animals: animals.len() as u64,
            total_diseases: cases.len() as u64,
            total_outbreaks: cases.iter().filter(|c| c.is_outbreak).count() as u64,
            total_provinces: provinces.len() as u64,
        };

        let trends = build_trend(cases, now, config.national_trend_months, true)
            .iter()
            .map(ProvinceTrend::from)
            .collect();

        Self {
            overview,
            provinces,
            districts,
            sectors,
            trends,
        }
    }
}

fn species_by(animals: &[AnimalRecord], level: Level) -> BTreeMap<LocationKey, Vec<NamedCount>> {
    group_by(
        animals,
        |a| LocationKey::at(level, &a.location),
        |names: &mut Vec<String>, a| names.push(a.canonical_species()),
    )
    .into_iter()
    .map(|(key, names)| (key, count_by(&names, String::clone)))
    .collect()
}

fn split_key(result: &RollupResult) -> (String, String, String) {
    (
        result.key.province.clone(),
        result.key.district.clone().unwrap_or_default(),
        result.key.sector.clone().unwrap_or_default(),
    )
}

/// Loads every record and computes the national overview.
pub struct NationalOverviewBuilder<'a> {
    db: &'a Database,
    config: &'a EngineConfig,
}

impl<'a> NationalOverviewBuilder<'a> {
    pub fn new(db: &'a Database, config: &'a EngineConfig) -> Self {
        Self { db, config }
    }

    pub fn build(&self) -> DbResult<NationalOverview> {
        self.build_at(Utc::now())
    }

    pub fn build_at(&self, now: DateTime<Utc>) -> DbResult<NationalOverview> {
        let animals = self.db.list_animals(&AnimalFilter::default())?;
        let cases = self.db.list_cases(&CaseFilter::default())?;
        let overview = NationalOverview::compute(&animals, &cases, self.config, now);
        tracing::debug!(
            provinces = overview.provinces.len(),
            districts = overview.districts.len(),
            sectors = overview.sectors.len(),
            "national overview computed"
        );
        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnimalDetails, CaseOutcome, DiseaseType, HealthStatus, LocationSnapshot, Severity, Sex,
    };
    use chrono::NaiveDate;

    fn animal(p: &str, d: &str, s: &str, species: &str, status: HealthStatus) -> AnimalRecord {
        AnimalRecord {
            id: uuid::Uuid::new_v4().to_string(),
            animal_id: "ANM".into(),
            species: species.into(),
            breed: "local".into(),
            age: 1,
            sex: Sex::Male,
            color: None,
            identification_marks: None,
            owner_name: "o".into(),
            owner_contact: "c".into(),
            owner_address: None,
            location: LocationSnapshot::new(p, d, s),
            health_status: status,
            vaccination_history: vec![],
            registered_by: "u".into(),
            registered_date: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    fn case(p: &str, d: &str, s: &str, name: &str, outbreak: bool) -> DiseaseCase {
        DiseaseCase {
            id: uuid::Uuid::new_v4().to_string(),
            report_id: "DIS".into(),
            animal_id: "x".into(),
            animal_details: AnimalDetails {
                species: "cattle".into(),
                breed: "local".into(),
                age: 1,
            },
            disease_name: name.into(),
            disease_type: DiseaseType::Bacterial,
            symptoms: vec![],
            severity: Severity::Severe,
            diagnosis_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            diagnosis_method: "lab".into(),
            treatment_provided: None,
            outcome: CaseOutcome::Ongoing,
            location: LocationSnapshot::new(p, d, s),
            reported_by: "u".into(),
            reported_date: Utc::now(),
            is_outbreak: outbreak,
            affected_animals_count: 1,
            notes: None,
            updated_at: Utc::now(),
        }
    }

    fn fixture() -> (Vec<AnimalRecord>, Vec<DiseaseCase>) {
        let animals = vec![
            animal("Eastern", "Kayonza", "Gahini", "cattle", HealthStatus::Healthy),
            animal("Eastern", "Kayonza", "Gahini", "goats", HealthStatus::Sick),
            animal("Eastern", "Nyagatare", "Karama", "cattle", HealthStatus::Healthy),
            animal("Southern", "Huye", "Tumba", "pigs", HealthStatus::Deceased),
        ];
        let cases = vec![
            case("Eastern", "Kayonza", "Gahini", "Anthrax", true),
            case("Eastern", "Kayonza", "Gahini", "Anthrax", false),
            case("Eastern", "Nyagatare", "Karama", "Brucellosis", false),
            case("Northern", "Musanze", "Kinigi", "Rabies", true),
        ];
        (animals, cases)
    }

    #[test]
    fn test_overview_totals() {
        let (animals, cases) = fixture();
        let view = NationalOverview::compute(&animals, &cases, &EngineConfig::default(), Utc::now());
        assert_eq!(view.overview.total_animals, 4);
        assert_eq!(view.overview.total_diseases, 4);
        assert_eq!(view.overview.total_outbreaks, 2);
        assert_eq!(view.overview.total_provinces, 3);
    }

    #[test]
    fn test_province_entries() {
        let (animals, cases) = fixture();
        let view = NationalOverview::compute(&animals, &cases, &EngineConfig::default(), Utc::now());

        let names: Vec<_> = view.provinces.iter().map(|p| p.province.as_str()).collect();
        assert_eq!(names, vec!["Eastern", "Southern", "Northern"]);

        let eastern = &view.provinces[0];
        assert_eq!(eastern.animals.total, 3);
        assert_eq!(eastern.animals.health_rate, 67);
        assert_eq!(eastern.species[0], NamedCount { name: "cattle".into(), count: 2 });
        assert_eq!(eastern.top_diseases[0], NamedCount { name: "Anthrax".into(), count: 2 });

        let northern = &view.provinces[2];
        assert_eq!(northern.animals.total, 0);
        assert!(northern.species.is_empty());
        assert_eq!(northern.diseases.active_outbreaks, 1);
    }

    #[test]
    fn test_children_sum_to_parent() {
        let (animals, cases) = fixture();
        let view = NationalOverview::compute(&animals, &cases, &EngineConfig::default(), Utc::now());
        for province in &view.provinces {
            let district_animals: u64 = view
                .districts
                .iter()
                .filter(|d| d.province == province.province)
                .map(|d| d.animals.total)
                .sum();
            let sector_cases: u64 = view
                .sectors
                .iter()
                .filter(|s| s.province == province.province)
                .map(|s| s.diseases.total)
                .sum();
            assert_eq!(district_animals, province.animals.total);
            assert_eq!(sector_cases, province.diseases.total);
        }
    }

    #[test]
    fn test_trends_by_province() {
        let (animals, cases) = fixture();
        let view = NationalOverview::compute(&animals, &cases, &EngineConfig::default(), Utc::now());
        assert_eq!(view.trends.len(), 2);
        assert_eq!(view.trends[0].province, "Eastern");
        assert_eq!(view.trends[0].diseases, 3);
        assert_eq!(view.trends[0].outbreaks, 1);
        assert_eq!(view.trends[1].province, "Northern");
    }

    #[test]
    fn test_wire_shape() {
        let (animals, cases) = fixture();
        let view = NationalOverview::compute(&animals, &cases, &EngineConfig::default(), Utc::now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["overview"]["totalProvinces"], 3);
        assert_eq!(json["provinces"][0]["topDiseases"][0]["name"], "Anthrax");
        assert_eq!(json["sectors"][0]["sector"], "Gahini");
        assert!(json["districts"][0].get("species").is_none());

        let kayonza = &json["districts"][0];
        assert_eq!(kayonza["district"], "Kayonza");
        assert_eq!(kayonza["totalAnimals"], 2);
        assert_eq!(kayonza["healthyAnimals"], 1);
        assert_eq!(kayonza["sickAnimals"], 1);
        assert_eq!(kayonza["healthRate"], 50);
        assert_eq!(kayonza["animals"]["total"], 2);

        let gahini = &json["sectors"][0];
        assert_eq!(gahini["totalAnimals"], 2);
        assert_eq!(gahini["healthRate"], 50);
        assert_eq!(gahini["species"], serde_json::json!(["cattle", "goats"]));
        assert!(json["trends"][0]["date"].is_string());
    }
}
