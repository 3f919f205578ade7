//! Geo feed: disease cases joined to their animals for the case map.
//!
//! Built in two steps. Case-only predicates are pushed down to the store and
//! each case is joined to its animal; statistics are then computed over the
//! materialized entry list.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::classify::{classify, PresentationStatus};
use crate::db::{CaseFilter, Database, DbResult};
use crate::models::{AnimalRecord, DiseaseCase, DiseaseType, LocationSnapshot, Scope, Severity};

/// Map filter supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoFeedFilter {
    /// Matched case-insensitively against the joined animal
    pub species: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<PresentationStatus>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub disease_type: Option<DiseaseType>,
    pub diagnosed_from: Option<NaiveDate>,
    pub diagnosed_to: Option<NaiveDate>,
    /// Drop cases without latitude/longitude
    pub require_coordinates: bool,
}

impl GeoFeedFilter {
    /// Store-side predicates, intersected with the caller's scope.
    ///
    /// `None` when the filter asks for a location outside the scope.
    pub fn case_filter(&self, scope: &Scope) -> Option<CaseFilter> {
        let mut filter = CaseFilter::within(scope);
        if !narrow(&mut filter.province, &self.province) {
            return None;
        }
        if !narrow(&mut filter.district, &self.district) {
            return None;
        }
        filter.severity = self.severity;
        filter.disease_type = self.disease_type;
        filter.diagnosed_from = self.diagnosed_from;
        filter.diagnosed_to = self.diagnosed_to;
        filter.require_coordinates = self.require_coordinates;
        Some(filter)
    }

    /// Whether any predicate must run on the joined entry.
    fn has_join_predicates(&self) -> bool {
        self.species.is_some() || self.status.is_some()
    }

    fn accepts(&self, entry: &GeoFeedEntry) -> bool {
        if let Some(wanted) = &self.species {
            let wanted = wanted.trim().to_lowercase();
            match &entry.animal {
                Some(animal) if animal.species.trim().to_lowercase() == wanted => {}
                _ => return false,
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        true
    }
}

fn narrow(current: &mut Option<String>, requested: &Option<String>) -> bool {
    match (current.as_ref(), requested) {
        (_, None) => true,
        (None, Some(value)) => {
            *current = Some(value.clone());
            true
        }
        (Some(existing), Some(value)) => existing == value,
    }
}

/// Animal owner contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoOwner {
    pub name: String,
    pub phone: String,
}

/// The animal fields shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAnimalSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub tag_number: String,
    pub species: String,
    pub breed: String,
    pub owner: GeoOwner,
}

impl From<&AnimalRecord> for GeoAnimalSummary {
    fn from(animal: &AnimalRecord) -> Self {
        Self {
            id: animal.id.clone(),
            tag_number: animal.animal_id.clone(),
            species: animal.species.clone(),
            breed: animal.breed.clone(),
            owner: GeoOwner {
                name: animal.owner_name.clone(),
                phone: animal.owner_contact.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDisease {
    pub name: String,
    #[serde(rename = "type")]
    pub disease_type: DiseaseType,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoVeterinarian {
    pub name: String,
}

/// One map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeedEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub case_id: String,
    /// `None` when the animal no longer exists
    pub animal: Option<GeoAnimalSummary>,
    pub disease: GeoDisease,
    /// Snapshot taken when the case was reported
    pub location: LocationSnapshot,
    pub diagnosis_date: NaiveDate,
    pub reported_date: DateTime<Utc>,
    pub veterinarian: GeoVeterinarian,
    pub symptoms: Vec<String>,
    pub treatment: Option<String>,
    pub status: PresentationStatus,
    pub is_outbreak: bool,
    pub affected_animals_count: u32,
    pub notes: Option<String>,
}

impl GeoFeedEntry {
    /// Join a case with its animal, if any.
    pub fn join(case: &DiseaseCase, animal: Option<&AnimalRecord>) -> Self {
        Self {
            id: case.id.clone(),
            case_id: case.report_id.clone(),
            animal: animal.map(GeoAnimalSummary::from),
            disease: GeoDisease {
                name: case.disease_name.clone(),
                disease_type: case.disease_type,
                severity: case.severity,
            },
            location: case.location.clone(),
            diagnosis_date: case.diagnosis_date,
            reported_date: case.reported_date,
            veterinarian: GeoVeterinarian {
                name: case.reported_by.clone(),
            },
            symptoms: case.symptoms.clone(),
            treatment: case.treatment_provided.clone(),
            status: classify(case).presentation_status,
            is_outbreak: case.is_outbreak,
            affected_animals_count: case.affected_animals_count,
            notes: case.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub mild: u64,
    pub moderate: u64,
    pub severe: u64,
    pub critical: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub cattle: u64,
    pub goats: u64,
    pub sheep: u64,
    pub pigs: u64,
    pub poultry: u64,
    pub other: u64,
}

impl SpeciesCounts {
    /// Count one species. Blank species count nowhere.
    pub fn record(&mut self, species: &str) {
        match species.trim().to_lowercase().as_str() {
            "" => {}
            "cattle" => self.cattle += 1,
            "goats" => self.goats += 1,
            "sheep" => self.sheep += 1,
            "pigs" => self.pigs += 1,
            "poultry" => self.poultry += 1,
            _ => self.other += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub active: u64,
    pub treated: u64,
    pub recovered: u64,
    pub deceased: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub viral: u64,
    pub bacterial: u64,
    pub parasitic: u64,
    pub fungal: u64,
    pub other: u64,
}

/// Summary statistics over the returned entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeedStats {
    pub total_cases: u64,
    pub active_outbreaks: u64,
    /// Number of entries
    pub affected_animals: u64,
    /// Distinct non-blank sectors
    pub affected_locations: u64,
    pub by_severity: SeverityCounts,
    pub by_species: SpeciesCounts,
    pub by_status: StatusCounts,
    pub by_type: TypeCounts,
}

impl GeoFeedStats {
    pub fn from_entries(entries: &[GeoFeedEntry]) -> Self {
        let mut stats = GeoFeedStats {
            total_cases: entries.len() as u64,
            affected_animals: entries.len() as u64,
            ..Default::default()
        };
        let mut sectors = BTreeSet::new();

        for entry in entries {
            stats.active_outbreaks += u64::from(entry.is_outbreak);

            let sector = entry.location.sector.trim();
            if !sector.is_empty() {
                sectors.insert(sector);
            }

            match entry.disease.severity {
                Severity::Mild => stats.by_severity.mild += 1,
                Severity::Moderate => stats.by_severity.moderate += 1,
                Severity::Severe => stats.by_severity.severe += 1,
                Severity::Critical => stats.by_severity.critical += 1,
            }

            if let Some(animal) = &entry.animal {
                stats.by_species.record(&animal.species);
            }

            match entry.status {
                PresentationStatus::Active => stats.by_status.active += 1,
                PresentationStatus::Treated => stats.by_status.treated += 1,
                PresentationStatus::Recovered => stats.by_status.recovered += 1,
                PresentationStatus::Deceased => stats.by_status.deceased += 1,
            }

            match entry.disease.disease_type {
                DiseaseType::Viral => stats.by_type.viral += 1,
                DiseaseType::Bacterial => stats.by_type.bacterial += 1,
                DiseaseType::Parasitic => stats.by_type.parasitic += 1,
                DiseaseType::Fungal => stats.by_type.fungal += 1,
                DiseaseType::Other => stats.by_type.other += 1,
            }
        }

        stats.affected_locations = sectors.len() as u64;
        stats
    }
}

/// Entries plus their statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoFeed {
    pub cases: Vec<GeoFeedEntry>,
    pub stats: GeoFeedStats,
}

/// Join, post-filter and cap already-fetched cases.
///
/// `cases` must be ordered newest first; `animals` is keyed by store id.
pub fn assemble(
    cases: &[DiseaseCase],
    animals: &HashMap<String, AnimalRecord>,
    filter: &GeoFeedFilter,
    limit: usize,
) -> GeoFeed {
    let entries: Vec<GeoFeedEntry> = cases
        .iter()
        .map(|case| GeoFeedEntry::join(case, animals.get(&case.animal_id)))
        .filter(|entry| filter.accepts(entry))
        .take(limit)
        .collect();
    let stats = GeoFeedStats::from_entries(&entries);
    GeoFeed {
        cases: entries,
        stats,
    }
}

/// Builds the geo feed from the store.
pub struct GeoFeedBuilder<'a> {
    db: &'a Database,
    limit: usize,
}

impl<'a> GeoFeedBuilder<'a> {
    pub fn new(db: &'a Database, limit: usize) -> Self {
        Self { db, limit }
    }

    pub fn build(&self, scope: &Scope, filter: &GeoFeedFilter) -> DbResult<GeoFeed> {
        let Some(mut case_filter) = filter.case_filter(scope) else {
            tracing::debug!("geo filter lies outside caller scope");
            return Ok(GeoFeed::default());
        };
        // Without post-join predicates the store can apply the cap itself.
        if !filter.has_join_predicates() {
            case_filter.limit = Some(self.limit);
        }
        let cases = self.db.list_cases(&case_filter)?;

        let mut ids: Vec<String> = cases.iter().map(|c| c.animal_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let animals: HashMap<String, AnimalRecord> = self
            .db
            .get_animals_by_ids(&ids)?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let feed = assemble(&cases, &animals, filter, self.limit);
        tracing::debug!(
            fetched = cases.len(),
            returned = feed.cases.len(),
            "geo feed built"
        );
        Ok(feed)
    }
}
