//! Surveillance Core Library
//!
//! Livestock health surveillance over a province → district → sector
//! hierarchy: animal registration, disease-case reporting, hierarchical
//! rollups, outbreak classification, monthly trends and the case map feed.
//!
//! # Architecture
//!
//! ```text
//!                       Record Accessor (db)
//!                               │
//!         ┌──────────────┬──────┴───────┬──────────────┐
//!         ▼              ▼              ▼              ▼
//!      Rollup       Classifier        Trend         Geo Feed
//!         │              │              │              │
//!         └──────────────┴──────┬───────┴──────────────┘
//!                               ▼
//!              Scoped dashboard / National overview
//!
//!   case outcome write ──► Consistency Updater ──► animal health status
//!                          (one transaction)
//! ```
//!
//! # Core Principle
//!
//! **Nothing derived is stored.** Every view is recomputed from the records
//! visible in the caller's scope.
//!
//! # Modules
//!
//! - [`db`]: SQLite record store and filters
//! - [`models`]: Domain types (AnimalRecord, DiseaseCase, Caller, etc.)
//! - [`location`]: Administrative hierarchy and cascading selection
//! - [`analytics`]: Rollups, classification, trends, geo feed, dashboards
//! - [`consistency`]: Case outcome → animal health status
//! - [`surveillance`]: Caller-facing service
//! - [`config`]: Engine configuration

pub mod analytics;
pub mod config;
pub mod consistency;
pub mod db;
pub mod location;
pub mod models;
pub mod surveillance;

// Re-export commonly used types
pub use analytics::{GeoFeed, GeoFeedFilter, NationalOverview, PresentationStatus, ScopedDashboard};
pub use config::EngineConfig;
pub use consistency::{health_status_for_outcome, OutcomeTransition, OutcomeUpdate};
pub use db::Database;
pub use location::{LocationHierarchy, LocationSelection};
pub use models::{
    AnimalRecord, AnimalUpdate, Caller, CaseOutcome, DiseaseCase, DiseaseType, HealthStatus,
    LocationSnapshot, NewAnimal, NewDiseaseCase, Role, Scope, Severity, Sex, VaccinationRecord,
};
pub use surveillance::{AnimalPage, AnimalPageQuery, CaseDetail, Surveillance};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SurveillanceError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SurveillanceResult<T> = Result<T, SurveillanceError>;

impl From<db::DbError> for SurveillanceError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => SurveillanceError::NotFound(what),
            other => {
                tracing::error!(error = %other, "store operation failed");
                SurveillanceError::Internal(other.to_string())
            }
        }
    }
}

impl From<location::LocationError> for SurveillanceError {
    fn from(e: location::LocationError) -> Self {
        SurveillanceError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for SurveillanceError {
    fn from(e: config::ConfigError) -> Self {
        tracing::error!(error = %e, "configuration could not be loaded");
        SurveillanceError::Internal(format!("configuration: {}", e))
    }
}

impl From<serde_json::Error> for SurveillanceError {
    fn from(e: serde_json::Error) -> Self {
        SurveillanceError::Internal(format!("serialization: {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for SurveillanceError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        SurveillanceError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
///
/// Configuration comes from defaults and `SURVEILLANCE_*` variables.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<SurveillanceCore>, SurveillanceError> {
    open_database_with_config(path, None)
}

/// Open or create a database, reading configuration from a TOML file.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_path: Option<String>,
) -> Result<Arc<SurveillanceCore>, SurveillanceError> {
    let config = EngineConfig::load(config_path.as_deref().map(std::path::Path::new))?;
    let db = Database::open(&path)?;
    SurveillanceCore::new(db, config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<SurveillanceCore>, SurveillanceError> {
    let db = Database::open_in_memory()?;
    SurveillanceCore::new(db, EngineConfig::default())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe service handle for FFI.
#[derive(uniffi::Object)]
pub struct SurveillanceCore {
    db: Arc<Mutex<Database>>,
    config: EngineConfig,
    hierarchy: LocationHierarchy,
}

impl SurveillanceCore {
    fn new(db: Database, config: EngineConfig) -> Result<Arc<Self>, SurveillanceError> {
        let hierarchy = config.hierarchy()?;
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
            hierarchy,
        }))
    }
}

#[uniffi::export]
impl SurveillanceCore {
    // =========================================================================
    // Dashboards (JSON)
    // =========================================================================

    /// Dashboard for the caller's scope as JSON.
    pub fn get_scoped_dashboard_json(&self, caller: Option<FfiCaller>) -> Result<String, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let dashboard = Surveillance::new(&db, &self.config, &self.hierarchy)
            .get_scoped_dashboard(caller.as_ref())?;
        Ok(serde_json::to_string(&dashboard)?)
    }

    /// National overview as JSON. Super-admins only.
    pub fn get_national_overview_json(&self, caller: Option<FfiCaller>) -> Result<String, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let overview = Surveillance::new(&db, &self.config, &self.hierarchy)
            .get_national_overview(caller.as_ref())?;
        Ok(serde_json::to_string(&overview)?)
    }

    /// Case map feed as JSON. `filter_json` is a `GeoFeedFilter` object.
    pub fn get_geo_feed_json(
        &self,
        caller: Option<FfiCaller>,
        filter_json: Option<String>,
    ) -> Result<String, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let filter: GeoFeedFilter = match filter_json.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)
                .map_err(|e| SurveillanceError::InvalidInput(format!("geo filter: {}", e)))?,
            _ => GeoFeedFilter::default(),
        };
        let db = self.db.lock()?;
        let feed = Surveillance::new(&db, &self.config, &self.hierarchy)
            .get_geo_feed(caller.as_ref(), &filter)?;
        Ok(serde_json::to_string(&feed)?)
    }

    // =========================================================================
    // Case Operations
    // =========================================================================

    /// Report a disease case.
    pub fn report_disease_case(
        &self,
        caller: Option<FfiCaller>,
        report: FfiNewCase,
    ) -> Result<FfiCase, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let report = report.try_into()?;
        let db = self.db.lock()?;
        let case = Surveillance::new(&db, &self.config, &self.hierarchy)
            .report_disease_case(caller.as_ref(), report)?;
        Ok(case.into())
    }

    /// Change a case outcome; the animal's health status follows.
    pub fn apply_case_outcome(
        &self,
        caller: Option<FfiCaller>,
        case_id: String,
        outcome: String,
        treatment_provided: Option<String>,
        notes: Option<String>,
    ) -> Result<FfiOutcomeTransition, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let update = OutcomeUpdate {
            outcome,
            treatment_provided,
            notes,
        };
        let db = self.db.lock()?;
        let transition = Surveillance::new(&db, &self.config, &self.hierarchy)
            .apply_case_outcome(caller.as_ref(), &case_id, &update)?;
        Ok(transition.into())
    }

    /// Case with its animal as JSON.
    pub fn get_case_with_animal_json(
        &self,
        caller: Option<FfiCaller>,
        case_id: String,
    ) -> Result<String, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let detail = Surveillance::new(&db, &self.config, &self.hierarchy)
            .get_case_with_animal(caller.as_ref(), &case_id)?;
        Ok(serde_json::to_string(&detail)?)
    }

    /// Search cases by report id, disease name or animal id.
    pub fn search_cases(
        &self,
        caller: Option<FfiCaller>,
        query: String,
    ) -> Result<Vec<FfiCase>, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let cases = Surveillance::new(&db, &self.config, &self.hierarchy)
            .search_cases(caller.as_ref(), &query)?;
        Ok(cases.into_iter().map(|c| c.into()).collect())
    }

    // =========================================================================
    // Animal Operations
    // =========================================================================

    /// Register an animal.
    pub fn register_animal(
        &self,
        caller: Option<FfiCaller>,
        animal: FfiNewAnimal,
    ) -> Result<FfiAnimal, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let input = animal.try_into()?;
        let db = self.db.lock()?;
        let animal = Surveillance::new(&db, &self.config, &self.hierarchy)
            .register_animal(caller.as_ref(), input)?;
        Ok(animal.into())
    }

    /// Record a vaccination. Dates are `YYYY-MM-DD`.
    pub fn record_vaccination(
        &self,
        caller: Option<FfiCaller>,
        animal_id: String,
        vaccine_name: String,
        date_administered: String,
        next_due_date: Option<String>,
        administered_by: String,
    ) -> Result<FfiAnimal, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let record = VaccinationRecord {
            vaccine_name,
            date_administered: parse_ffi_date("dateAdministered", &date_administered)?,
            next_due_date: next_due_date
                .as_deref()
                .map(|d| parse_ffi_date("nextDueDate", d))
                .transpose()?,
            administered_by,
        };
        let db = self.db.lock()?;
        let animal = Surveillance::new(&db, &self.config, &self.hierarchy)
            .record_vaccination(caller.as_ref(), &animal_id, record)?;
        Ok(animal.into())
    }

    /// Search animals by tag, owner or breed.
    pub fn search_animals(
        &self,
        caller: Option<FfiCaller>,
        query: String,
    ) -> Result<Vec<FfiAnimal>, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let animals = Surveillance::new(&db, &self.config, &self.hierarchy)
            .search_animals(caller.as_ref(), &query)?;
        Ok(animals.into_iter().map(|a| a.into()).collect())
    }

    /// One animal by store id or tag.
    pub fn get_animal(
        &self,
        caller: Option<FfiCaller>,
        animal_id: String,
    ) -> Result<FfiAnimal, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        let animal = Surveillance::new(&db, &self.config, &self.hierarchy)
            .get_animal(caller.as_ref(), &animal_id)?;
        Ok(animal.into())
    }

    /// Edit an animal. Unset fields are left as they are.
    pub fn update_animal(
        &self,
        caller: Option<FfiCaller>,
        animal_id: String,
        update: FfiAnimalUpdate,
    ) -> Result<FfiAnimal, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let update = update.try_into()?;
        let db = self.db.lock()?;
        let animal = Surveillance::new(&db, &self.config, &self.hierarchy)
            .update_animal(caller.as_ref(), &animal_id, update)?;
        Ok(animal.into())
    }

    /// Distinct owner names in the caller's area.
    pub fn list_owners(&self, caller: Option<FfiCaller>) -> Result<Vec<String>, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let db = self.db.lock()?;
        Surveillance::new(&db, &self.config, &self.hierarchy).list_owners(caller.as_ref())
    }

    /// Country-wide animal page as JSON. `query_json` is an `AnimalPageQuery` object.
    pub fn list_animals_page_json(
        &self,
        caller: Option<FfiCaller>,
        query_json: Option<String>,
    ) -> Result<String, SurveillanceError> {
        let caller = resolve_caller(caller, &self.hierarchy)?;
        let query: AnimalPageQuery = match query_json.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)
                .map_err(|e| SurveillanceError::InvalidInput(format!("page query: {}", e)))?,
            _ => AnimalPageQuery::default(),
        };
        let db = self.db.lock()?;
        let page = Surveillance::new(&db, &self.config, &self.hierarchy)
            .list_animals_page(caller.as_ref(), &query)?;
        Ok(serde_json::to_string(&page)?)
    }

    // =========================================================================
    // Location Hierarchy
    // =========================================================================

    pub fn list_provinces(&self) -> Vec<String> {
        self.hierarchy
            .provinces()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn list_districts(&self, province: String) -> Result<Vec<String>, SurveillanceError> {
        Ok(self
            .hierarchy
            .districts(&province)?
            .iter()
            .map(|d| d.name.clone())
            .collect())
    }

    pub fn list_sectors(&self, province: String, district: String) -> Result<Vec<String>, SurveillanceError> {
        Ok(self.hierarchy.sectors(&province, &district)?.to_vec())
    }
}

fn resolve_caller(
    caller: Option<FfiCaller>,
    hierarchy: &LocationHierarchy,
) -> Result<Option<Caller>, SurveillanceError> {
    let mut caller = caller.map(Caller::try_from).transpose()?;
    if let Some(c) = &mut caller {
        c.scope = hierarchy.complete_scope(&c.scope)?;
        hierarchy.validate_scope(&c.scope)?;
    }
    Ok(caller)
}

fn parse_ffi_date(field: &str, raw: &str) -> Result<NaiveDate, SurveillanceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| SurveillanceError::InvalidInput(format!("{} {:?}: {}", field, raw, e)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe caller identity. The scope is derived from role and profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaller {
    pub user_id: String,
    pub role: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
}

impl TryFrom<FfiCaller> for Caller {
    type Error = SurveillanceError;

    fn try_from(caller: FfiCaller) -> Result<Self, Self::Error> {
        let role = Role::parse(&caller.role)
            .ok_or_else(|| SurveillanceError::InvalidInput(format!("role {:?}", caller.role)))?;
        Ok(Caller::from_profile(
            caller.user_id,
            role,
            caller.province,
            caller.district,
            caller.sector,
        ))
    }
}

/// FFI-safe location.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLocation {
    pub province: String,
    pub district: String,
    pub sector: String,
    pub cell: Option<String>,
    pub village: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<LocationSnapshot> for FfiLocation {
    fn from(loc: LocationSnapshot) -> Self {
        Self {
            province: loc.province,
            district: loc.district,
            sector: loc.sector,
            cell: loc.cell,
            village: loc.village,
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

impl From<FfiLocation> for LocationSnapshot {
    fn from(loc: FfiLocation) -> Self {
        LocationSnapshot {
            province: loc.province,
            district: loc.district,
            sector: loc.sector,
            cell: loc.cell,
            village: loc.village,
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

/// FFI-safe registration input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewAnimal {
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub sex: String,
    pub color: Option<String>,
    pub identification_marks: Option<String>,
    pub owner_name: String,
    pub owner_contact: String,
    pub owner_address: Option<String>,
    pub location: FfiLocation,
}

impl TryFrom<FfiNewAnimal> for NewAnimal {
    type Error = SurveillanceError;

    fn try_from(animal: FfiNewAnimal) -> Result<Self, Self::Error> {
        let sex = Sex::parse(&animal.sex)
            .ok_or_else(|| SurveillanceError::InvalidInput(format!("sex {:?}", animal.sex)))?;
        Ok(NewAnimal {
            species: animal.species,
            breed: animal.breed,
            age: animal.age,
            sex,
            color: animal.color,
            identification_marks: animal.identification_marks,
            owner_name: animal.owner_name,
            owner_contact: animal.owner_contact,
            owner_address: animal.owner_address,
            location: animal.location.into(),
        })
    }
}

/// FFI-safe animal edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiAnimalUpdate {
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub color: Option<String>,
    pub identification_marks: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    pub owner_address: Option<String>,
    pub location: Option<FfiLocation>,
}

impl TryFrom<FfiAnimalUpdate> for AnimalUpdate {
    type Error = SurveillanceError;

    fn try_from(update: FfiAnimalUpdate) -> Result<Self, Self::Error> {
        let sex = update
            .sex
            .map(|raw| {
                Sex::parse(&raw).ok_or_else(|| SurveillanceError::InvalidInput(format!("sex {:?}", raw)))
            })
            .transpose()?;
        Ok(AnimalUpdate {
            species: update.species,
            breed: update.breed,
            age: update.age,
            sex,
            color: update.color,
            identification_marks: update.identification_marks,
            owner_name: update.owner_name,
            owner_contact: update.owner_contact,
            owner_address: update.owner_address,
            location: update.location.map(LocationSnapshot::from),
        })
    }
}

/// FFI-safe animal.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimal {
    pub id: String,
    pub animal_id: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub sex: String,
    pub owner_name: String,
    pub owner_contact: String,
    pub location: FfiLocation,
    pub health_status: String,
    pub vaccination_count: u32,
    pub registered_date: String,
}

impl From<AnimalRecord> for FfiAnimal {
    fn from(animal: AnimalRecord) -> Self {
        Self {
            id: animal.id,
            animal_id: animal.animal_id,
            species: animal.species,
            breed: animal.breed,
            age: animal.age,
            sex: animal.sex.as_str().to_string(),
            owner_name: animal.owner_name,
            owner_contact: animal.owner_contact,
            location: animal.location.into(),
            health_status: animal.health_status.as_str().to_string(),
            vaccination_count: animal.vaccination_history.len() as u32,
            registered_date: animal.registered_date.to_rfc3339(),
        }
    }
}

/// FFI-safe case report input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewCase {
    /// Store id or tag of the animal
    pub animal_id: String,
    pub disease_name: String,
    pub disease_type: String,
    pub symptoms: Vec<String>,
    pub severity: String,
    /// `YYYY-MM-DD`
    pub diagnosis_date: String,
    pub diagnosis_method: String,
    pub treatment_provided: Option<String>,
    pub outcome: Option<String>,
    pub is_outbreak: Option<bool>,
    pub affected_animals_count: Option<u32>,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewCase> for NewDiseaseCase {
    type Error = SurveillanceError;

    fn try_from(case: FfiNewCase) -> Result<Self, Self::Error> {
        let disease_type = DiseaseType::parse(&case.disease_type).ok_or_else(|| {
            SurveillanceError::InvalidInput(format!("disease type {:?}", case.disease_type))
        })?;
        let severity = Severity::parse(&case.severity)
            .ok_or_else(|| SurveillanceError::InvalidInput(format!("severity {:?}", case.severity)))?;
        Ok(NewDiseaseCase {
            animal_id: case.animal_id,
            disease_name: case.disease_name,
            disease_type,
            symptoms: case.symptoms,
            severity,
            diagnosis_date: parse_ffi_date("diagnosisDate", &case.diagnosis_date)?,
            diagnosis_method: case.diagnosis_method,
            treatment_provided: case.treatment_provided,
            outcome: case.outcome,
            is_outbreak: case.is_outbreak,
            affected_animals_count: case.affected_animals_count,
            notes: case.notes,
        })
    }
}

/// FFI-safe disease case.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCase {
    pub id: String,
    pub report_id: String,
    pub animal_id: String,
    pub disease_name: String,
    pub disease_type: String,
    pub severity: String,
    pub outcome: String,
    pub status: String,
    pub location: FfiLocation,
    pub is_outbreak: bool,
    pub affected_animals_count: u32,
    pub diagnosis_date: String,
    pub reported_date: String,
}

impl From<DiseaseCase> for FfiCase {
    fn from(case: DiseaseCase) -> Self {
        let status = analytics::classify(&case).presentation_status;
        Self {
            id: case.id,
            report_id: case.report_id,
            animal_id: case.animal_id,
            disease_name: case.disease_name,
            disease_type: case.disease_type.as_str().to_string(),
            severity: case.severity.as_str().to_string(),
            outcome: case.outcome.as_str().to_string(),
            status: status.as_str().to_string(),
            location: case.location.into(),
            is_outbreak: case.is_outbreak,
            affected_animals_count: case.affected_animals_count,
            diagnosis_date: case.diagnosis_date.format("%Y-%m-%d").to_string(),
            reported_date: case.reported_date.to_rfc3339(),
        }
    }
}

/// FFI-safe outcome transition.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOutcomeTransition {
    pub case_id: String,
    pub report_id: String,
    pub animal_id: String,
    pub previous_outcome: String,
    pub outcome: String,
    pub health_status: String,
}

impl From<OutcomeTransition> for FfiOutcomeTransition {
    fn from(t: OutcomeTransition) -> Self {
        Self {
            case_id: t.case_id,
            report_id: t.report_id,
            animal_id: t.animal_id,
            previous_outcome: t.previous_outcome.as_str().to_string(),
            outcome: t.outcome.as_str().to_string(),
            health_status: t.health_status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn super_admin() -> Option<FfiCaller> {
        Some(FfiCaller {
            user_id: "root".into(),
            role: "super_admin".into(),
            province: None,
            district: None,
            sector: None,
        })
    }

    fn location() -> FfiLocation {
        FfiLocation {
            province: "Eastern".into(),
            district: "Nyagatare".into(),
            sector: "Karangazi".into(),
            cell: None,
            village: None,
            latitude: Some(-1.3),
            longitude: Some(30.3),
        }
    }

    #[test]
    fn test_ffi_round_trip() {
        let core = open_database_in_memory().unwrap();
        let animal = core
            .register_animal(
                super_admin(),
                FfiNewAnimal {
                    species: "cattle".into(),
                    breed: "Ankole".into(),
                    age: 4,
                    sex: "female".into(),
                    color: None,
                    identification_marks: None,
                    owner_name: "Habimana".into(),
                    owner_contact: "0788555444".into(),
                    owner_address: None,
                    location: location(),
                },
            )
            .unwrap();
        assert_eq!(animal.health_status, "healthy");

        let case = core
            .report_disease_case(
                super_admin(),
                FfiNewCase {
                    animal_id: animal.animal_id.clone(),
                    disease_name: "Lumpy skin disease".into(),
                    disease_type: "viral".into(),
                    symptoms: vec!["nodules".into()],
                    severity: "severe".into(),
                    diagnosis_date: "2026-06-01".into(),
                    diagnosis_method: "clinical".into(),
                    treatment_provided: None,
                    outcome: None,
                    is_outbreak: Some(true),
                    affected_animals_count: Some(3),
                    notes: None,
                },
            )
            .unwrap();
        assert_eq!(case.status, "active");

        let transition = core
            .apply_case_outcome(super_admin(), case.id.clone(), "under_treatment".into(), None, None)
            .unwrap();
        assert_eq!(transition.health_status, "under_treatment");

        let feed: serde_json::Value =
            serde_json::from_str(&core.get_geo_feed_json(super_admin(), None).unwrap()).unwrap();
        assert_eq!(feed["stats"]["byStatus"]["treated"], 1);

        let national: serde_json::Value =
            serde_json::from_str(&core.get_national_overview_json(super_admin()).unwrap()).unwrap();
        assert_eq!(national["overview"]["totalOutbreaks"], 1);
    }

    #[test]
    fn test_ffi_input_errors() {
        let core = open_database_in_memory().unwrap();
        let bad_role = Some(FfiCaller {
            user_id: "x".into(),
            role: "farmer".into(),
            province: None,
            district: None,
            sector: None,
        });
        assert!(matches!(
            core.get_scoped_dashboard_json(bad_role),
            Err(SurveillanceError::InvalidInput(_))
        ));
        assert!(matches!(
            core.get_scoped_dashboard_json(None),
            Err(SurveillanceError::Unauthenticated)
        ));
        let unknown_sector = Some(FfiCaller {
            user_id: "vet".into(),
            role: "veterinarian".into(),
            province: Some("Kigali City".into()),
            district: Some("Gasabo".into()),
            sector: Some("Atlantis".into()),
        });
        assert!(matches!(
            core.get_scoped_dashboard_json(unknown_sector),
            Err(SurveillanceError::InvalidInput(_))
        ));
        assert!(matches!(
            core.get_geo_feed_json(super_admin(), Some("{not json".into())),
            Err(SurveillanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hierarchy_listing() {
        let core = open_database_in_memory().unwrap();
        assert_eq!(core.list_provinces().len(), 5);
        assert!(core
            .list_sectors("Eastern".into(), "Nyagatare".into())
            .unwrap()
            .contains(&"Karangazi".to_string()));
        assert!(matches!(
            core.list_districts("Atlantis".into()),
            Err(SurveillanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sector_only_profile_is_placed() {
        let core = open_database_in_memory().unwrap();
        core.register_animal(
            super_admin(),
            FfiNewAnimal {
                species: "goats".into(),
                breed: "local".into(),
                age: 1,
                sex: "male".into(),
                color: None,
                identification_marks: None,
                owner_name: "Ingabire".into(),
                owner_contact: "0788111222".into(),
                owner_address: None,
                location: location(),
            },
        )
        .unwrap();

        let vet = |sector: &str| {
            Some(FfiCaller {
                user_id: "vet".into(),
                role: "veterinarian".into(),
                province: None,
                district: None,
                sector: Some(sector.into()),
            })
        };
        let dash: serde_json::Value =
            serde_json::from_str(&core.get_scoped_dashboard_json(vet("Karangazi")).unwrap()).unwrap();
        assert_eq!(dash["stats"]["totalAnimals"], 1);
        assert_eq!(core.list_owners(vet("Karangazi")).unwrap(), vec!["Ingabire"]);

        assert!(matches!(
            core.get_scoped_dashboard_json(vet("Remera")),
            Err(SurveillanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ffi_animal_edit_and_pages() {
        let core = open_database_in_memory().unwrap();
        let animal = core
            .register_animal(
                super_admin(),
                FfiNewAnimal {
                    species: "cattle".into(),
                    breed: "Friesian".into(),
                    age: 2,
                    sex: "female".into(),
                    color: None,
                    identification_marks: None,
                    owner_name: "Mugisha".into(),
                    owner_contact: "0788333444".into(),
                    owner_address: None,
                    location: location(),
                },
            )
            .unwrap();

        let moved = core
            .update_animal(
                super_admin(),
                animal.animal_id.clone(),
                FfiAnimalUpdate {
                    age: Some(3),
                    location: Some(FfiLocation {
                        district: "Kayonza".into(),
                        sector: "Gahini".into(),
                        ..location()
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.age, 3);
        assert_eq!(moved.location.sector, "Gahini");
        assert_eq!(core.get_animal(super_admin(), animal.id.clone()).unwrap().age, 3);

        let bad_sex = FfiAnimalUpdate {
            sex: Some("unknown".into()),
            ..Default::default()
        };
        assert!(matches!(
            core.update_animal(super_admin(), animal.id.clone(), bad_sex),
            Err(SurveillanceError::InvalidInput(_))
        ));

        let page: serde_json::Value = serde_json::from_str(
            &core
                .list_animals_page_json(super_admin(), Some(r#"{"page":1,"limit":10}"#.into()))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(page["total"], 1);
        assert_eq!(page["totalPages"], 1);
        assert_eq!(page["animals"][0]["location"]["sector"], "Gahini");
    }
}
