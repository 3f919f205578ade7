//! Caller-facing operations.
//!
//! Every operation takes the resolved caller (or `None` when the request is
//! unauthenticated), restricts reads to the caller's scope and maps store
//! failures onto [`SurveillanceError`].

use serde::{Deserialize, Serialize};

use crate::analytics::{
    DashboardBuilder, GeoFeed, GeoFeedBuilder, GeoFeedFilter, NationalOverview,
    NationalOverviewBuilder, ScopedDashboard,
};
use crate::config::EngineConfig;
use crate::consistency::{ConsistencyUpdater, OutcomeTransition, OutcomeUpdate};
use crate::db::{AnimalFilter, CaseFilter, Database};
use crate::location::LocationHierarchy;
use crate::models::{
    AnimalRecord, AnimalUpdate, Caller, DiseaseCase, NewAnimal, NewDiseaseCase,
    VaccinationRecord,
};
use crate::{SurveillanceError, SurveillanceResult};

/// A case together with its animal, if the animal still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetail {
    pub case: DiseaseCase,
    pub animal: Option<AnimalRecord>,
}

/// One page of the country-wide animal listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimalPageQuery {
    /// 1-based
    pub page: Option<usize>,
    /// Falls back to the configured page size
    pub limit: Option<usize>,
    /// `"all"` is the same as no value
    pub province: Option<String>,
    pub district: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalPage {
    pub animals: Vec<AnimalRecord>,
    pub total: u64,
    pub page: usize,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Service over one store.
pub struct Surveillance<'a> {
    db: &'a Database,
    config: &'a EngineConfig,
    hierarchy: &'a LocationHierarchy,
}

impl<'a> Surveillance<'a> {
    pub fn new(db: &'a Database, config: &'a EngineConfig, hierarchy: &'a LocationHierarchy) -> Self {
        Self {
            db,
            config,
            hierarchy,
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Dashboard for the caller's own scope.
    pub fn get_scoped_dashboard(&self, caller: Option<&Caller>) -> SurveillanceResult<ScopedDashboard> {
        let caller = authenticated(caller)?;
        Ok(DashboardBuilder::new(self.db, self.config).build(&caller.scope)?)
    }

    /// Country-wide overview. Super-admins only.
    pub fn get_national_overview(&self, caller: Option<&Caller>) -> SurveillanceResult<NationalOverview> {
        let caller = authenticated(caller)?;
        if !caller.is_super_admin() {
            tracing::warn!(user = %caller.user_id, role = caller.role.as_str(), "national overview refused");
            return Err(SurveillanceError::Unauthorized(
                "national overview requires super_admin".to_string(),
            ));
        }
        Ok(NationalOverviewBuilder::new(self.db, self.config).build()?)
    }

    /// Map feed within the caller's scope.
    pub fn get_geo_feed(&self, caller: Option<&Caller>, filter: &GeoFeedFilter) -> SurveillanceResult<GeoFeed> {
        let caller = authenticated(caller)?;
        if let (Some(from), Some(to)) = (filter.diagnosed_from, filter.diagnosed_to) {
            if from > to {
                return Err(SurveillanceError::InvalidInput(format!(
                    "diagnosis date range is empty: {} > {}",
                    from, to
                )));
            }
        }
        Ok(GeoFeedBuilder::new(self.db, self.config.geo_feed_limit).build(&caller.scope, filter)?)
    }

    // =========================================================================
    // Case lifecycle
    // =========================================================================

    /// Set a case outcome and the linked animal's health status together.
    pub fn apply_case_outcome(
        &self,
        caller: Option<&Caller>,
        case_id: &str,
        update: &OutcomeUpdate,
    ) -> SurveillanceResult<OutcomeTransition> {
        let caller = authenticated(caller)?;
        if update.outcome.trim().is_empty() {
            return Err(SurveillanceError::InvalidInput("outcome is required".to_string()));
        }
        tracing::debug!(user = %caller.user_id, case_id, "applying case outcome");
        Ok(ConsistencyUpdater::new(self.db).apply_outcome(case_id, update)?)
    }

    /// Report a new disease case against an existing animal.
    ///
    /// `animal_id` may be the store id or the animal's tag.
    pub fn report_disease_case(
        &self,
        caller: Option<&Caller>,
        report: NewDiseaseCase,
    ) -> SurveillanceResult<DiseaseCase> {
        let caller = authenticated(caller)?;
        require("diseaseName", &report.disease_name)?;
        require("diagnosisMethod", &report.diagnosis_method)?;

        let animal = self.find_animal(&report.animal_id)?;

        let report_id = self.db.next_report_id()?;
        let case = DiseaseCase::from_report(report_id, &animal, report, caller.user_id.clone());
        ConsistencyUpdater::new(self.db).record_new_case(&case)?;
        Ok(case)
    }

    /// A case and its animal.
    pub fn get_case_with_animal(&self, caller: Option<&Caller>, case_id: &str) -> SurveillanceResult<CaseDetail> {
        let caller = authenticated(caller)?;
        let case = self
            .db
            .get_case(case_id)?
            .ok_or_else(|| SurveillanceError::NotFound(format!("disease case {}", case_id)))?;
        if !caller.scope.contains(&case.location) {
            return Err(SurveillanceError::Unauthorized(format!(
                "case {} is outside the caller's area",
                case.report_id
            )));
        }
        let animal = self.db.get_animal(&case.animal_id)?;
        Ok(CaseDetail { case, animal })
    }

    // =========================================================================
    // Animals
    // =========================================================================

    /// Register an animal at a location known to the hierarchy.
    pub fn register_animal(&self, caller: Option<&Caller>, input: NewAnimal) -> SurveillanceResult<AnimalRecord> {
        let caller = authenticated(caller)?;
        require("species", &input.species)?;
        require("breed", &input.breed)?;
        require("ownerName", &input.owner_name)?;
        require("ownerContact", &input.owner_contact)?;
        self.hierarchy.validate(&input.location)?;

        let tx = self.db.transaction()?;
        let tag = self.db.next_animal_tag()?;
        let animal = AnimalRecord::register(tag, input, caller.user_id.clone());
        self.db.insert_animal(&animal)?;
        tx.commit().map_err(crate::db::DbError::from)?;

        tracing::info!(
            tag = %animal.animal_id,
            species = %animal.species,
            sector = %animal.location.sector,
            "animal registered"
        );
        Ok(animal)
    }

    /// One animal, by store id or tag, if it lies inside the caller's scope.
    pub fn get_animal(&self, caller: Option<&Caller>, animal_id: &str) -> SurveillanceResult<AnimalRecord> {
        let caller = authenticated(caller)?;
        let animal = self.find_animal(animal_id)?;
        if !caller.scope.contains(&animal.location) {
            return Err(SurveillanceError::Unauthorized(format!(
                "animal {} is outside the caller's area",
                animal.animal_id
            )));
        }
        Ok(animal)
    }

    /// Edit an animal's details or move it.
    ///
    /// Cases keep the location they were reported at.
    pub fn update_animal(
        &self,
        caller: Option<&Caller>,
        animal_id: &str,
        update: AnimalUpdate,
    ) -> SurveillanceResult<AnimalRecord> {
        authenticated(caller)?;
        if update.is_empty() {
            return Err(SurveillanceError::InvalidInput("no fields to update".to_string()));
        }
        let fields = [
            ("species", &update.species),
            ("breed", &update.breed),
            ("ownerName", &update.owner_name),
            ("ownerContact", &update.owner_contact),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if let Some(location) = &update.location {
            self.hierarchy.validate(location)?;
        }

        let mut animal = self.get_animal(caller, animal_id)?;
        let from_sector = animal.location.sector.clone();
        animal.apply(update);
        if !self.db.update_animal(&animal)? {
            return Err(SurveillanceError::NotFound(format!("animal {}", animal_id)));
        }
        tracing::info!(
            tag = %animal.animal_id,
            from = %from_sector,
            to = %animal.location.sector,
            "animal updated"
        );
        self.db
            .get_animal(&animal.id)?
            .ok_or_else(|| SurveillanceError::NotFound(format!("animal {}", animal_id)))
    }

    /// Distinct owner names within the caller's scope, sorted.
    pub fn list_owners(&self, caller: Option<&Caller>) -> SurveillanceResult<Vec<String>> {
        let caller = authenticated(caller)?;
        Ok(self.db.list_owners(&AnimalFilter::within(&caller.scope))?)
    }

    /// Country-wide paged animal listing, newest first. Super-admins only.
    pub fn list_animals_page(
        &self,
        caller: Option<&Caller>,
        query: &AnimalPageQuery,
    ) -> SurveillanceResult<AnimalPage> {
        let caller = authenticated(caller)?;
        if !caller.is_super_admin() {
            tracing::warn!(user = %caller.user_id, role = caller.role.as_str(), "animal listing refused");
            return Err(SurveillanceError::Unauthorized(
                "animal listing requires super_admin".to_string(),
            ));
        }
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(self.config.page_size);
        if page == 0 || limit == 0 {
            return Err(SurveillanceError::InvalidInput(
                "page and limit must be at least 1".to_string(),
            ));
        }

        let filter = AnimalFilter {
            province: selected(&query.province),
            district: selected(&query.district),
            search: query.search.clone(),
            limit: Some(limit),
            offset: Some((page - 1) * limit),
            ..Default::default()
        };
        let total = self.db.count_animals(&filter)?;
        let animals = self.db.list_animals(&filter)?;
        let total_pages = total.div_ceil(limit as u64);
        Ok(AnimalPage {
            animals,
            total,
            page,
            total_pages,
            has_next: (page as u64) < total_pages,
            has_prev: page > 1,
        })
    }

    /// Append a vaccination to an animal's history.
    pub fn record_vaccination(
        &self,
        caller: Option<&Caller>,
        animal_id: &str,
        record: VaccinationRecord,
    ) -> SurveillanceResult<AnimalRecord> {
        authenticated(caller)?;
        require("vaccineName", &record.vaccine_name)?;
        if let Some(next) = record.next_due_date {
            if next < record.date_administered {
                return Err(SurveillanceError::InvalidInput(
                    "next due date precedes administration date".to_string(),
                ));
            }
        }
        if !self.db.append_vaccination(animal_id, &record)? {
            return Err(SurveillanceError::NotFound(format!("animal {}", animal_id)));
        }
        tracing::info!(animal_id, vaccine = %record.vaccine_name, "vaccination recorded");
        self.db
            .get_animal(animal_id)?
            .ok_or_else(|| SurveillanceError::NotFound(format!("animal {}", animal_id)))
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Substring search over tag, owner and breed within the caller's scope.
    pub fn search_animals(&self, caller: Option<&Caller>, query: &str) -> SurveillanceResult<Vec<AnimalRecord>> {
        let caller = authenticated(caller)?;
        let filter = AnimalFilter {
            search: Some(query.to_string()),
            ..AnimalFilter::within(&caller.scope)
        }
        .with_limit(self.config.search_limit);
        Ok(self.db.list_animals(&filter)?)
    }

    /// Substring search over report id, disease name and animal id within the
    /// caller's scope.
    pub fn search_cases(&self, caller: Option<&Caller>, query: &str) -> SurveillanceResult<Vec<DiseaseCase>> {
        let caller = authenticated(caller)?;
        let filter = CaseFilter {
            search: Some(query.to_string()),
            ..CaseFilter::within(&caller.scope)
        }
        .with_limit(self.config.search_limit);
        Ok(self.db.list_cases(&filter)?)
    }
}

impl Surveillance<'_> {
    /// Look an animal up by store id, then by tag.
    fn find_animal(&self, id_or_tag: &str) -> SurveillanceResult<AnimalRecord> {
        match self.db.get_animal(id_or_tag)? {
            Some(animal) => Ok(animal),
            None => self
                .db
                .get_animal_by_tag(id_or_tag)?
                .ok_or_else(|| SurveillanceError::NotFound(format!("animal {}", id_or_tag))),
        }
    }
}

fn selected(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
        .map(str::to_string)
}

fn authenticated(caller: Option<&Caller>) -> SurveillanceResult<&Caller> {
    caller.ok_or(SurveillanceError::Unauthenticated)
}

fn require(field: &str, value: &str) -> SurveillanceResult<()> {
    if value.trim().is_empty() {
        return Err(SurveillanceError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
