//! Keeps an animal's health status in line with its disease cases.
//!
//! Every write that sets a case outcome also sets the linked animal's health
//! status, inside one transaction. If the animal cannot be updated the case
//! write is rolled back.

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbError, DbResult};
use crate::models::{CaseOutcome, DiseaseCase, HealthStatus};

/// Health status implied by a case outcome.
///
/// Ongoing and unrecognized outcomes mean the animal is sick.
pub fn health_status_for_outcome(outcome: &CaseOutcome) -> HealthStatus {
    match outcome {
        CaseOutcome::Recovered => HealthStatus::Recovered,
        CaseOutcome::Deceased => HealthStatus::Deceased,
        CaseOutcome::UnderTreatment => HealthStatus::UnderTreatment,
        CaseOutcome::Ongoing | CaseOutcome::Unrecognized(_) => HealthStatus::Sick,
    }
}

/// Requested change to a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeUpdate {
    /// Raw outcome string; unknown values are stored as given
    pub outcome: String,
    #[serde(default)]
    pub treatment_provided: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OutcomeUpdate {
    pub fn new(outcome: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            ..Default::default()
        }
    }
}

/// What an outcome write changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeTransition {
    pub case_id: String,
    pub report_id: String,
    pub animal_id: String,
    pub previous_outcome: CaseOutcome,
    pub outcome: CaseOutcome,
    pub health_status: HealthStatus,
}

/// Applies case writes together with their animal-side effect.
pub struct ConsistencyUpdater<'a> {
    db: &'a Database,
}

impl<'a> ConsistencyUpdater<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Change a case's outcome and update its animal.
    pub fn apply_outcome(&self, case_id: &str, update: &OutcomeUpdate) -> DbResult<OutcomeTransition> {
        let tx = self.db.transaction()?;

        let case = self
            .db
            .get_case(case_id)?
            .ok_or_else(|| DbError::NotFound(format!("disease case {}", case_id)))?;
        let next = CaseOutcome::parse(update.outcome.trim());

        if case.outcome.is_terminal() && case.outcome != next {
            tracing::warn!(
                case = %case.report_id,
                from = case.outcome.as_str(),
                to = next.as_str(),
                "rewriting outcome of a closed case"
            );
        } else if !case.outcome.is_forward_transition(&next) {
            tracing::debug!(
                case = %case.report_id,
                from = case.outcome.as_str(),
                to = next.as_str(),
                "out-of-order outcome change"
            );
        }

        self.db.set_case_outcome(
            &case.id,
            &next,
            update.treatment_provided.as_deref(),
            update.notes.as_deref(),
        )?;

        let health_status = health_status_for_outcome(&next);
        if !self.db.set_health_status(&case.animal_id, health_status)? {
            // tx is dropped here, rolling back the case write
            return Err(DbError::NotFound(format!(
                "animal {} linked to case {}",
                case.animal_id, case.report_id
            )));
        }

        tx.commit()?;
        tracing::info!(
            case = %case.report_id,
            outcome = next.as_str(),
            health_status = health_status.as_str(),
            "case outcome updated"
        );

        Ok(OutcomeTransition {
            case_id: case.id,
            report_id: case.report_id,
            animal_id: case.animal_id,
            previous_outcome: case.outcome,
            outcome: next,
            health_status,
        })
    }

    /// Store a new case and set its animal's health status from the case outcome.
    pub fn record_new_case(&self, case: &DiseaseCase) -> DbResult<HealthStatus> {
        let tx = self.db.transaction()?;
        self.db.insert_case(case)?;

        let health_status = health_status_for_outcome(&case.outcome);
        if !self.db.set_health_status(&case.animal_id, health_status)? {
            return Err(DbError::NotFound(format!("animal {}", case.animal_id)));
        }

        tx.commit()?;
        tracing::info!(
            case = %case.report_id,
            disease = %case.disease_name,
            outbreak = case.is_outbreak,
            "disease case reported"
        );
        Ok(health_status)
    }
}
