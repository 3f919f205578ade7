//! Disease case models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::animal::AnimalRecord;
use super::location::LocationSnapshot;

/// Broad pathogen class of a disease.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseType {
    Viral,
    Bacterial,
    Parasitic,
    Fungal,
    Other,
}

impl DiseaseType {
    pub const ALL: [DiseaseType; 5] = [
        DiseaseType::Viral,
        DiseaseType::Bacterial,
        DiseaseType::Parasitic,
        DiseaseType::Fungal,
        DiseaseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseType::Viral => "viral",
            DiseaseType::Bacterial => "bacterial",
            DiseaseType::Parasitic => "parasitic",
            DiseaseType::Fungal => "fungal",
            DiseaseType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        DiseaseType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Clinical severity, ordered by increasing risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Severity::ALL.into_iter().find(|sev| sev.as_str() == s)
    }
}

/// Outcome of a disease case.
///
/// Values outside the four known outcomes are kept verbatim so that the
/// store round-trips them; every consumer treats them with an explicit
/// fallback rather than rejecting the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseOutcome {
    #[default]
    Ongoing,
    UnderTreatment,
    Recovered,
    Deceased,
    Unrecognized(String),
}

impl CaseOutcome {
    /// Parse any outcome string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "ongoing" => CaseOutcome::Ongoing,
            "under_treatment" => CaseOutcome::UnderTreatment,
            "recovered" => CaseOutcome::Recovered,
            "deceased" => CaseOutcome::Deceased,
            other => CaseOutcome::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CaseOutcome::Ongoing => "ongoing",
            CaseOutcome::UnderTreatment => "under_treatment",
            CaseOutcome::Recovered => "recovered",
            CaseOutcome::Deceased => "deceased",
            CaseOutcome::Unrecognized(raw) => raw,
        }
    }

    /// Recovered and deceased cases are closed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseOutcome::Recovered | CaseOutcome::Deceased)
    }

    /// Whether moving to `next` follows the case lifecycle
    /// (ongoing → under_treatment → recovered | deceased, with the
    /// shortcut ongoing → recovered | deceased).
    pub fn is_forward_transition(&self, next: &CaseOutcome) -> bool {
        match (self, next) {
            (CaseOutcome::Ongoing, CaseOutcome::UnderTreatment)
            | (CaseOutcome::Ongoing, CaseOutcome::Recovered)
            | (CaseOutcome::Ongoing, CaseOutcome::Deceased)
            | (CaseOutcome::UnderTreatment, CaseOutcome::Recovered)
            | (CaseOutcome::UnderTreatment, CaseOutcome::Deceased) => true,
            (a, b) => a == b && !a.is_terminal(),
        }
    }
}

impl From<String> for CaseOutcome {
    fn from(s: String) -> Self {
        CaseOutcome::parse(&s)
    }
}

impl From<CaseOutcome> for String {
    fn from(outcome: CaseOutcome) -> Self {
        match outcome {
            CaseOutcome::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Animal attributes copied onto the case at report time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalDetails {
    pub species: String,
    pub breed: String,
    pub age: u32,
}

/// A new disease report as submitted by a veterinarian.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDiseaseCase {
    /// Store identifier of the affected animal
    pub animal_id: String,
    pub disease_name: String,
    pub disease_type: DiseaseType,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub diagnosis_date: NaiveDate,
    pub diagnosis_method: String,
    #[serde(default)]
    pub treatment_provided: Option<String>,
    /// Defaults to "ongoing"
    #[serde(default)]
    pub outcome: Option<String>,
    /// Defaults to false
    #[serde(default)]
    pub is_outbreak: Option<bool>,
    /// Defaults to 1
    #[serde(default)]
    pub affected_animals_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A reported disease case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseCase {
    /// Store identifier (UUID)
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-facing id, e.g. "DIS000007"
    pub report_id: String,
    /// Store identifier of the affected animal
    pub animal_id: String,
    pub animal_details: AnimalDetails,
    pub disease_name: String,
    pub disease_type: DiseaseType,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub diagnosis_date: NaiveDate,
    pub diagnosis_method: String,
    pub treatment_provided: Option<String>,
    pub outcome: CaseOutcome,
    /// Where the animal was when the case was reported
    pub location: LocationSnapshot,
    /// Reporting user
    pub reported_by: String,
    pub reported_date: DateTime<Utc>,
    pub is_outbreak: bool,
    pub affected_animals_count: u32,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DiseaseCase {
    /// Build a case from a report, snapshotting the animal as it is now.
    pub fn from_report(
        report_id: String,
        animal: &AnimalRecord,
        report: NewDiseaseCase,
        reported_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            report_id,
            animal_id: animal.id.clone(),
            animal_details: AnimalDetails {
                species: animal.species.clone(),
                breed: animal.breed.clone(),
                age: animal.age,
            },
            disease_name: report.disease_name,
            disease_type: report.disease_type,
            symptoms: report.symptoms,
            severity: report.severity,
            diagnosis_date: report.diagnosis_date,
            diagnosis_method: report.diagnosis_method,
            treatment_provided: report.treatment_provided,
            outcome: report
                .outcome
                .filter(|o| !o.trim().is_empty())
                .map(|o| CaseOutcome::parse(&o))
                .unwrap_or_default(),
            location: animal.location.clone(),
            reported_by,
            reported_date: now,
            is_outbreak: report.is_outbreak.unwrap_or(false),
            affected_animals_count: report.affected_animals_count.unwrap_or(1),
            notes: report.notes,
            updated_at: now,
        }
    }
}
