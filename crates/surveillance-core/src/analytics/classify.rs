//! Per-case outbreak and status classification.

use serde::{Deserialize, Serialize};

use crate::models::{CaseOutcome, DiseaseCase, Severity};

/// Caller-facing label for a case's outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PresentationStatus {
    Active,
    Treated,
    Recovered,
    Deceased,
}

impl PresentationStatus {
    pub const ALL: [PresentationStatus; 4] = [
        PresentationStatus::Active,
        PresentationStatus::Treated,
        PresentationStatus::Recovered,
        PresentationStatus::Deceased,
    ];

    /// Map an outcome; anything unrecognized or missing is `Active`.
    pub fn from_outcome(outcome: Option<&CaseOutcome>) -> Self {
        match outcome {
            Some(CaseOutcome::Ongoing) => PresentationStatus::Active,
            Some(CaseOutcome::UnderTreatment) => PresentationStatus::Treated,
            Some(CaseOutcome::Recovered) => PresentationStatus::Recovered,
            Some(CaseOutcome::Deceased) => PresentationStatus::Deceased,
            Some(CaseOutcome::Unrecognized(_)) | None => PresentationStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationStatus::Active => "active",
            PresentationStatus::Treated => "treated",
            PresentationStatus::Recovered => "recovered",
            PresentationStatus::Deceased => "deceased",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        PresentationStatus::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// Derived classification of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseClassification {
    pub severity_bucket: Severity,
    /// 1 for outbreak cases, else 0
    pub outbreak_contribution: u64,
    pub presentation_status: PresentationStatus,
}

/// Classify a single case. Pure.
pub fn classify(case: &DiseaseCase) -> CaseClassification {
    CaseClassification {
        severity_bucket: case.severity,
        outbreak_contribution: u64::from(case.is_outbreak),
        presentation_status: PresentationStatus::from_outcome(Some(&case.outcome)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_outcomes() {
        let cases = [
            (CaseOutcome::Ongoing, PresentationStatus::Active),
            (CaseOutcome::UnderTreatment, PresentationStatus::Treated),
            (CaseOutcome::Recovered, PresentationStatus::Recovered),
            (CaseOutcome::Deceased, PresentationStatus::Deceased),
        ];
        for (outcome, expected) in cases {
            assert_eq!(PresentationStatus::from_outcome(Some(&outcome)), expected);
        }
    }

    #[test]
    fn test_fallback_is_active() {
        assert_eq!(PresentationStatus::from_outcome(None), PresentationStatus::Active);
        let odd = CaseOutcome::parse("euthanized");
        assert_eq!(
            PresentationStatus::from_outcome(Some(&odd)),
            PresentationStatus::Active
        );
        let empty = CaseOutcome::parse("");
        assert_eq!(
            PresentationStatus::from_outcome(Some(&empty)),
            PresentationStatus::Active
        );
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(
            serde_json::to_string(&PresentationStatus::Treated).unwrap(),
            "\"treated\""
        );
        assert_eq!(PresentationStatus::parse("recovered"), Some(PresentationStatus::Recovered));
        assert_eq!(PresentationStatus::parse("ongoing"), None);
    }
}
