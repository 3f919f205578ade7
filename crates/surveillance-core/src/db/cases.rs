//! Disease case database operations.

use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{
    format_date, format_timestamp, parse_date, parse_timestamp, CaseFilter, Database, DbError,
    DbResult,
};
use crate::models::{
    AnimalDetails, CaseOutcome, DiseaseCase, DiseaseType, LocationSnapshot, Severity,
};

const CASE_COLUMNS: &str = r#"
    id, report_id, animal_ref, animal_species, animal_breed, animal_age,
    disease_name, disease_type, symptoms, severity, diagnosis_date,
    diagnosis_method, treatment_provided, outcome, province, district, sector,
    cell, village, latitude, longitude, reported_by, reported_date, is_outbreak,
    affected_animals_count, notes, updated_at
"#;

impl Database {
    /// Reserve the next human-facing report id.
    pub fn next_report_id(&self) -> DbResult<String> {
        let n = self.next_sequence("disease_case")?;
        Ok(format!("DIS{:06}", n))
    }

    /// Insert a new disease case.
    pub fn insert_case(&self, case: &DiseaseCase) -> DbResult<()> {
        let symptoms_json = serde_json::to_string(&case.symptoms)?;
        self.conn.execute(
            &format!(
                "INSERT INTO disease_cases ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, \
                 ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, \
                 ?25, ?26, ?27)",
                CASE_COLUMNS
            ),
            params![
                case.id,
                case.report_id,
                case.animal_id,
                case.animal_details.species,
                case.animal_details.breed,
                case.animal_details.age,
                case.disease_name,
                case.disease_type.as_str(),
                symptoms_json,
                case.severity.as_str(),
                format_date(&case.diagnosis_date),
                case.diagnosis_method,
                case.treatment_provided,
                case.outcome.as_str(),
                case.location.province,
                case.location.district,
                case.location.sector,
                case.location.cell,
                case.location.village,
                case.location.latitude,
                case.location.longitude,
                case.reported_by,
                format_timestamp(&case.reported_date),
                case.is_outbreak,
                case.affected_animals_count,
                case.notes,
                format_timestamp(&case.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Write a new outcome, optionally replacing treatment and notes.
    ///
    /// The location snapshot is never touched here.
    pub fn set_case_outcome(
        &self,
        id: &str,
        outcome: &CaseOutcome,
        treatment_provided: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE disease_cases SET
                outcome = ?2,
                treatment_provided = COALESCE(?3, treatment_provided),
                notes = COALESCE(?4, notes),
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                outcome.as_str(),
                treatment_provided,
                notes,
                format_timestamp(&Utc::now()),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a case by store ID.
    pub fn get_case(&self, id: &str) -> DbResult<Option<DiseaseCase>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM disease_cases WHERE id = ?", CASE_COLUMNS),
                [id],
                CaseRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List cases matching a filter, newest report first.
    pub fn list_cases(&self, filter: &CaseFilter) -> DbResult<Vec<DiseaseCase>> {
        let (where_sql, params) = filter
            .to_where()
            .finish("reported_date DESC, report_id DESC", filter.limit);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM disease_cases{}", CASE_COLUMNS, where_sql))?;
        let rows = stmt.query_map(params_from_iter(params.iter()), CaseRow::from_row)?;

        let mut cases = Vec::new();
        for row in rows {
            cases.push(row?.try_into()?);
        }
        tracing::debug!(count = cases.len(), "fetched disease cases");
        Ok(cases)
    }
}

/// Intermediate row struct for database mapping.
struct CaseRow {
    id: String,
    report_id: String,
    animal_ref: String,
    animal_species: String,
    animal_breed: String,
    animal_age: u32,
    disease_name: String,
    disease_type: String,
    symptoms: String,
    severity: String,
    diagnosis_date: String,
    diagnosis_method: String,
    treatment_provided: Option<String>,
    outcome: String,
    province: String,
    district: String,
    sector: String,
    cell: Option<String>,
    village: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    reported_by: String,
    reported_date: String,
    is_outbreak: bool,
    affected_animals_count: u32,
    notes: Option<String>,
    updated_at: String,
}

impl CaseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            report_id: row.get(1)?,
            animal_ref: row.get(2)?,
            animal_species: row.get(3)?,
            animal_breed: row.get(4)?,
            animal_age: row.get(5)?,
            disease_name: row.get(6)?,
            disease_type: row.get(7)?,
            symptoms: row.get(8)?,
            severity: row.get(9)?,
            diagnosis_date: row.get(10)?,
            diagnosis_method: row.get(11)?,
            treatment_provided: row.get(12)?,
            outcome: row.get(13)?,
            province: row.get(14)?,
            district: row.get(15)?,
            sector: row.get(16)?,
            cell: row.get(17)?,
            village: row.get(18)?,
            latitude: row.get(19)?,
            longitude: row.get(20)?,
            reported_by: row.get(21)?,
            reported_date: row.get(22)?,
            is_outbreak: row.get(23)?,
            affected_animals_count: row.get(24)?,
            notes: row.get(25)?,
            updated_at: row.get(26)?,
        })
    }
}

impl TryFrom<CaseRow> for DiseaseCase {
    type Error = DbError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let disease_type = DiseaseType::parse(&row.disease_type).ok_or_else(|| {
            DbError::Malformed(format!("disease type {:?} on case {}", row.disease_type, row.id))
        })?;
        let severity = Severity::parse(&row.severity).ok_or_else(|| {
            DbError::Malformed(format!("severity {:?} on case {}", row.severity, row.id))
        })?;
        let symptoms: Vec<String> = serde_json::from_str(&row.symptoms)?;

        Ok(DiseaseCase {
            id: row.id,
            report_id: row.report_id,
            animal_id: row.animal_ref,
            animal_details: AnimalDetails {
                species: row.animal_species,
                breed: row.animal_breed,
                age: row.animal_age,
            },
            disease_name: row.disease_name,
            disease_type,
            symptoms,
            severity,
            diagnosis_date: parse_date(&row.diagnosis_date)?,
            diagnosis_method: row.diagnosis_method,
            treatment_provided: row.treatment_provided,
            outcome: CaseOutcome::parse(&row.outcome),
            location: LocationSnapshot {
                province: row.province,
                district: row.district,
                sector: row.sector,
                cell: row.cell,
                village: row.village,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            reported_by: row.reported_by,
            reported_date: parse_timestamp(&row.reported_date)?,
            is_outbreak: row.is_outbreak,
            affected_animals_count: row.affected_animals_count,
            notes: row.notes,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
