//! Record filters and their SQL translation.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;

use super::{format_date, format_timestamp};
use crate::models::{CaseOutcome, DiseaseType, HealthStatus, Scope, Severity};

/// Field-equality/range predicates over animals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalFilter {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub species: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub registered_since: Option<DateTime<Utc>>,
    /// Case-insensitive substring over tag, owner name and breed
    pub search: Option<String>,
    pub limit: Option<usize>,
    /// Rows skipped before `limit` applies
    pub offset: Option<usize>,
}

impl AnimalFilter {
    /// Every animal inside a scope.
    pub fn within(scope: &Scope) -> Self {
        Self {
            province: scope.province.clone(),
            district: scope.district.clone(),
            sector: scope.sector.clone(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn to_where(&self) -> WhereClause {
        let mut w = WhereClause::default();
        w.eq("province", self.province.clone());
        w.eq("district", self.district.clone());
        w.eq("sector", self.sector.clone());
        w.eq("species", self.species.clone());
        w.eq("health_status", self.health_status.map(|s| s.as_str().to_string()));
        if let Some(since) = &self.registered_since {
            w.push("registered_date >= ?", format_timestamp(since));
        }
        if let Some(term) = non_blank(&self.search) {
            w.search(&["animal_id", "owner_name", "breed"], term);
        }
        w
    }
}

/// Field-equality/range predicates over disease cases.
///
/// Location predicates apply to the case's own location snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    /// Store identifier of the animal
    pub animal_id: Option<String>,
    pub disease_type: Option<DiseaseType>,
    pub severity: Option<Severity>,
    pub outcome: Option<CaseOutcome>,
    pub is_outbreak: Option<bool>,
    /// Inclusive
    pub diagnosed_from: Option<NaiveDate>,
    /// Inclusive
    pub diagnosed_to: Option<NaiveDate>,
    pub reported_since: Option<DateTime<Utc>>,
    pub require_coordinates: bool,
    /// Case-insensitive substring over report id, disease name and animal id
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl CaseFilter {
    /// Every case reported inside a scope.
    pub fn within(scope: &Scope) -> Self {
        Self {
            province: scope.province.clone(),
            district: scope.district.clone(),
            sector: scope.sector.clone(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn to_where(&self) -> WhereClause {
        let mut w = WhereClause::default();
        w.eq("province", self.province.clone());
        w.eq("district", self.district.clone());
        w.eq("sector", self.sector.clone());
        w.eq("animal_ref", self.animal_id.clone());
        w.eq("disease_type", self.disease_type.map(|t| t.as_str().to_string()));
        w.eq("severity", self.severity.map(|s| s.as_str().to_string()));
        w.eq("outcome", self.outcome.as_ref().map(|o| o.as_str().to_string()));
        if let Some(flag) = self.is_outbreak {
            w.push("is_outbreak = ?", i64::from(flag));
        }
        if let Some(from) = &self.diagnosed_from {
            w.push("diagnosis_date >= ?", format_date(from));
        }
        if let Some(to) = &self.diagnosed_to {
            w.push("diagnosis_date <= ?", format_date(to));
        }
        if let Some(since) = &self.reported_since {
            w.push("reported_date >= ?", format_timestamp(since));
        }
        if self.require_coordinates {
            w.clauses
                .push("latitude IS NOT NULL AND longitude IS NOT NULL".to_string());
        }
        if let Some(term) = non_blank(&self.search) {
            w.search(&["report_id", "disease_name", "animal_ref"], term);
        }
        w
    }
}

/// Accumulated WHERE clause with positional parameters.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    fn eq(&mut self, column: &str, value: Option<String>) {
        if let Some(value) = value {
            self.push(&format!("{} = ?", column), value);
        }
    }

    fn push(&mut self, clause: &str, param: impl Into<Value>) {
        self.clauses.push(clause.to_string());
        self.params.push(param.into());
    }

    fn search(&mut self, columns: &[&str], term: &str) {
        let pattern = format!("%{}%", escape_like(term));
        let ors: Vec<String> = columns
            .iter()
            .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
            .collect();
        self.clauses.push(format!("({})", ors.join(" OR ")));
        for _ in columns {
            self.params.push(Value::Text(pattern.clone()));
        }
    }

    /// `WHERE ...` (or empty), followed by ordering and an optional limit.
    pub(crate) fn finish(self, order_by: &str, limit: Option<usize>) -> (String, Vec<Value>) {
        self.finish_paged(order_by, limit, None)
    }

    /// [`WhereClause::finish`] that also skips `offset` rows.
    pub(crate) fn finish_paged(
        mut self,
        order_by: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> (String, Vec<Value>) {
        let mut sql = self.predicate_sql();
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
        if limit.is_some() || offset.is_some() {
            // SQLite only accepts OFFSET after LIMIT; -1 means no limit
            sql.push_str(" LIMIT ?");
            self.params
                .push(Value::Integer(limit.map_or(-1, |l| l as i64)));
        }
        if let Some(offset) = offset {
            sql.push_str(" OFFSET ?");
            self.params.push(Value::Integer(offset as i64));
        }
        (sql, self.params)
    }

    /// `WHERE ...` (or empty) with no ordering, for aggregate queries.
    pub(crate) fn finish_unordered(self) -> (String, Vec<Value>) {
        (self.predicate_sql(), self.params)
    }

    fn predicate_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where() {
        let (sql, params) = AnimalFilter::default().to_where().finish("id", None);
        assert_eq!(sql, " ORDER BY id");
        assert!(params.is_empty());
    }

    #[test]
    fn test_scope_becomes_equality_predicates() {
        let scope = Scope::sector("Kigali City", "Gasabo", "Kimironko");
        let (sql, params) = CaseFilter::within(&scope).to_where().finish("id", Some(10));
        assert!(sql.contains("province = ?"));
        assert!(sql.contains("district = ?"));
        assert!(sql.contains("sector = ?"));
        assert!(sql.ends_with("LIMIT ?"));
        assert_eq!(params.len(), 4);
        assert_eq!(params[3], Value::Integer(10));
    }

    #[test]
    fn test_search_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        let filter = AnimalFilter {
            search: Some("  ank ".into()),
            ..Default::default()
        };
        let (sql, params) = filter.to_where().finish("id", None);
        assert!(sql.contains("animal_id LIKE ?"));
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Value::Text("%ank%".into()));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = CaseFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        let (sql, _) = filter.to_where().finish("id", None);
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn test_paging_sql() {
        let filter = AnimalFilter {
            province: Some("Eastern".into()),
            ..Default::default()
        };
        let (sql, params) = filter.to_where().finish_paged("id", Some(20), Some(40));
        assert_eq!(sql, " WHERE province = ? ORDER BY id LIMIT ? OFFSET ?");
        assert_eq!(params[1], Value::Integer(20));
        assert_eq!(params[2], Value::Integer(40));

        let (sql, params) = AnimalFilter::default().to_where().finish_paged("id", None, Some(5));
        assert_eq!(sql, " ORDER BY id LIMIT ? OFFSET ?");
        assert_eq!(params, vec![Value::Integer(-1), Value::Integer(5)]);

        let (sql, _) = filter.to_where().finish_unordered();
        assert_eq!(sql, " WHERE province = ?");
    }
}
