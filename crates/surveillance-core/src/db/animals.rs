//! Animal database operations.

use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, AnimalFilter, Database, DbError, DbResult};
use crate::models::{AnimalRecord, HealthStatus, LocationSnapshot, Sex, VaccinationRecord};

const ANIMAL_COLUMNS: &str = r#"
    id, animal_id, species, breed, age, sex, color, identification_marks,
    owner_name, owner_contact, owner_address, province, district, sector, cell,
    village, latitude, longitude, health_status, vaccination_history,
    registered_by, registered_date, last_updated
"#;

impl Database {
    /// Reserve the next human-facing animal tag.
    pub fn next_animal_tag(&self) -> DbResult<String> {
        let n = self.next_sequence("animal")?;
        Ok(format!("ANM{:06}", n))
    }

    /// Insert a new animal.
    pub fn insert_animal(&self, animal: &AnimalRecord) -> DbResult<()> {
        let vaccinations_json = serde_json::to_string(&animal.vaccination_history)?;
        self.conn.execute(
            &format!(
                "INSERT INTO animals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, \
                 ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
                ANIMAL_COLUMNS
            ),
            params![
                animal.id,
                animal.animal_id,
                animal.species,
                animal.breed,
                animal.age,
                animal.sex.as_str(),
                animal.color,
                animal.identification_marks,
                animal.owner_name,
                animal.owner_contact,
                animal.owner_address,
                animal.location.province,
                animal.location.district,
                animal.location.sector,
                animal.location.cell,
                animal.location.village,
                animal.location.latitude,
                animal.location.longitude,
                animal.health_status.as_str(),
                vaccinations_json,
                animal.registered_by,
                format_timestamp(&animal.registered_date),
                format_timestamp(&animal.last_updated),
            ],
        )?;
        Ok(())
    }

    /// Update an animal's editable fields.
    pub fn update_animal(&self, animal: &AnimalRecord) -> DbResult<bool> {
        let vaccinations_json = serde_json::to_string(&animal.vaccination_history)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE animals SET
                species = ?2,
                breed = ?3,
                age = ?4,
                sex = ?5,
                color = ?6,
                identification_marks = ?7,
                owner_name = ?8,
                owner_contact = ?9,
                owner_address = ?10,
                province = ?11,
                district = ?12,
                sector = ?13,
                cell = ?14,
                village = ?15,
                latitude = ?16,
                longitude = ?17,
                health_status = ?18,
                vaccination_history = ?19,
                last_updated = ?20
            WHERE id = ?1
            "#,
            params![
                animal.id,
                animal.species,
                animal.breed,
                animal.age,
                animal.sex.as_str(),
                animal.color,
                animal.identification_marks,
                animal.owner_name,
                animal.owner_contact,
                animal.owner_address,
                animal.location.province,
                animal.location.district,
                animal.location.sector,
                animal.location.cell,
                animal.location.village,
                animal.location.latitude,
                animal.location.longitude,
                animal.health_status.as_str(),
                vaccinations_json,
                format_timestamp(&Utc::now()),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Set only the health status.
    pub fn set_health_status(&self, id: &str, status: HealthStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE animals SET health_status = ?2, last_updated = ?3 WHERE id = ?1",
            params![id, status.as_str(), format_timestamp(&Utc::now())],
        )?;
        Ok(rows_affected > 0)
    }

    /// Append a vaccination to an animal's history.
    pub fn append_vaccination(&self, id: &str, record: &VaccinationRecord) -> DbResult<bool> {
        let Some(mut animal) = self.get_animal(id)? else {
            return Ok(false);
        };
        animal.vaccination_history.push(record.clone());
        self.update_animal(&animal)
    }

    /// Get an animal by store ID.
    pub fn get_animal(&self, id: &str) -> DbResult<Option<AnimalRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM animals WHERE id = ?", ANIMAL_COLUMNS),
                [id],
                AnimalRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get an animal by its human-facing tag.
    pub fn get_animal_by_tag(&self, tag: &str) -> DbResult<Option<AnimalRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM animals WHERE animal_id = ?", ANIMAL_COLUMNS),
                [tag],
                AnimalRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Fetch several animals by store ID. Missing IDs are skipped.
    pub fn get_animals_by_ids(&self, ids: &[String]) -> DbResult<Vec<AnimalRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals WHERE id IN ({})",
            ANIMAL_COLUMNS, placeholders
        ))?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(row?.try_into()?);
        }
        Ok(animals)
    }

    /// List animals matching a filter, newest registration first.
    pub fn list_animals(&self, filter: &AnimalFilter) -> DbResult<Vec<AnimalRecord>> {
        let (where_sql, params) = filter
            .to_where()
            .finish_paged("registered_date DESC, animal_id DESC", filter.limit, filter.offset);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM animals{}", ANIMAL_COLUMNS, where_sql))?;
        let rows = stmt.query_map(params_from_iter(params.iter()), AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(row?.try_into()?);
        }
        tracing::debug!(count = animals.len(), "fetched animals");
        Ok(animals)
    }

    /// Count animals matching a filter. Limit and offset are ignored.
    pub fn count_animals(&self, filter: &AnimalFilter) -> DbResult<u64> {
        let (where_sql, params) = filter.to_where().finish_unordered();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM animals{}", where_sql),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Distinct owner names of the matching animals, sorted.
    pub fn list_owners(&self, filter: &AnimalFilter) -> DbResult<Vec<String>> {
        let (where_sql, params) = filter.to_where().finish("owner_name", filter.limit);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT DISTINCT owner_name FROM animals{}", where_sql))?;
        let owners = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(owners)
    }

    /// Delete an animal. Its cases are kept.
    pub fn delete_animal(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM animals WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct AnimalRow {
    id: String,
    animal_id: String,
    species: String,
    breed: String,
    age: u32,
    sex: String,
    color: Option<String>,
    identification_marks: Option<String>,
    owner_name: String,
    owner_contact: String,
    owner_address: Option<String>,
    province: String,
    district: String,
    sector: String,
    cell: Option<String>,
    village: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    health_status: String,
    vaccination_history: String,
    registered_by: String,
    registered_date: String,
    last_updated: String,
}

impl AnimalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            animal_id: row.get(1)?,
            species: row.get(2)?,
            breed: row.get(3)?,
            age: row.get(4)?,
            sex: row.get(5)?,
            color: row.get(6)?,
            identification_marks: row.get(7)?,
            owner_name: row.get(8)?,
            owner_contact: row.get(9)?,
            owner_address: row.get(10)?,
            province: row.get(11)?,
            district: row.get(12)?,
            sector: row.get(13)?,
            cell: row.get(14)?,
            village: row.get(15)?,
            latitude: row.get(16)?,
            longitude: row.get(17)?,
            health_status: row.get(18)?,
            vaccination_history: row.get(19)?,
            registered_by: row.get(20)?,
            registered_date: row.get(21)?,
            last_updated: row.get(22)?,
        })
    }
}

impl TryFrom<AnimalRow> for AnimalRecord {
    type Error = DbError;

    fn try_from(row: AnimalRow) -> Result<Self, Self::Error> {
        let health_status = HealthStatus::parse(&row.health_status).ok_or_else(|| {
            DbError::Malformed(format!("health status {:?} on animal {}", row.health_status, row.id))
        })?;
        let sex = Sex::parse(&row.sex)
            .ok_or_else(|| DbError::Malformed(format!("sex {:?} on animal {}", row.sex, row.id)))?;
        let vaccination_history: Vec<VaccinationRecord> =
            serde_json::from_str(&row.vaccination_history)?;

        Ok(AnimalRecord {
            id: row.id,
            animal_id: row.animal_id,
            species: row.species,
            breed: row.breed,
            age: row.age,
            sex,
            color: row.color,
            identification_marks: row.identification_marks,
            owner_name: row.owner_name,
            owner_contact: row.owner_contact,
            owner_address: row.owner_address,
            location: LocationSnapshot {
                province: row.province,
                district: row.district,
                sector: row.sector,
                cell: row.cell,
                village: row.village,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            health_status,
            vaccination_history,
            registered_by: row.registered_by,
            registered_date: parse_timestamp(&row.registered_date)?,
            last_updated: parse_timestamp(&row.last_updated)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAnimal;
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_animal(db: &Database, species: &str, sector: &str) -> AnimalRecord {
        let tag = db.next_animal_tag().unwrap();
        AnimalRecord::register(
            tag,
            NewAnimal {
                species: species.into(),
                breed: "Ankole".into(),
                age: 3,
                sex: Sex::Female,
                color: Some("brown".into()),
                identification_marks: None,
                owner_name: "Mukamana".into(),
                owner_contact: "0788123456".into(),
                owner_address: None,
                location: LocationSnapshot::new("Kigali City", "Gasabo", sector)
                    .with_coordinates(-1.95, 30.10),
            },
            "vet-1".into(),
        )
    }

    #[test]
    fn test_tags_are_sequential() {
        let db = setup_db();
        assert_eq!(db.next_animal_tag().unwrap(), "ANM000001");
        assert_eq!(db.next_animal_tag().unwrap(), "ANM000002");
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let animal = make_animal(&db, "cattle", "Kimironko");
        db.insert_animal(&animal).unwrap();

        let retrieved = db.get_animal(&animal.id).unwrap().unwrap();
        assert_eq!(retrieved.animal_id, "ANM000001");
        assert_eq!(retrieved.species, "cattle");
        assert_eq!(retrieved.location, animal.location);
        assert_eq!(retrieved.health_status, HealthStatus::Healthy);
        assert_eq!(retrieved.color, Some("brown".into()));

        let by_tag = db.get_animal_by_tag("ANM000001").unwrap().unwrap();
        assert_eq!(by_tag.id, animal.id);
    }

    #[test]
    fn test_set_health_status() {
        let db = setup_db();
        let animal = make_animal(&db, "cattle", "Kimironko");
        db.insert_animal(&animal).unwrap();

        assert!(db.set_health_status(&animal.id, HealthStatus::Sick).unwrap());
        assert!(!db.set_health_status("missing", HealthStatus::Sick).unwrap());

        let retrieved = db.get_animal(&animal.id).unwrap().unwrap();
        assert_eq!(retrieved.health_status, HealthStatus::Sick);
    }

    #[test]
    fn test_append_vaccination_keeps_order() {
        let db = setup_db();
        let animal = make_animal(&db, "cattle", "Kimironko");
        db.insert_animal(&animal).unwrap();

        for (name, day) in [("Anthrax", 1), ("Lumpy skin", 20)] {
            let record = VaccinationRecord {
                vaccine_name: name.into(),
                date_administered: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
                next_due_date: None,
                administered_by: "vet-1".into(),
            };
            assert!(db.append_vaccination(&animal.id, &record).unwrap());
        }

        let retrieved = db.get_animal(&animal.id).unwrap().unwrap();
        let names: Vec<_> = retrieved
            .vaccination_history
            .iter()
            .map(|v| v.vaccine_name.as_str())
            .collect();
        assert_eq!(names, vec!["Anthrax", "Lumpy skin"]);
    }

    #[test]
    fn test_list_with_filters() {
        let db = setup_db();
        for (species, sector) in [
            ("cattle", "Kimironko"),
            ("goats", "Kimironko"),
            ("cattle", "Remera"),
        ] {
            db.insert_animal(&make_animal(&db, species, sector)).unwrap();
        }

        let all = db.list_animals(&AnimalFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let filter = AnimalFilter {
            sector: Some("Kimironko".into()),
            species: Some("cattle".into()),
            ..Default::default()
        };
        assert_eq!(db.list_animals(&filter).unwrap().len(), 1);

        let search = AnimalFilter {
            search: Some("anm000002".into()),
            ..Default::default()
        };
        let found = db.list_animals(&search).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].species, "goats");

        let limited = db
            .list_animals(&AnimalFilter::default().with_limit(2))
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_paging_and_count() {
        let db = setup_db();
        for sector in ["Kimironko", "Kimironko", "Kimironko", "Remera", "Remera"] {
            db.insert_animal(&make_animal(&db, "cattle", sector)).unwrap();
        }

        let page = AnimalFilter {
            limit: Some(2),
            offset: Some(2),
            ..Default::default()
        };
        let animals = db.list_animals(&page).unwrap();
        let tags: Vec<_> = animals.iter().map(|a| a.animal_id.as_str()).collect();
        assert_eq!(tags, vec!["ANM000003", "ANM000002"]);
        assert_eq!(db.count_animals(&page).unwrap(), 5);

        let remera = AnimalFilter {
            sector: Some("Remera".into()),
            ..Default::default()
        };
        assert_eq!(db.count_animals(&remera).unwrap(), 2);
    }

    #[test]
    fn test_list_owners_is_distinct_and_sorted() {
        let db = setup_db();
        for (owner, sector) in [
            ("Uwase", "Kimironko"),
            ("Habimana", "Kimironko"),
            ("Uwase", "Remera"),
            ("Bizimana", "Remera"),
        ] {
            let mut animal = make_animal(&db, "cattle", sector);
            animal.owner_name = owner.into();
            db.insert_animal(&animal).unwrap();
        }

        let all = db.list_owners(&AnimalFilter::default()).unwrap();
        assert_eq!(all, vec!["Bizimana", "Habimana", "Uwase"]);

        let remera = AnimalFilter {
            sector: Some("Remera".into()),
            ..Default::default()
        };
        assert_eq!(db.list_owners(&remera).unwrap(), vec!["Bizimana", "Uwase"]);
    }

    #[test]
    fn test_get_animals_by_ids_skips_missing() {
        let db = setup_db();
        let a = make_animal(&db, "cattle", "Kimironko");
        db.insert_animal(&a).unwrap();

        let found = db
            .get_animals_by_ids(&[a.id.clone(), "missing".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(db.get_animals_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_status_is_reported() {
        let db = setup_db();
        let animal = make_animal(&db, "cattle", "Kimironko");
        db.insert_animal(&animal).unwrap();
        db.conn()
            .execute("UPDATE animals SET health_status = 'dizzy'", [])
            .unwrap();

        let result = db.get_animal(&animal.id);
        assert!(matches!(result, Err(DbError::Malformed(_))));
    }
}
