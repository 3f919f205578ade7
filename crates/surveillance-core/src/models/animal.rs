//! Animal registry models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::location::LocationSnapshot;

/// Current health of a registered animal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Sick,
    UnderTreatment,
    Recovered,
    Deceased,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Healthy,
        HealthStatus::Sick,
        HealthStatus::UnderTreatment,
        HealthStatus::Recovered,
        HealthStatus::Deceased,
    ];

    /// Stored/wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Sick => "sick",
            HealthStatus::UnderTreatment => "under_treatment",
            HealthStatus::Recovered => "recovered",
            HealthStatus::Deceased => "deceased",
        }
    }

    /// Parse the stored/wire form.
    pub fn parse(s: &str) -> Option<Self> {
        HealthStatus::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// Sex of an animal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// One entry in an animal's vaccination history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    pub vaccine_name: String,
    pub date_administered: NaiveDate,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    pub administered_by: String,
}

/// Registration data supplied by a field officer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub sex: Sex,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub identification_marks: Option<String>,
    pub owner_name: String,
    pub owner_contact: String,
    #[serde(default)]
    pub owner_address: Option<String>,
    pub location: LocationSnapshot,
}

/// Partial edit of a registered animal. `None` leaves a field as it is.
///
/// Health status and vaccinations are not editable here; they follow the
/// animal's cases and vaccination records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimalUpdate {
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    /// Blank clears the color
    pub color: Option<String>,
    /// Blank clears the marks
    pub identification_marks: Option<String>,
    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    /// Blank clears the address
    pub owner_address: Option<String>,
    pub location: Option<LocationSnapshot>,
}

impl AnimalUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A registered animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    /// Store identifier (UUID)
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-facing tag, e.g. "ANM000042"
    pub animal_id: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub sex: Sex,
    pub color: Option<String>,
    pub identification_marks: Option<String>,
    pub owner_name: String,
    pub owner_contact: String,
    pub owner_address: Option<String>,
    /// Current location; moves with the animal
    pub location: LocationSnapshot,
    pub health_status: HealthStatus,
    /// Oldest first
    pub vaccination_history: Vec<VaccinationRecord>,
    /// User who registered the animal
    pub registered_by: String,
    pub registered_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl AnimalRecord {
    /// Build a freshly registered, healthy animal.
    pub fn register(tag: String, input: NewAnimal, registered_by: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            animal_id: tag,
            species: input.species,
            breed: input.breed,
            age: input.age,
            sex: input.sex,
            color: input.color,
            identification_marks: input.identification_marks,
            owner_name: input.owner_name,
            owner_contact: input.owner_contact,
            owner_address: input.owner_address,
            location: input.location,
            health_status: HealthStatus::Healthy,
            vaccination_history: Vec::new(),
            registered_by,
            registered_date: now,
            last_updated: now,
        }
    }

    /// Apply an edit in place and stamp `last_updated`.
    pub fn apply(&mut self, update: AnimalUpdate) {
        if let Some(species) = update.species {
            self.species = species;
        }
        if let Some(breed) = update.breed {
            self.breed = breed;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(sex) = update.sex {
            self.sex = sex;
        }
        if let Some(color) = update.color {
            self.color = non_blank(color);
        }
        if let Some(marks) = update.identification_marks {
            self.identification_marks = non_blank(marks);
        }
        if let Some(name) = update.owner_name {
            self.owner_name = name;
        }
        if let Some(contact) = update.owner_contact {
            self.owner_contact = contact;
        }
        if let Some(address) = update.owner_address {
            self.owner_address = non_blank(address);
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        self.last_updated = Utc::now();
    }

    /// Lowercased species, used for bucketing.
    pub fn canonical_species(&self) -> String {
        self.species.trim().to_lowercase()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
