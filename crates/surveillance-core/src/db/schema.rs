//! SQLite schema definition.

/// Complete database schema for the surveillance store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Animals
-- ============================================================================

CREATE TABLE IF NOT EXISTS animals (
    id TEXT PRIMARY KEY,
    animal_id TEXT NOT NULL UNIQUE,               -- human-facing tag, ANM000001
    species TEXT NOT NULL,
    breed TEXT NOT NULL,
    age INTEGER NOT NULL,
    sex TEXT NOT NULL CHECK (sex IN ('male', 'female')),
    color TEXT,
    identification_marks TEXT,
    owner_name TEXT NOT NULL,
    owner_contact TEXT NOT NULL,
    owner_address TEXT,
    province TEXT NOT NULL,
    district TEXT NOT NULL,
    sector TEXT NOT NULL,
    cell TEXT,
    village TEXT,
    latitude REAL,
    longitude REAL,
    health_status TEXT NOT NULL DEFAULT 'healthy',
    vaccination_history TEXT NOT NULL DEFAULT '[]', -- JSON array of VaccinationRecord
    registered_by TEXT NOT NULL,
    registered_date TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_animals_location ON animals(province, district, sector);
CREATE INDEX IF NOT EXISTS idx_animals_health ON animals(health_status);
CREATE INDEX IF NOT EXISTS idx_animals_registered ON animals(registered_date);

-- ============================================================================
-- Disease Cases
-- ============================================================================

-- Location and animal details are snapshots taken at report time.
-- animal_ref is not a foreign key: cases outlive their animal.
CREATE TABLE IF NOT EXISTS disease_cases (
    id TEXT PRIMARY KEY,
    report_id TEXT NOT NULL UNIQUE,               -- human-facing id, DIS000001
    animal_ref TEXT NOT NULL,
    animal_species TEXT NOT NULL,
    animal_breed TEXT NOT NULL,
    animal_age INTEGER NOT NULL,
    disease_name TEXT NOT NULL,
    disease_type TEXT NOT NULL,
    symptoms TEXT NOT NULL DEFAULT '[]',          -- JSON array of strings
    severity TEXT NOT NULL,
    diagnosis_date TEXT NOT NULL,                 -- YYYY-MM-DD
    diagnosis_method TEXT NOT NULL,
    treatment_provided TEXT,
    outcome TEXT NOT NULL DEFAULT 'ongoing',
    province TEXT NOT NULL,
    district TEXT NOT NULL,
    sector TEXT NOT NULL,
    cell TEXT,
    village TEXT,
    latitude REAL,
    longitude REAL,
    reported_by TEXT NOT NULL,
    reported_date TEXT NOT NULL,
    is_outbreak INTEGER NOT NULL DEFAULT 0,
    affected_animals_count INTEGER NOT NULL DEFAULT 1,
    notes TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cases_animal ON disease_cases(animal_ref);
CREATE INDEX IF NOT EXISTS idx_cases_location ON disease_cases(province, district, sector);
CREATE INDEX IF NOT EXISTS idx_cases_reported ON disease_cases(reported_date);
CREATE INDEX IF NOT EXISTS idx_cases_diagnosis ON disease_cases(diagnosis_date);

-- ============================================================================
-- Sequences for human-facing identifiers
-- ============================================================================

CREATE TABLE IF NOT EXISTS id_sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO id_sequences (name, value) VALUES ('animal', 0);
INSERT OR IGNORE INTO id_sequences (name, value) VALUES ('disease_case', 0);
"#;
