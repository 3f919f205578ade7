//! End-to-end surveillance scenarios against a file-backed store.

use chrono::NaiveDate;
use tempfile::TempDir;

use surveillance_core::analytics::{GeoFeedFilter, PresentationStatus};
use surveillance_core::consistency::OutcomeUpdate;
use surveillance_core::db::Database;
use surveillance_core::location::LocationHierarchy;
use surveillance_core::models::{
    AnimalUpdate, Caller, DiseaseType, HealthStatus, LocationSnapshot, NewAnimal, NewDiseaseCase,
    Role, Scope, Severity, Sex,
};
use surveillance_core::{EngineConfig, Surveillance, SurveillanceError};

struct World {
    _dir: TempDir,
    db: Database,
    config: EngineConfig,
    hierarchy: LocationHierarchy,
}

impl World {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("surveillance.db")).unwrap();
        Self {
            _dir: dir,
            db,
            config: EngineConfig::default(),
            hierarchy: LocationHierarchy::builtin(),
        }
    }

    fn service(&self) -> Surveillance<'_> {
        Surveillance::new(&self.db, &self.config, &self.hierarchy)
    }
}

fn root() -> Caller {
    Caller::new("root", Role::SuperAdmin, Scope::national())
}

fn animal(species: &str, province: &str, district: &str, sector: &str) -> NewAnimal {
    NewAnimal {
        species: species.into(),
        breed: "local".into(),
        age: 2,
        sex: Sex::Male,
        color: None,
        identification_marks: None,
        owner_name: "Niyonzima".into(),
        owner_contact: "0788999000".into(),
        owner_address: Some("Village road".into()),
        location: LocationSnapshot::new(province, district, sector).with_coordinates(-1.95, 30.06),
    }
}

fn report(animal_id: &str, name: &str, severity: Severity, outbreak: Option<bool>) -> NewDiseaseCase {
    NewDiseaseCase {
        animal_id: animal_id.into(),
        disease_name: name.into(),
        disease_type: DiseaseType::Viral,
        symptoms: vec!["fever".into(), "lethargy".into()],
        severity,
        diagnosis_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        diagnosis_method: "clinical".into(),
        treatment_provided: None,
        outcome: None,
        is_outbreak: outbreak,
        affected_animals_count: None,
        notes: None,
    }
}

#[test]
fn test_province_health_rate_scenario() {
    let world = World::new();
    let svc = world.service();
    let caller = root();

    let sick = svc
        .register_animal(Some(&caller), animal("cattle", "Kigali City", "Gasabo", "Remera"))
        .unwrap();
    svc.register_animal(Some(&caller), animal("cattle", "Kigali City", "Gasabo", "Remera"))
        .unwrap();
    svc.register_animal(Some(&caller), animal("goats", "Kigali City", "Gasabo", "Remera"))
        .unwrap();
    for _ in 0..10 {
        svc.register_animal(Some(&caller), animal("cattle", "Kigali City", "Gasabo", "Kimironko"))
            .unwrap();
    }
    svc.report_disease_case(Some(&caller), report(&sick.id, "Rabies", Severity::Severe, None))
        .unwrap();

    let overview = svc.get_national_overview(Some(&caller)).unwrap();
    let kigali = &overview.provinces[0];
    assert_eq!(kigali.province, "Kigali City");
    assert_eq!(kigali.animals.total, 13);
    assert_eq!(kigali.animals.healthy, 12);
    assert_eq!(kigali.animals.sick, 1);
    assert_eq!(kigali.animals.health_rate, 92);
    assert_eq!(overview.sectors.len(), 2);
    assert_eq!(overview.sectors[0].sector, "Kimironko");
    assert_eq!(overview.sectors[0].animals.health_rate, 100);
    assert_eq!(overview.sectors[1].animals.health_rate, 67);
}

#[test]
fn test_case_lifecycle_keeps_animal_in_step() {
    let world = World::new();
    let svc = world.service();
    let caller = root();

    let cow = svc
        .register_animal(Some(&caller), animal("cattle", "Eastern", "Nyagatare", "Karangazi"))
        .unwrap();
    let case = svc
        .report_disease_case(Some(&caller), report(&cow.animal_id, "FMD", Severity::Critical, Some(true)))
        .unwrap();
    assert_eq!(world.db.get_animal(&cow.id).unwrap().unwrap().health_status, HealthStatus::Sick);

    let steps = [
        ("under_treatment", HealthStatus::UnderTreatment, PresentationStatus::Treated),
        ("recovered", HealthStatus::Recovered, PresentationStatus::Recovered),
        ("relapsed", HealthStatus::Sick, PresentationStatus::Active),
    ];
    for (outcome, health, status) in steps {
        let t = svc
            .apply_case_outcome(Some(&caller), &case.id, &OutcomeUpdate::new(outcome))
            .unwrap();
        assert_eq!(t.health_status, health);
        assert_eq!(world.db.get_animal(&cow.id).unwrap().unwrap().health_status, health);

        let feed = svc.get_geo_feed(Some(&caller), &GeoFeedFilter::default()).unwrap();
        assert_eq!(feed.cases[0].status, status);
    }

    let stored = world.db.get_case(&case.id).unwrap().unwrap();
    assert_eq!(stored.outcome.as_str(), "relapsed");
    assert_eq!(stored.location.sector, "Karangazi");
}

#[test]
fn test_geo_feed_stats_and_filters() {
    let world = World::new();
    let svc = world.service();
    let caller = root();

    let duck = svc
        .register_animal(Some(&caller), animal("duck", "Southern", "Huye", "Tumba"))
        .unwrap();
    let goat = svc
        .register_animal(Some(&caller), animal("goats", "Northern", "Musanze", "Muhoza"))
        .unwrap();
    svc.report_disease_case(Some(&caller), report(&duck.id, "Avian flu", Severity::Critical, Some(true)))
        .unwrap();
    svc.report_disease_case(Some(&caller), report(&goat.id, "PPR", Severity::Mild, None))
        .unwrap();

    let feed = svc.get_geo_feed(Some(&caller), &GeoFeedFilter::default()).unwrap();
    assert_eq!(feed.stats.total_cases, 2);
    assert_eq!(feed.stats.active_outbreaks, 1);
    assert_eq!(feed.stats.affected_animals, 2);
    assert_eq!(feed.stats.affected_locations, 2);
    assert_eq!(feed.stats.by_species.other, 1);
    assert_eq!(feed.stats.by_species.goats, 1);
    assert_eq!(feed.stats.by_severity.critical, 1);
    assert_eq!(feed.stats.by_type.viral, 2);
    assert_eq!(feed.stats.by_status.active, 2);

    let critical = GeoFeedFilter {
        severity: Some(Severity::Critical),
        ..Default::default()
    };
    let feed = svc.get_geo_feed(Some(&caller), &critical).unwrap();
    assert_eq!(feed.cases.len(), 1);
    assert_eq!(feed.cases[0].animal.as_ref().unwrap().species, "duck");

    let northern = GeoFeedFilter {
        province: Some("Northern".into()),
        ..Default::default()
    };
    let feed = svc.get_geo_feed(Some(&caller), &northern).unwrap();
    assert_eq!(feed.cases.len(), 1);
    assert_eq!(feed.cases[0].disease.name, "PPR");

    let bad_range = GeoFeedFilter {
        diagnosed_from: NaiveDate::from_ymd_opt(2026, 9, 2),
        diagnosed_to: NaiveDate::from_ymd_opt(2026, 9, 1),
        ..Default::default()
    };
    assert!(matches!(
        svc.get_geo_feed(Some(&caller), &bad_range),
        Err(SurveillanceError::InvalidInput(_))
    ));
}

#[test]
fn test_case_snapshot_survives_animal_move() {
    let world = World::new();
    let svc = world.service();
    let caller = root();

    let cow = svc
        .register_animal(Some(&caller), animal("cattle", "Western", "Rubavu", "Gisenyi"))
        .unwrap();
    let case = svc
        .report_disease_case(Some(&caller), report(&cow.id, "ECF", Severity::Moderate, None))
        .unwrap();

    let moved = svc
        .update_animal(
            Some(&caller),
            &cow.animal_id,
            AnimalUpdate {
                location: Some(LocationSnapshot::new("Southern", "Huye", "Tumba")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.location.province, "Southern");
    assert_eq!(moved.health_status, HealthStatus::Sick);

    let overview = svc.get_national_overview(Some(&caller)).unwrap();
    let western = overview
        .provinces
        .iter()
        .find(|p| p.province == "Western")
        .unwrap();
    assert_eq!(western.animals.total, 0);
    assert_eq!(western.diseases.total, 1);
    let huye = overview
        .districts
        .iter()
        .find(|d| d.district == "Huye")
        .unwrap();
    assert_eq!(huye.counts.total_animals, 1);
    assert_eq!(huye.counts.sick_animals, 1);
    assert_eq!(huye.diseases.total, 0);

    let detail = svc.get_case_with_animal(Some(&caller), &case.id).unwrap();
    assert_eq!(detail.case.location.province, "Western");
    assert_eq!(detail.animal.unwrap().location.province, "Southern");
}

#[test]
fn test_veterinarian_dashboard_is_scoped() {
    let world = World::new();
    let svc = world.service();
    let caller = root();

    let here = svc
        .register_animal(Some(&caller), animal("pigs", "Kigali City", "Gasabo", "Remera"))
        .unwrap();
    let there = svc
        .register_animal(Some(&caller), animal("sheep", "Eastern", "Nyagatare", "Karangazi"))
        .unwrap();
    svc.report_disease_case(Some(&caller), report(&here.id, "ASF", Severity::Severe, Some(true)))
        .unwrap();
    svc.report_disease_case(Some(&caller), report(&there.id, "PPR", Severity::Mild, None))
        .unwrap();

    let vet = Caller::from_profile(
        "vet-7",
        Role::Veterinarian,
        Some("Kigali City".into()),
        Some("Gasabo".into()),
        Some("Remera".into()),
    );
    let dash = svc.get_scoped_dashboard(Some(&vet)).unwrap();
    assert_eq!(dash.stats.total_animals, 1);
    assert_eq!(dash.stats.sick_animals, 1);
    assert_eq!(dash.stats.total_diseases, 1);
    assert_eq!(dash.stats.active_outbreaks, 1);
    assert_eq!(dash.charts.top_diseases[0].name, "ASF");

    let admin_dash = svc
        .get_scoped_dashboard(Some(&Caller::new("a", Role::Admin, Scope::national())))
        .unwrap();
    assert_eq!(admin_dash.stats.total_diseases, 2);

    assert!(matches!(
        svc.get_national_overview(Some(&vet)),
        Err(SurveillanceError::Unauthorized(_))
    ));
    assert!(matches!(
        svc.get_national_overview(None),
        Err(SurveillanceError::Unauthenticated)
    ));
}

#[test]
fn test_records_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("persist.db");
    let config = EngineConfig::default();
    let hierarchy = LocationHierarchy::builtin();
    let caller = root();

    {
        let db = Database::open(&path).unwrap();
        let svc = Surveillance::new(&db, &config, &hierarchy);
        let a = svc
            .register_animal(Some(&caller), animal("cattle", "Eastern", "Nyagatare", "Karangazi"))
            .unwrap();
        svc.report_disease_case(Some(&caller), report(&a.id, "Anthrax", Severity::Critical, None))
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let svc = Surveillance::new(&db, &config, &hierarchy);
    let next = svc
        .register_animal(Some(&caller), animal("cattle", "Eastern", "Nyagatare", "Karangazi"))
        .unwrap();
    assert_eq!(next.animal_id, "ANM000002");
    assert_eq!(svc.search_cases(Some(&caller), "DIS000001").unwrap().len(), 1);
}
