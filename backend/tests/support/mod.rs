//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use campusflow::db::LocalRepository;
use campusflow::models::{
    AccessibilityInfo, BuildingId, BuildingState, BuildingStatus, PredictionEntry,
    PredictionTable,
};
use serde_json::json;

pub const EVENING: &str = "Evening (6–11 PM)";

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn building(
    id: &str,
    name: &str,
    lat: f64,
    lon: f64,
    occupancy: i64,
    status: BuildingStatus,
) -> BuildingState {
    BuildingState {
        id: BuildingId::from(id),
        name: name.to_string(),
        lat,
        lon,
        occupancy,
        capacity: 100,
        status,
        amenities: vec![],
        building_type: "academic".to_string(),
    }
}

/// Four buildings around the main library: one crowded, two quiet, one closed.
pub fn campus() -> Vec<BuildingState> {
    let mut nest = building("nest", "AMS Student Nest", 49.2665, -123.2499, 40, BuildingStatus::Quiet);
    nest.amenities = vec!["Food court".to_string(), "Study lounge".to_string()];
    vec![
        building("ikb", "Irving K. Barber Learning Centre", 49.2676, -123.2526, 90, BuildingStatus::Busy),
        building("koerner", "Koerner Library", 49.2690, -123.2551, 30, BuildingStatus::Quiet),
        nest,
        building("old_gym", "Old Gym", 49.2670, -123.2530, 0, BuildingStatus::Broken),
    ]
}

pub fn accessibility() -> Vec<AccessibilityInfo> {
    vec![
        AccessibilityInfo {
            building_id: BuildingId::from("ikb"),
            elevators: 4,
            accessible_washrooms: 3,
            notes: "Ramp on the north side".to_string(),
            wheelchair_entrances: vec![],
        },
        AccessibilityInfo {
            building_id: BuildingId::from("koerner"),
            elevators: 2,
            accessible_washrooms: 2,
            notes: String::new(),
            wheelchair_entrances: vec![],
        },
    ]
}

pub fn predictions() -> PredictionTable {
    let entry = |id: &str, pct: f64| PredictionEntry {
        building_id: BuildingId::from(id),
        predicted_occupancy: pct,
        confidence: Default::default(),
        best_time: "After 8 PM".to_string(),
        note: None,
        walk_time_minutes: None,
    };
    let mut table = PredictionTable::new();
    table.insert(
        EVENING.to_string(),
        vec![entry("koerner", 25.0), entry("ghost", 10.0), entry("nest", 45.0)],
    );
    table
}

/// In-memory repository holding the fixture campus.
pub fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.set_buildings(campus());
    repo.set_accessibility(accessibility());
    repo.set_predictions(predictions());
    repo
}

/// Write the fixture campus as JSON seed files into `dir`.
pub fn write_seed_files(dir: &Path) {
    let write = |file: &str, value: serde_json::Value| {
        std::fs::write(dir.join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    };
    write("buildings.json", serde_json::to_value(campus()).unwrap());
    write("accessibility.json", serde_json::to_value(accessibility()).unwrap());
    write("predictions.json", serde_json::to_value(predictions()).unwrap());
    write(
        "issues.json",
        json!([
            {"id": "r1", "building_id": "ikb", "issue_type": "crowd", "severity": "high",
             "description": "No seats", "reported_at": "2025-03-14T11:00:00Z"},
            {"id": "r1", "building_id": "ikb", "issue_type": "crowd",
             "description": "Duplicate", "reported_at": "2025-03-14T11:00:00Z"},
            {"id": "r2", "building_id": "nest", "issue_type": "outlet",
             "description": "Dead outlet", "reported_at": "2025-03-14T10:00:00Z"}
        ]),
    );
}
