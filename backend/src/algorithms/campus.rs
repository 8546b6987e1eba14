//! Snapshot-wide helpers: accessibility ranking, point-to-point routes and
//! campus totals.

use std::collections::HashMap;

use super::geo::{building_distance, walk_time_minutes};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    AccessibilityInfo, AccessibleBuilding, BuildingState, BuildingStatus, CampusStats, Route,
};

/// Buildings with accessibility records, most elevators first (ties by id).
///
/// Records for buildings absent from the snapshot are ignored.
pub fn accessible_buildings(
    buildings: &[BuildingState],
    accessibility: &[AccessibilityInfo],
) -> Vec<AccessibleBuilding> {
    let by_id: HashMap<&str, &AccessibilityInfo> = accessibility
        .iter()
        .map(|a| (a.building_id.as_str(), a))
        .collect();

    let mut ranked: Vec<AccessibleBuilding> = buildings
        .iter()
        .filter_map(|b| by_id.get(b.id.as_str()))
        .map(|info| AccessibleBuilding {
            building_id: info.building_id.clone(),
            elevators: info.elevators,
            accessible_washrooms: info.accessible_washrooms,
            notes: info.notes.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.elevators
            .cmp(&a.elevators)
            .then_with(|| a.building_id.cmp(&b.building_id))
    });
    ranked
}

fn lookup<'a>(buildings: &'a [BuildingState], id: &str) -> CoreResult<&'a BuildingState> {
    buildings
        .iter()
        .find(|b| b.id.as_str() == id)
        .ok_or_else(|| CoreError::building_not_found(id))
}

/// Walking route between two snapshot buildings.
pub fn route(buildings: &[BuildingState], from: &str, to: &str) -> CoreResult<Route> {
    let origin = lookup(buildings, from)?;
    let destination = lookup(buildings, to)?;
    let distance_km = building_distance(origin, destination)?;

    Ok(Route {
        from: origin.id.clone(),
        to: destination.id.clone(),
        distance_km,
        walk_time_minutes: walk_time_minutes(distance_km),
    })
}

/// Campus totals. Occupancy is aggregated over total capacity, not averaged
/// per building.
pub fn campus_stats(buildings: &[BuildingState]) -> CampusStats {
    if buildings.is_empty() {
        return CampusStats::default();
    }

    let count = |status: BuildingStatus| buildings.iter().filter(|b| b.status == status).count();
    let occupancy: i64 = buildings.iter().map(|b| b.occupancy).sum();
    let capacity: i64 = buildings.iter().map(|b| b.capacity).sum();
    let occupancy_pct = if capacity > 0 {
        occupancy as f64 / capacity as f64 * 100.0
    } else {
        0.0
    };

    CampusStats {
        total_buildings: buildings.len(),
        busy_count: count(BuildingStatus::Busy),
        quiet_count: count(BuildingStatus::Quiet),
        broken_count: count(BuildingStatus::Broken),
        occupancy_pct,
    }
}
