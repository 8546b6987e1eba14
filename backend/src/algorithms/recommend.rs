//! Nearby lower-occupancy alternatives for a crowded building.

use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::geo::{building_distance, check_building, walk_time_minutes};
use crate::error::{CoreError, CoreResult};
use crate::models::{BuildingState, BuildingStatus, QuietSpot, Recommendation};

/// Occupancy at or above which a building counts as crowded.
pub const CROWDED_OCCUPANCY_PCT: f64 = 70.0;

/// Tunables of one recommender call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendPolicy {
    pub max_distance_km: f64,
    pub occupancy_threshold_pct: f64,
    pub limit: usize,
}

impl Default for RecommendPolicy {
    fn default() -> Self {
        Self {
            max_distance_km: 1.5,
            occupancy_threshold_pct: 50.0,
            limit: 3,
        }
    }
}

impl RecommendPolicy {
    /// Policy used for the campus-wide busy overview, which searches closer.
    pub fn overview() -> Self {
        Self {
            max_distance_km: 1.0,
            ..Self::default()
        }
    }
}

/// Rank alternatives to `origin_id` among `candidates`.
///
/// The origin and broken buildings are never returned. Survivors satisfy
/// `occupancy_pct < occupancy_threshold_pct` and `distance_km <= max_distance_km`,
/// ordered by distance, then occupancy, then id. An empty vector means nothing
/// qualified; an unknown origin is [`CoreError::NotFound`].
pub fn recommend(
    origin_id: &str,
    candidates: &[BuildingState],
    policy: &RecommendPolicy,
) -> CoreResult<Vec<Recommendation>> {
    let origin = candidates
        .iter()
        .find(|b| b.id.as_str() == origin_id)
        .ok_or_else(|| CoreError::building_not_found(origin_id))?;
    check_building(origin)?;

    let mut ranked: Vec<Recommendation> = Vec::new();
    for candidate in candidates {
        if candidate.id == origin.id || candidate.is_broken() {
            continue;
        }

        let occupancy_pct = candidate.occupancy_pct();
        if occupancy_pct >= policy.occupancy_threshold_pct {
            continue;
        }

        let distance_km = match building_distance(origin, candidate) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping candidate {} with bad coordinates: {}", candidate.id, e);
                continue;
            }
        };
        if distance_km > policy.max_distance_km {
            continue;
        }

        ranked.push(Recommendation {
            building_id: candidate.id.clone(),
            distance_km,
            walk_time_minutes: walk_time_minutes(distance_km),
            occupancy_pct,
        });
    }

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.occupancy_pct.total_cmp(&b.occupancy_pct))
            .then_with(|| a.building_id.cmp(&b.building_id))
    });
    ranked.truncate(policy.limit);

    Ok(ranked)
}

/// Whether the chat path should offer alternatives for this building.
pub fn is_crowded(building: &BuildingState) -> bool {
    building.occupancy_pct() >= CROWDED_OCCUPANCY_PCT || building.status == BuildingStatus::Busy
}

/// Non-broken buildings under `max_occupancy_pct`, quietest first.
pub fn quiet_spots(
    buildings: &[BuildingState],
    max_occupancy_pct: f64,
    limit: usize,
) -> Vec<QuietSpot> {
    let mut spots: Vec<QuietSpot> = buildings
        .iter()
        .filter(|b| !b.is_broken())
        .map(|b| QuietSpot {
            building_id: b.id.clone(),
            occupancy_pct: b.occupancy_pct(),
        })
        .filter(|s| s.occupancy_pct < max_occupancy_pct)
        .collect();

    spots.sort_by(|a, b| match a.occupancy_pct.total_cmp(&b.occupancy_pct) {
        Ordering::Equal => a.building_id.cmp(&b.building_id),
        other => other,
    });
    spots.truncate(limit);
    spots
}
