//! Snapshot-backed campus services: listings, alternatives, routes.

use crate::algorithms::campus;
use crate::algorithms::recommend::{self as recommender, RecommendPolicy};
use crate::db::repository::SnapshotRepository;
use crate::error::{CoreError, CoreResult};
use crate::models::{
    AccessibleBuilding, BuildingId, BuildingState, CampusStats, QuietSpot, Recommendation, Route,
};

use super::{absorb, Served};

pub async fn list_buildings<R>(repo: &R) -> Served<Vec<BuildingState>>
where
    R: SnapshotRepository + ?Sized,
{
    absorb("list_buildings", repo.list_buildings().await)
}

/// Look up a single building.
///
/// Unlike the listings this cannot degrade to an empty value, so an
/// unreachable store is returned as [`CoreError::StoreUnavailable`].
pub async fn get_building<R>(repo: &R, id: &str) -> CoreResult<BuildingState>
where
    R: SnapshotRepository + ?Sized,
{
    repo.get_building(&BuildingId::from(id))
        .await?
        .ok_or_else(|| CoreError::building_not_found(id))
}

/// Alternatives to `origin_id`.
///
/// An unknown origin is an error; an unreachable snapshot is an empty,
/// degraded result.
pub async fn alternatives<R: SnapshotRepository + ?Sized>(
    repo: &R,
    origin_id: &str,
    policy: &RecommendPolicy,
) -> CoreResult<Served<Vec<Recommendation>>> {
    let snapshot = list_buildings(repo).await;
    if snapshot.degraded {
        return Ok(Served::degraded(Vec::new()));
    }
    recommender::recommend(origin_id, &snapshot.data, policy).map(Served::fresh)
}

pub async fn quiet_spots<R: SnapshotRepository + ?Sized>(
    repo: &R,
    max_occupancy_pct: f64,
    limit: usize,
) -> Served<Vec<QuietSpot>> {
    list_buildings(repo)
        .await
        .map(|buildings| recommender::quiet_spots(&buildings, max_occupancy_pct, limit))
}

pub async fn accessible_buildings<R>(repo: &R) -> Served<Vec<AccessibleBuilding>>
where
    R: SnapshotRepository + ?Sized,
{
    let buildings = list_buildings(repo).await;
    let accessibility = absorb("list_accessibility", repo.list_accessibility().await);
    Served {
        data: campus::accessible_buildings(&buildings.data, &accessibility.data),
        degraded: buildings.degraded || accessibility.degraded,
    }
}

pub async fn route<R>(repo: &R, from: &str, to: &str) -> CoreResult<Route>
where
    R: SnapshotRepository + ?Sized,
{
    let buildings = repo.list_buildings().await?;
    campus::route(&buildings, from, to)
}

pub async fn campus_stats<R: SnapshotRepository + ?Sized>(repo: &R) -> Served<CampusStats> {
    list_buildings(repo)
        .await
        .map(|buildings| campus::campus_stats(&buildings))
}
