//! Records produced by the engines and summary helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::building::BuildingId;
use super::report::{IssueType, Severity};

/// A `(building, issue type)` group that crossed the count threshold inside
/// the detection window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAlert {
    pub building_id: BuildingId,
    pub issue_type: IssueType,
    pub count: usize,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub severity: Severity,
}

/// Ranked output of the alternative recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub building_id: BuildingId,
    pub distance_km: f64,
    pub walk_time_minutes: u32,
    pub occupancy_pct: f64,
}

/// Low-occupancy building offered when the user names no current location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuietSpot {
    pub building_id: BuildingId,
    pub occupancy_pct: f64,
}

/// Building ranked by accessibility features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibleBuilding {
    pub building_id: BuildingId,
    pub elevators: u32,
    pub accessible_washrooms: u32,
    pub notes: String,
}

/// Walking route between two known buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: BuildingId,
    pub to: BuildingId,
    pub distance_km: f64,
    pub walk_time_minutes: u32,
}

/// Campus-wide totals over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CampusStats {
    pub total_buildings: usize,
    pub busy_count: usize,
    pub quiet_count: usize,
    pub broken_count: usize,
    pub occupancy_pct: f64,
}

/// Building with the most open reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub building_id: BuildingId,
    pub open_issues: usize,
}
