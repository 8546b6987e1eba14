use serde::{Deserialize, Serialize};

use crate::define_key_type;

define_key_type!(BuildingId);

/// Capacity substituted when a building reports `capacity <= 0`.
pub const FALLBACK_CAPACITY: i64 = 100;

/// Operational status of a building as reported by the snapshot source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingStatus {
    #[default]
    Quiet,
    Busy,
    Broken,
}

impl BuildingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingStatus::Quiet => "quiet",
            BuildingStatus::Busy => "busy",
            BuildingStatus::Broken => "broken",
        }
    }
}

fn default_capacity() -> i64 {
    FALLBACK_CAPACITY
}

fn default_building_type() -> String {
    "academic".to_string()
}

/// Current state of one campus building.
///
/// Snapshots are loaded per request and never mutated by the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    pub id: BuildingId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub occupancy: i64,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    #[serde(default)]
    pub status: BuildingStatus,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(rename = "type", default = "default_building_type")]
    pub building_type: String,
}

impl BuildingState {
    /// Occupancy as a percentage of capacity.
    ///
    /// A non-positive capacity is replaced by [`FALLBACK_CAPACITY`] instead of
    /// dividing by zero.
    pub fn occupancy_pct(&self) -> f64 {
        let capacity = if self.capacity > 0 {
            self.capacity
        } else {
            FALLBACK_CAPACITY
        };
        self.occupancy as f64 / capacity as f64 * 100.0
    }

    pub fn is_broken(&self) -> bool {
        self.status == BuildingStatus::Broken
    }
}

/// Wheelchair-accessible entrance of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub description: String,
}

/// Accessibility features of a building, keyed by building id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityInfo {
    pub building_id: BuildingId,
    #[serde(default)]
    pub elevators: u32,
    #[serde(default)]
    pub accessible_washrooms: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub wheelchair_entrances: Vec<Entrance>,
}
