use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::building::BuildingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    #[default]
    High,
}

/// One forecast row inside a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    #[serde(alias = "building")]
    pub building_id: BuildingId,
    #[serde(default)]
    pub predicted_occupancy: f64,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub best_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_time_minutes: Option<u32>,
}

/// Forecast table supplied by the external forecaster: slot label to the
/// ordered entries for that slot. The ordering inside a slot is the
/// forecaster's ranking and is preserved as-is.
pub type PredictionTable = HashMap<String, Vec<PredictionEntry>>;
