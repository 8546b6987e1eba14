//! Request and response types of the REST API.
//!
//! Engine outputs already derive `Serialize` and are returned as-is, wrapped
//! in [`Served`] where the service may degrade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::{
    AccessibleBuilding, BuildingState, CampusStats, Hotspot, IssueReport, NewIssueReport,
    QuietSpot, Recommendation, Route, TrendAlert,
};
pub use crate::services::{ChatAnswer, IngestSummary, PredictionAnswer, Served};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Store connectivity status
    pub database: String,
}

/// Overrides of the configured recommender policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlternativesQuery {
    pub max_distance_km: Option<f64>,
    /// Occupancy percentage a candidate must stay under.
    pub threshold: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuietSpotsQuery {
    pub max_occupancy_pct: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportsQuery {
    pub building: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendsQuery {
    /// Evaluate the window ending at this instant instead of now.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotspotsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionsQuery {
    #[serde(default)]
    pub query: String,
    pub hour: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequestBody {
    pub query: String,
    /// Hour of day (0-23) that takes precedence over any time in the text.
    #[serde(default)]
    pub hour: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReportResponse {
    pub report: IssueReport,
    /// `false` when a report with the same id was already stored.
    pub inserted: bool,
    /// Trend alerts fired by this report.
    #[serde(default)]
    pub alerts: Vec<TrendAlert>,
}
