//! In-memory repository.
//!
//! Holds the snapshot, the forecast table and the report log behind a
//! `parking_lot::RwLock`. A health toggle lets tests simulate an unreachable
//! store: while unhealthy every read and write fails with a retryable
//! connection error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::repository::{
    ErrorContext, ForecastRepository, ReportRepository, RepositoryError, RepositoryResult,
    SnapshotRepository,
};
use crate::models::{AccessibilityInfo, BuildingId, BuildingState, IssueReport, PredictionTable};

pub const BUILDINGS_FILE: &str = "buildings.json";
pub const ACCESSIBILITY_FILE: &str = "accessibility.json";
pub const PREDICTIONS_FILE: &str = "predictions.json";
pub const ISSUES_FILE: &str = "issues.json";

#[derive(Debug, Default)]
struct LocalData {
    buildings: Vec<BuildingState>,
    accessibility: Vec<AccessibilityInfo>,
    predictions: PredictionTable,
    reports: Vec<IssueReport>,
    report_ids: HashSet<String>,
}

/// In-memory implementation of every store trait.
#[derive(Debug)]
pub struct LocalRepository {
    data: RwLock<LocalData>,
    healthy: AtomicBool,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(LocalData::default()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Load whichever of the seed files exist under `dir`.
    ///
    /// Missing files leave the corresponding collection empty; a file that
    /// exists but does not parse is a configuration error.
    pub fn from_data_dir(dir: impl AsRef<Path>) -> RepositoryResult<Self> {
        let dir = dir.as_ref();
        let repo = Self::new();

        if let Some(buildings) = read_seed::<Vec<BuildingState>>(dir, BUILDINGS_FILE)? {
            repo.set_buildings(buildings);
        }
        if let Some(accessibility) = read_seed::<Vec<AccessibilityInfo>>(dir, ACCESSIBILITY_FILE)? {
            repo.set_accessibility(accessibility);
        }
        if let Some(predictions) = read_seed::<PredictionTable>(dir, PREDICTIONS_FILE)? {
            repo.set_predictions(predictions);
        }
        if let Some(reports) = read_seed::<Vec<IssueReport>>(dir, ISSUES_FILE)? {
            let mut data = repo.data.write();
            for report in reports {
                if data.report_ids.insert(report.id.to_string()) {
                    data.reports.push(report);
                }
            }
        }

        {
            let data = repo.data.read();
            info!(
                "Seeded local repository from {}: {} buildings, {} accessibility records, {} forecast slots, {} reports",
                dir.display(),
                data.buildings.len(),
                data.accessibility.len(),
                data.predictions.len(),
                data.reports.len()
            );
        }
        Ok(repo)
    }

    pub fn set_buildings(&self, buildings: Vec<BuildingState>) {
        self.data.write().buildings = buildings;
    }

    /// Replace the state of one building, appending it if unknown.
    pub fn upsert_building(&self, building: BuildingState) {
        let mut data = self.data.write();
        match data.buildings.iter_mut().find(|b| b.id == building.id) {
            Some(existing) => *existing = building,
            None => data.buildings.push(building),
        }
    }

    pub fn set_accessibility(&self, accessibility: Vec<AccessibilityInfo>) {
        self.data.write().accessibility = accessibility;
    }

    pub fn set_predictions(&self, predictions: PredictionTable) {
        self.data.write().predictions = predictions;
    }

    /// Simulate the store going away (or coming back).
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn report_count(&self) -> usize {
        self.data.read().reports.len()
    }

    fn ensure_available(&self, operation: &str) -> RepositoryResult<()> {
        if self.is_healthy() {
            Ok(())
        } else {
            Err(RepositoryError::unavailable(
                "Local repository is unavailable",
                operation,
            ))
        }
    }
}

fn read_seed<T: DeserializeOwned>(dir: &Path, file: &str) -> RepositoryResult<Option<T>> {
    let path = dir.join(file);
    if !path.exists() {
        debug!("Seed file {} not found, skipping", path.display());
        return Ok(None);
    }

    let context = || ErrorContext::new("load_seed").with_entity(file);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        RepositoryError::configuration_with_context(
            format!("Failed to read {}: {}", path.display(), e),
            context(),
        )
    })?;
    serde_json::from_str(&content).map(Some).map_err(|e| {
        RepositoryError::validation_with_context(
            format!("Failed to parse {}: {}", path.display(), e),
            context(),
        )
    })
}

fn newest_first(mut reports: Vec<IssueReport>) -> Vec<IssueReport> {
    reports.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
    reports
}

#[async_trait]
impl SnapshotRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.is_healthy())
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<BuildingState>> {
        self.ensure_available("list_buildings")?;
        Ok(self.data.read().buildings.clone())
    }

    async fn get_building(&self, id: &BuildingId) -> RepositoryResult<Option<BuildingState>> {
        self.ensure_available("get_building")?;
        Ok(self.data.read().buildings.iter().find(|b| &b.id == id).cloned())
    }

    async fn list_accessibility(&self) -> RepositoryResult<Vec<AccessibilityInfo>> {
        self.ensure_available("list_accessibility")?;
        Ok(self.data.read().accessibility.clone())
    }
}

#[async_trait]
impl ReportRepository for LocalRepository {
    async fn insert_report(&self, report: IssueReport) -> RepositoryResult<bool> {
        self.ensure_available("insert_report")?;
        let mut data = self.data.write();
        if !data.report_ids.insert(report.id.to_string()) {
            debug!("Report {} already stored", report.id);
            return Ok(false);
        }
        data.reports.push(report);
        Ok(true)
    }

    async fn list_reports(&self, building: Option<&BuildingId>) -> RepositoryResult<Vec<IssueReport>> {
        self.ensure_available("list_reports")?;
        let reports = self
            .data
            .read()
            .reports
            .iter()
            .filter(|r| building.is_none_or(|id| &r.building_id == id))
            .cloned()
            .collect();
        Ok(newest_first(reports))
    }

    async fn recent_reports(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<IssueReport>> {
        self.ensure_available("recent_reports")?;
        let reports = self
            .data
            .read()
            .reports
            .iter()
            .filter(|r| r.reported_at >= since)
            .cloned()
            .collect();
        Ok(newest_first(reports))
    }
}

#[async_trait]
impl ForecastRepository for LocalRepository {
    async fn fetch_predictions(&self) -> RepositoryResult<PredictionTable> {
        self.ensure_available("fetch_predictions")?;
        Ok(self.data.read().predictions.clone())
    }
}
