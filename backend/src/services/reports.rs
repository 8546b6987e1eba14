//! Issue reports and incident trend services.
//!
//! [`detect_trends`] is the on-demand view used by dashboards and never
//! touches the alert ledger. [`TrendMonitor::observe`] re-runs detection over
//! the trailing window and only notifies for alerts the ledger lets through;
//! it runs after every stored report, whether it arrived as a stream batch
//! ([`TrendMonitor::ingest`]) or through the submission endpoint.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::algorithms::trends::{self, AlertLedger, TrendPolicy};
use crate::db::repository::{FullRepository, ReportRepository};
use crate::error::CoreResult;
use crate::ingest::{decode_stream_batch, StreamBatch};
use crate::models::{BuildingId, Hotspot, IssueReport, TrendAlert};

use super::notifier::Notifier;
use super::{absorb, Served};

/// Number of buildings listed by the hotspot view.
pub const HOTSPOT_LIMIT: usize = 3;

/// Store one report. Returns whether it was new.
pub async fn store_report<R: ReportRepository + ?Sized>(
    repo: &R,
    report: IssueReport,
) -> CoreResult<bool> {
    let id = report.id.clone();
    let inserted = repo.insert_report(report).await?;
    if inserted {
        info!("Stored report {}", id);
    }
    Ok(inserted)
}

pub async fn list_reports<R: ReportRepository + ?Sized>(
    repo: &R,
    building: Option<&BuildingId>,
) -> Served<Vec<IssueReport>> {
    absorb("list_reports", repo.list_reports(building).await)
}

/// Current trend alerts, restricted to buildings in the snapshot.
///
/// An unreachable report store yields no alerts. An unreachable snapshot
/// skips the building filter.
pub async fn detect_trends<R: FullRepository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
    policy: &TrendPolicy,
) -> Served<Vec<TrendAlert>> {
    let (since, _) = policy.bounds(now);
    let recent = absorb("recent_reports", repo.recent_reports(since).await);
    if recent.degraded {
        return Served::degraded(Vec::new());
    }

    let mut alerts = trends::detect(&recent.data, now, policy);
    let degraded = !filter_known(repo, &mut alerts).await;
    Served { data: alerts, degraded }
}

/// Drop alerts for unknown buildings. Returns `false` if the snapshot could
/// not be read, in which case the alerts are left untouched.
async fn filter_known<R: FullRepository + ?Sized>(
    repo: &R,
    alerts: &mut Vec<TrendAlert>,
) -> bool {
    if alerts.is_empty() {
        return true;
    }
    match repo.list_buildings().await {
        Ok(buildings) => {
            let known: HashSet<&str> = buildings.iter().map(|b| b.id.as_str()).collect();
            trends::retain_known_buildings(alerts, &known);
            true
        }
        Err(e) => {
            warn!("Snapshot unavailable, keeping unfiltered alerts: {}", e);
            false
        }
    }
}

pub async fn hotspots<R: ReportRepository + ?Sized>(
    repo: &R,
    limit: usize,
) -> Served<Vec<Hotspot>> {
    list_reports(repo, None)
        .await
        .map(|reports| trends::hotspots(&reports, limit))
}

/// Outcome of one stream batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub received: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub ignored: usize,
    pub malformed: usize,
    /// Alerts that passed the ledger and were handed to the notifier.
    pub alerts: Vec<TrendAlert>,
    /// Detected alerts held back by the ledger.
    pub suppressed: usize,
    pub degraded: bool,
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Alerts that passed the ledger and were handed to the notifier.
    pub alerts: Vec<TrendAlert>,
    /// Detected alerts held back by the ledger.
    pub suppressed: usize,
    pub degraded: bool,
}

/// Trend detection with edge-triggered notification.
pub struct TrendMonitor {
    policy: TrendPolicy,
    ledger: AlertLedger,
    notifier: Arc<dyn Notifier>,
}

impl TrendMonitor {
    pub fn new(policy: TrendPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            policy,
            ledger: AlertLedger::new(),
            notifier,
        }
    }

    pub fn policy(&self) -> &TrendPolicy {
        &self.policy
    }

    pub fn ledger(&self) -> &AlertLedger {
        &self.ledger
    }

    /// Process one change-data-capture batch.
    pub async fn ingest<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        batch: &StreamBatch,
        now: DateTime<Utc>,
    ) -> IngestSummary {
        let decoded = decode_stream_batch(batch);
        let mut summary = IngestSummary {
            received: batch.records.len(),
            ignored: decoded.ignored,
            malformed: decoded.malformed,
            ..Default::default()
        };

        for report in decoded.reports {
            let id = report.id.clone();
            match repo.insert_report(report).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => summary.duplicates += 1,
                Err(e) => {
                    warn!("Failed to store streamed report {}: {}", id, e);
                    summary.degraded = true;
                }
            }
        }

        let observed = self.observe(repo, now).await;
        summary.degraded |= observed.degraded;
        summary.suppressed = observed.suppressed;

        info!(
            "Ingested batch: {} records, {} new reports, {} alerts fired, {} suppressed",
            summary.received,
            summary.inserted,
            observed.alerts.len(),
            summary.suppressed
        );
        summary.alerts = observed.alerts;
        summary
    }

    /// Detect over the window ending at `now` and notify for every alert the
    /// ledger admits.
    pub async fn observe<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        now: DateTime<Utc>,
    ) -> Observation {
        let mut observation = Observation::default();

        let (since, _) = self.policy.bounds(now);
        let window_reports = match repo.recent_reports(since).await {
            Ok(reports) => reports,
            Err(e) => {
                warn!("Report store unavailable, skipping detection: {}", e);
                observation.degraded = true;
                return observation;
            }
        };

        let mut detected = trends::detect(&window_reports, now, &self.policy);
        if !filter_known(repo, &mut detected).await {
            observation.degraded = true;
        }

        let detected_count = detected.len();
        let fired = self.ledger.admit(detected);
        observation.suppressed = detected_count - fired.len();

        let pruned = self.ledger.prune(now - self.policy.window());
        if pruned > 0 {
            debug!("Pruned {} stale alert groups", pruned);
        }

        if !fired.is_empty() {
            let digest = trends::alert_digest(&fired, &window_reports, &self.policy);
            let deliveries = fired.iter().map(|alert| self.notifier.notify(alert, &digest));
            for (alert, result) in fired.iter().zip(join_all(deliveries).await) {
                if let Err(e) = result {
                    warn!(
                        "Failed to notify alert for {} / {}: {}",
                        alert.building_id, alert.issue_type, e
                    );
                }
            }
        }

        observation.alerts = fired;
        observation
    }
}
