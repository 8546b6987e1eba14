//! Incident trend detection over a trailing window of issue reports.
//!
//! [`detect`] is a pure function: it re-filters the supplied reports to the
//! window, groups them by `(building, issue type)` and emits one
//! [`TrendAlert`] per group at or above the count threshold.
//!
//! Re-evaluating a sustained incident would emit the same alert on every
//! batch, so stream consumers pass detections through an [`AlertLedger`],
//! which is edge-triggered: a group re-alerts only when its count grows
//! inside an overlapping window, or once its previous window has fully
//! elapsed.

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::models::{BuildingId, Hotspot, IssueReport, IssueType, Severity, TrendAlert};

/// Window and threshold of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPolicy {
    pub window_minutes: u32,
    pub count_threshold: usize,
}

impl Default for TrendPolicy {
    fn default() -> Self {
        Self {
            window_minutes: 30,
            count_threshold: 5,
        }
    }
}

impl TrendPolicy {
    pub fn window(&self) -> Duration {
        Duration::minutes(i64::from(self.window_minutes))
    }

    /// Inclusive window bounds ending at `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.window(), now)
    }
}

/// Reports with `now - window <= reported_at <= now`.
pub fn reports_in_window<'a>(
    reports: &'a [IssueReport],
    now: DateTime<Utc>,
    policy: &TrendPolicy,
) -> Vec<&'a IssueReport> {
    let (start, end) = policy.bounds(now);
    reports
        .iter()
        .filter(|r| r.reported_at >= start && r.reported_at <= end)
        .collect()
}

/// Detect trending `(building, issue type)` groups.
///
/// Alerts are ordered by building id, then issue type.
pub fn detect(reports: &[IssueReport], now: DateTime<Utc>, policy: &TrendPolicy) -> Vec<TrendAlert> {
    let (window_start, window_end) = policy.bounds(now);

    let mut groups: BTreeMap<(&BuildingId, IssueType), usize> = BTreeMap::new();
    for report in reports_in_window(reports, now, policy) {
        *groups
            .entry((&report.building_id, report.issue_type))
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .filter(|(_, count)| *count >= policy.count_threshold)
        .map(|((building_id, issue_type), count)| TrendAlert {
            building_id: building_id.clone(),
            issue_type,
            count,
            window_start,
            window_end,
            severity: Severity::High,
        })
        .collect()
}

/// Drop alerts whose building is not in the snapshot.
pub fn retain_known_buildings(alerts: &mut Vec<TrendAlert>, known: &HashSet<&str>) {
    alerts.retain(|a| known.contains(a.building_id.as_str()));
}

/// Issue types by frequency, most common first (ties by name).
pub fn most_common_issue_types(reports: &[IssueReport], limit: usize) -> Vec<(IssueType, usize)> {
    let mut counts: HashMap<IssueType, usize> = HashMap::new();
    for report in reports {
        *counts.entry(report.issue_type).or_insert(0) += 1;
    }

    let mut ranked: Vec<(IssueType, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    ranked.truncate(limit);
    ranked
}

/// Buildings with the most open reports (ties by id).
pub fn hotspots(reports: &[IssueReport], limit: usize) -> Vec<Hotspot> {
    let mut counts: HashMap<&BuildingId, usize> = HashMap::new();
    for report in reports.iter().filter(|r| r.is_open()) {
        *counts.entry(&report.building_id).or_insert(0) += 1;
    }

    let mut ranked: Vec<Hotspot> = counts
        .into_iter()
        .map(|(building_id, open_issues)| Hotspot {
            building_id: building_id.clone(),
            open_issues,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.open_issues
            .cmp(&a.open_issues)
            .then_with(|| a.building_id.cmp(&b.building_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Plain-text summary handed to the notifier with a batch of alerts.
pub fn alert_digest(alerts: &[TrendAlert], window_reports: &[IssueReport], policy: &TrendPolicy) -> String {
    let mut lines: Vec<String> = alerts
        .iter()
        .map(|a| {
            format!(
                "- {}: {} reports of '{}' in the last {} minutes",
                a.building_id, a.count, a.issue_type, policy.window_minutes
            )
        })
        .collect();

    let common = most_common_issue_types(window_reports, 3)
        .into_iter()
        .map(|(issue, count)| format!("{}({})", issue, count))
        .collect::<Vec<_>>()
        .join(", ");

    lines.push(format!(
        "Total reports in window: {}; most common: {}",
        window_reports.len(),
        if common.is_empty() { "none" } else { common.as_str() }
    ));
    lines.join("\n")
}

/// Ledger key for one alert group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub building_id: BuildingId,
    pub issue_type: IssueType,
}

impl From<&TrendAlert> for AlertKey {
    fn from(alert: &TrendAlert) -> Self {
        Self {
            building_id: alert.building_id.clone(),
            issue_type: alert.issue_type,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LastAlert {
    count: usize,
    window_end: DateTime<Utc>,
}

type GroupSlot = Arc<Mutex<Option<LastAlert>>>;

/// Memory of the last alert fired per group.
///
/// Decisions hold the outer read guard while they run under the group's own
/// mutex, so workers evaluating different groups never contend and
/// [`prune`](Self::prune) cannot drop a group mid-decision.
#[derive(Default)]
pub struct AlertLedger {
    groups: RwLock<HashMap<AlertKey, GroupSlot>>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `alert` fires, recording it when it does.
    ///
    /// Fires when the group has no prior alert, when the window starts at or
    /// after the prior alert's window end, or when the count strictly exceeds
    /// the prior count inside an overlapping window.
    pub fn should_fire(&self, alert: &TrendAlert) -> bool {
        let key = AlertKey::from(alert);
        {
            let groups = self.groups.read();
            if let Some(slot) = groups.get(&key) {
                return Self::decide(slot, alert);
            }
        }
        let mut groups = self.groups.write();
        let slot = groups.entry(key).or_default();
        Self::decide(slot, alert)
    }

    fn decide(slot: &GroupSlot, alert: &TrendAlert) -> bool {
        let mut last = slot.lock();
        let fire = match *last {
            None => true,
            Some(prev) if alert.window_start >= prev.window_end => true,
            Some(prev) => alert.count > prev.count,
        };

        if fire {
            *last = Some(LastAlert {
                count: alert.count,
                window_end: alert.window_end,
            });
        }
        fire
    }

    /// Keep only the alerts that fire.
    pub fn admit(&self, alerts: Vec<TrendAlert>) -> Vec<TrendAlert> {
        alerts.into_iter().filter(|a| self.should_fire(a)).collect()
    }

    /// Forget groups whose last alert window ended before `cutoff`.
    pub fn prune(&self, cutoff: DateTime<Utc>) -> usize {
        let mut groups = self.groups.write();
        let before = groups.len();
        groups.retain(|_, slot| match *slot.lock() {
            Some(last) => last.window_end >= cutoff,
            None => false,
        });
        before - groups.len()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
