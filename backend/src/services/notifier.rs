//! Delivery of fired trend alerts.

use async_trait::async_trait;
use log::warn;
use parking_lot::Mutex;

use crate::models::TrendAlert;

/// Sink for alerts that passed the ledger.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &TrendAlert, digest: &str) -> anyhow::Result<()>;
}

/// Emits each alert as a structured warning record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &TrendAlert, digest: &str) -> anyhow::Result<()> {
        warn!(
            target: "campusflow::alerts",
            "building={} issue_type={} count={} window_start={} window_end={} severity={}\n{}",
            alert.building_id,
            alert.issue_type,
            alert.count,
            alert.window_start.to_rfc3339(),
            alert.window_end.to_rfc3339(),
            alert.severity.as_str(),
            digest
        );
        Ok(())
    }
}

/// Collects alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(TrendAlert, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<TrendAlert> {
        self.sent.lock().iter().map(|(alert, _)| alert.clone()).collect()
    }

    pub fn digests(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, digest)| digest.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, alert: &TrendAlert, digest: &str) -> anyhow::Result<()> {
        self.sent.lock().push((alert.clone(), digest.to_string()));
        Ok(())
    }
}
