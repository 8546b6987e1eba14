//! Decoding of report-insert change events.
//!
//! The report store publishes change-data-capture batches where every field
//! value is wrapped in a type tag (`{"S": "ikb"}`, `{"N": "3"}`). This module
//! turns such a batch into [`IssueReport`]s so the detector never sees the
//! wire encoding. Only `INSERT` records are decoded; a malformed record is
//! logged and skipped without failing the rest of the batch.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{BuildingId, IssueReport, IssueType, ReportId, ReportStatus, Severity};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid stream batch: {0}")]
    InvalidBatch(#[from] serde_json::Error),
}

/// One change-data-capture delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb: Option<StreamChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChange {
    /// Item attributes after the change, each a single-entry type-tag map.
    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<HashMap<String, Value>>,
}

/// Reports decoded from one batch plus bookkeeping for logs and responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    pub reports: Vec<IssueReport>,
    /// Records that were not inserts.
    pub ignored: usize,
    /// Insert records that could not be decoded.
    pub malformed: usize,
}

pub fn parse_stream_batch(payload: &str) -> Result<StreamBatch, IngestError> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode every `INSERT` record of `batch`.
pub fn decode_stream_batch(batch: &StreamBatch) -> DecodedBatch {
    let mut decoded = DecodedBatch::default();

    for (index, record) in batch.records.iter().enumerate() {
        if record.event_name != "INSERT" {
            debug!("Ignoring {} record {}", record.event_name, index);
            decoded.ignored += 1;
            continue;
        }

        match decode_record(record) {
            Ok(report) => decoded.reports.push(report),
            Err(reason) => {
                warn!(
                    "Skipping malformed stream record {} ({}): {}",
                    index,
                    record.event_id.as_deref().unwrap_or("no event id"),
                    reason
                );
                decoded.malformed += 1;
            }
        }
    }

    decoded
}

/// Value of a string or number attribute.
fn scalar_attr(image: &HashMap<String, Value>, key: &str) -> Option<String> {
    let tagged = image.get(key)?;
    tagged
        .get("S")
        .or_else(|| tagged.get("N"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Producers also emit naive ISO timestamps, which are UTC.
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn decode_record(record: &StreamRecord) -> Result<IssueReport, String> {
    let image = record
        .dynamodb
        .as_ref()
        .and_then(|change| change.new_image.as_ref())
        .ok_or("missing NewImage")?;

    let building = scalar_attr(image, "building")
        .or_else(|| scalar_attr(image, "building_id"))
        .filter(|b| !b.trim().is_empty())
        .ok_or("missing building")?;

    let raw_timestamp = scalar_attr(image, "timestamp")
        .or_else(|| scalar_attr(image, "reported_at"))
        .ok_or("missing timestamp")?;
    let reported_at =
        parse_timestamp(&raw_timestamp).ok_or_else(|| format!("bad timestamp '{}'", raw_timestamp))?;

    let issue_type = scalar_attr(image, "issue_type")
        .map(|raw| raw.parse().unwrap_or(IssueType::Other))
        .unwrap_or_default();
    let severity = scalar_attr(image, "severity")
        .and_then(|raw| raw.parse::<Severity>().ok())
        .unwrap_or_default();
    let status = match scalar_attr(image, "status").as_deref() {
        Some("resolved") => ReportStatus::Resolved,
        _ => ReportStatus::Open,
    };

    // Without an item id the event id keeps redelivered records idempotent.
    let id = scalar_attr(image, "id")
        .or_else(|| scalar_attr(image, "report_id"))
        .or_else(|| record.event_id.clone())
        .unwrap_or_else(|| format!("{}_{}", building.trim(), reported_at.timestamp_micros()));

    Ok(IssueReport {
        id: ReportId::new(id),
        building_id: BuildingId::new(building.trim()),
        issue_type,
        severity,
        status,
        description: scalar_attr(image, "description").unwrap_or_default(),
        reported_at,
        photo_url: scalar_attr(image, "photo_url"),
    })
}
