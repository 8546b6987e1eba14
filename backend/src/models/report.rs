use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::building::BuildingId;
use crate::define_key_type;

define_key_type!(ReportId);

/// Category of a facility issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Outlet,
    Accessibility,
    Crowd,
    Temperature,
    #[default]
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::Outlet,
        IssueType::Accessibility,
        IssueType::Crowd,
        IssueType::Temperature,
        IssueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Outlet => "outlet",
            IssueType::Accessibility => "accessibility",
            IssueType::Crowd => "crowd",
            IssueType::Temperature => "temperature",
            IssueType::Other => "other",
        }
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outlet" => Ok(Self::Outlet),
            "accessibility" => Ok(Self::Accessibility),
            "crowd" => Ok(Self::Crowd),
            "temperature" => Ok(Self::Temperature),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown issue type: {}", s)),
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Resolved,
}

/// A stored facility issue report.
///
/// Reports are append-only from the engine's point of view; status
/// transitions happen outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    pub id: ReportId,
    pub building_id: BuildingId,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub description: String,
    pub reported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl IssueReport {
    pub fn is_open(&self) -> bool {
        self.status == ReportStatus::Open
    }
}

/// Submission payload for a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssueReport {
    #[serde(alias = "building")]
    pub building_id: String,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl NewIssueReport {
    /// Check the required fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.building_id.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Missing required fields: building and description".to_string());
        }
        Ok(())
    }

    /// Turn the submission into a stored report with a fresh id.
    pub fn into_report(self, reported_at: DateTime<Utc>) -> IssueReport {
        IssueReport {
            id: ReportId::new(uuid::Uuid::new_v4().to_string()),
            building_id: BuildingId::new(self.building_id.trim()),
            issue_type: self.issue_type,
            severity: self.severity,
            status: ReportStatus::Open,
            description: self.description,
            reported_at,
            photo_url: self.photo_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_from_str() {
        assert_eq!("Crowd".parse::<IssueType>().unwrap(), IssueType::Crowd);
        assert_eq!(" outlet ".parse::<IssueType>().unwrap(), IssueType::Outlet);
        assert!("flood".parse::<IssueType>().is_err());
    }

    #[test]
    fn test_new_report_validation() {
        let mut new = NewIssueReport {
            building_id: "ikb".to_string(),
            issue_type: IssueType::Outlet,
            severity: Severity::Low,
            description: String::new(),
            photo_url: None,
        };
        assert!(new.validate().is_err());

        new.description = "Outlets on floor 2 are dead".to_string();
        assert!(new.validate().is_ok());

        let report = new.into_report(Utc::now());
        assert_eq!(report.building_id.as_str(), "ikb");
        assert_eq!(report.status, ReportStatus::Open);
        assert!(!report.id.as_str().is_empty());
    }

    #[test]
    fn test_new_report_accepts_legacy_building_field() {
        let json = r#"{"building": "nest", "description": "too hot"}"#;
        let new: NewIssueReport = serde_json::from_str(json).unwrap();
        assert_eq!(new.building_id, "nest");
        assert_eq!(new.issue_type, IssueType::Other);
        assert_eq!(new.severity, Severity::Medium);
    }
}
