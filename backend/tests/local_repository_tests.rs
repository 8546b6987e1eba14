//! Tests for the in-memory repository.

mod support;

use chrono::{Duration, TimeZone, Utc};

use campusflow::db::{
    ForecastRepository, LocalRepository, ReportRepository, RepositoryError, SnapshotRepository,
};
use campusflow::models::{
    BuildingId, BuildingStatus, IssueReport, IssueType, ReportId, ReportStatus, Severity,
};

fn report(id: &str, building: &str, minutes_ago: i64) -> IssueReport {
    let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
    IssueReport {
        id: ReportId::from(id),
        building_id: BuildingId::from(building),
        issue_type: IssueType::Outlet,
        severity: Severity::Low,
        status: ReportStatus::Open,
        description: "outlet dead".to_string(),
        reported_at: now - Duration::minutes(minutes_ago),
        photo_url: None,
    }
}

#[tokio::test]
async fn test_get_building() {
    let repo = support::seeded_repository();
    let ikb = repo.get_building(&BuildingId::from("ikb")).await.unwrap();
    assert_eq!(ikb.unwrap().status, BuildingStatus::Busy);
    assert!(repo
        .get_building(&BuildingId::from("missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_upsert_building_replaces_by_id() {
    let repo = support::seeded_repository();
    let mut ikb = support::campus().remove(0);
    ikb.occupancy = 10;
    repo.upsert_building(ikb);

    let buildings = repo.list_buildings().await.unwrap();
    assert_eq!(buildings.len(), 4);
    assert_eq!(buildings.iter().find(|b| b.id.as_str() == "ikb").unwrap().occupancy, 10);
}

#[tokio::test]
async fn test_reports_are_newest_first_and_filterable() {
    let repo = LocalRepository::new();
    repo.insert_report(report("a", "ikb", 30)).await.unwrap();
    repo.insert_report(report("b", "nest", 10)).await.unwrap();
    repo.insert_report(report("c", "ikb", 20)).await.unwrap();

    let all: Vec<String> = repo
        .list_reports(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(all, vec!["b", "c", "a"]);

    let ikb = repo.list_reports(Some(&BuildingId::from("ikb"))).await.unwrap();
    assert_eq!(ikb.len(), 2);
    assert_eq!(repo.report_count(), 3);
}

#[tokio::test]
async fn test_recent_reports_bound_is_inclusive() {
    let repo = LocalRepository::new();
    let boundary = report("edge", "ikb", 30);
    let since = boundary.reported_at;
    repo.insert_report(boundary).await.unwrap();
    repo.insert_report(report("old", "ikb", 31)).await.unwrap();

    let recent = repo.recent_reports(since).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id.as_str(), "edge");
}

#[tokio::test]
async fn test_insert_is_idempotent() {
    let repo = LocalRepository::new();
    assert!(repo.insert_report(report("a", "ikb", 0)).await.unwrap());
    assert!(!repo.insert_report(report("a", "ikb", 5)).await.unwrap());
    assert_eq!(repo.report_count(), 1);
}

#[tokio::test]
async fn test_unhealthy_store_fails_every_call() {
    let repo = support::seeded_repository();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.list_buildings().await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    assert!(err.is_retryable());
    assert_eq!(err.context().operation.as_deref(), Some("list_buildings"));

    assert!(repo.fetch_predictions().await.is_err());
    assert!(repo.insert_report(report("a", "ikb", 0)).await.is_err());

    repo.set_healthy(true);
    assert_eq!(repo.list_buildings().await.unwrap().len(), 4);
}
