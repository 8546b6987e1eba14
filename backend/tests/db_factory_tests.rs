//! Tests for db::factory - repository selection and seeding.

mod support;

use std::str::FromStr;

use campusflow::db::factory::{RepositoryFactory, RepositoryType, DATA_DIR_ENV};
use campusflow::db::{ForecastRepository, ReportRepository, RepositoryError, SnapshotRepository};

#[test]
fn test_repository_type_from_str_local() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str(" memory ").unwrap(), RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("dynamodb");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None)], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_unknown_falls_back() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("cassandra"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_create_local_is_empty_and_healthy() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_buildings().await.unwrap().is_empty());
    assert!(repo.fetch_predictions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_seeded_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    support::write_seed_files(dir.path());

    let repo = RepositoryFactory::create(RepositoryType::Local, Some(dir.path())).unwrap();
    assert_eq!(repo.list_buildings().await.unwrap().len(), 4);
    assert_eq!(repo.list_accessibility().await.unwrap().len(), 2);
    assert!(repo.fetch_predictions().await.unwrap().contains_key(support::EVENING));
    // The duplicate seed report is stored once.
    assert_eq!(repo.list_reports(None).await.unwrap().len(), 2);
}

#[test]
fn test_create_with_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = RepositoryFactory::create(RepositoryType::Local, Some(&missing))
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[test]
fn test_create_with_malformed_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("buildings.json"), "[{\"id\": ").unwrap();

    let err = RepositoryFactory::create(RepositoryType::Local, Some(dir.path()))
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(err.context().entity.as_deref(), Some("buildings.json"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_from_env_reads_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    support::write_seed_files(dir.path());
    let path = dir.path().to_string_lossy().to_string();

    let repo = support::with_scoped_env(
        &[("REPOSITORY_TYPE", Some("local")), (DATA_DIR_ENV, Some(path.as_str()))],
        RepositoryFactory::from_env,
    )
    .unwrap();
    assert_eq!(repo.list_buildings().await.unwrap().len(), 4);
}
