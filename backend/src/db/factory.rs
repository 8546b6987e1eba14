//! Repository factory for dependency injection.
//!
//! Chooses and seeds the store implementation from runtime configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Environment variable naming the directory with the JSON seed files.
pub const DATA_DIR_ENV: &str = "CAMPUSFLOW_DATA_DIR";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Read `REPOSITORY_TYPE`, defaulting to `Local`.
    pub fn from_env() -> Self {
        std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(Self::Local)
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository, seeding it from `data_dir` when given.
    pub fn create(
        repo_type: RepositoryType,
        data_dir: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => match data_dir {
                Some(dir) => {
                    if !dir.is_dir() {
                        return Err(RepositoryError::configuration(format!(
                            "Data directory {} does not exist",
                            dir.display()
                        )));
                    }
                    Ok(Arc::new(LocalRepository::from_data_dir(dir)?))
                }
                None => Ok(Self::create_local()),
            },
        }
    }

    /// Create an empty in-memory repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the repository selected by `REPOSITORY_TYPE`, seeded from
    /// `CAMPUSFLOW_DATA_DIR` when set.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env();
        let data_dir = std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from);
        info!(
            "Creating {:?} repository (data dir: {})",
            repo_type,
            data_dir
                .as_deref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Self::create(repo_type, data_dir.as_deref())
    }
}
