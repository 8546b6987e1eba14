//! Read access to the current campus snapshot.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AccessibilityInfo, BuildingId, BuildingState};

/// Source of building states and accessibility records.
///
/// Snapshots are read fresh on every request; engines never mutate them.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Check whether the store can currently serve reads.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// All buildings, in the provider's order.
    ///
    /// Order matters: current-building extraction picks the first match.
    async fn list_buildings(&self) -> RepositoryResult<Vec<BuildingState>>;

    /// Look up one building.
    ///
    /// # Returns
    /// * `Ok(None)` - The id is not in the snapshot
    async fn get_building(&self, id: &BuildingId) -> RepositoryResult<Option<BuildingState>> {
        Ok(self
            .list_buildings()
            .await?
            .into_iter()
            .find(|b| &b.id == id))
    }

    async fn list_accessibility(&self) -> RepositoryResult<Vec<AccessibilityInfo>>;
}
