use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::PredictionTable;

/// Provider of the per-slot occupancy forecast.
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Slot label to ordered forecast entries. An empty table is valid.
    async fn fetch_predictions(&self) -> RepositoryResult<PredictionTable>;
}
