//! Error taxonomy of the decision engines.

use crate::db::repository::RepositoryError;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the engines to their immediate caller.
///
/// An empty result (no alternatives, no alerts, no prediction) is never an
/// error; it is returned as an empty collection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Latitude outside `[-90, 90]` or longitude outside `[-180, 180]`.
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A referenced entity does not exist in the supplied snapshot.
    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// An upstream store could not be read.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CoreError {
    pub fn building_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "building",
            id: id.into(),
        }
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        CoreError::StoreUnavailable(err.to_string())
    }
}
