//! Store abstractions used by the service layer.
//!
//! Each external collaborator gets its own trait so tests can fail one of
//! them independently. [`FullRepository`] bundles all three for the HTTP
//! state and the factory.

pub mod error;
pub mod forecast;
pub mod reports;
pub mod snapshot;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use forecast::ForecastRepository;
pub use reports::ReportRepository;
pub use snapshot::SnapshotRepository;

/// Every store capability the engines consume.
pub trait FullRepository: SnapshotRepository + ReportRepository + ForecastRepository {}

impl<T> FullRepository for T where T: SnapshotRepository + ReportRepository + ForecastRepository {}
