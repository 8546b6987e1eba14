//! Storage layer.
//!
//! The engines never perform I/O. Services fetch snapshots, reports and
//! forecasts through the repository traits defined here and hand the data to
//! the pure functions in [`crate::algorithms`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers / stream consumers             │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  services - degrade on store failure          │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  repository traits                            │
//! │  Snapshot / Report / Forecast                 │
//! └───────────────────┬──────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────┐
//!     │  LocalRepository (in-memory)  │
//!     └──────────────────────────────┘
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType, DATA_DIR_ENV};
pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, ForecastRepository, FullRepository, ReportRepository, RepositoryError,
    RepositoryResult, SnapshotRepository,
};
