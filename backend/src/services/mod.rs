//! Service layer between the stores and the pure engines.
//!
//! Services fetch what an engine needs through the repository traits, run
//! the engine and package the result. A store failure never surfaces as an
//! error from a listing service: it is logged, converted to
//! [`CoreError::StoreUnavailable`](crate::error::CoreError) semantics and
//! answered with an empty result flagged as degraded.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryResult;
use crate::error::CoreError;

pub mod campus;
pub mod chat;
pub mod notifier;
pub mod predictions;
pub mod reports;
pub mod responders;

pub use chat::{BusyEntry, ChatAnswer, ChatEngine, ChatPayload};
pub use notifier::{LogNotifier, MemoryNotifier, Notifier};
pub use predictions::PredictionAnswer;
pub use reports::{IngestSummary, Observation, TrendMonitor};
pub use responders::{ChainAnswer, ChatRequest, LocalRulesResponder, Responder, ResponderChain};

/// A service result plus whether it was computed without a required store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Served<T> {
    pub data: T,
    pub degraded: bool,
}

impl<T> Served<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            degraded: false,
        }
    }

    pub fn degraded(data: T) -> Self {
        Self {
            data,
            degraded: true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            data: f(self.data),
            degraded: self.degraded,
        }
    }
}

/// Unwrap a store read, or log it and fall back to an empty degraded value.
pub(crate) fn absorb<T: Default>(operation: &str, result: RepositoryResult<T>) -> Served<T> {
    match result {
        Ok(data) => Served::fresh(data),
        Err(e) => {
            let err = CoreError::from(e);
            warn!("{} degraded: {}", operation, err);
            Served::degraded(T::default())
        }
    }
}
