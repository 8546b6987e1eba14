//! # CampusFlow
//!
//! Occupancy-aware decision engine for campus facilities.
//!
//! Given a snapshot of building occupancy and a stream of user issue reports,
//! the crate recommends less crowded nearby buildings, detects bursts of
//! similar reports, answers time-of-day occupancy questions from a forecast
//! table and routes chat queries to the engine that can answer them.
//!
//! ## Architecture
//!
//! - [`models`]: buildings, reports, forecasts and engine outputs
//! - [`algorithms`]: pure engines over borrowed snapshots
//! - [`db`]: repository traits and the in-memory store
//! - [`ingest`]: decoding of report-insert change events
//! - [`services`]: store access, degradation and chat orchestration
//! - [`config`]: TOML configuration with environment overrides
//! - `http`: Axum-based REST API (feature `http-server`)

// RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{CoreError, CoreResult};
