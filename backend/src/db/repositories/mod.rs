//! Store implementations.
//!
//! - `local`: in-memory store, seeded from JSON data files, used by the
//!   server and by tests
pub mod local;

pub use local::LocalRepository;
