//! Pure decision engines.
//!
//! Every function here operates on borrowed, immutable snapshots and performs
//! no I/O; the service layer fetches data from the repositories first.

pub mod campus;
pub mod context;
pub mod geo;
pub mod recommend;
pub mod slots;
pub mod trends;

pub use campus::{accessible_buildings, campus_stats, route};
pub use context::{classify_intent, extract_current_building, find_mentioned_building, Intent, IntentContext};
pub use geo::{distance, walk_time_minutes};
pub use recommend::{is_crowded, quiet_spots, recommend, RecommendPolicy};
pub use slots::{entries_for, Slot, SlotMatch, SlotMatcher, SlotWindow};
pub use trends::{detect, AlertLedger, TrendPolicy};



#[cfg(test)]
#[path = "slots_tests.rs"]
mod slots_tests;
