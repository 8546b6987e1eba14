//! Forecast lookups for time-of-day queries.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::algorithms::slots::{entries_for, Slot, SlotMatcher};
use crate::db::repository::FullRepository;
use crate::models::PredictionEntry;

use super::{absorb, Served};

/// Slot resolved for a query and the forecast rows for it.
///
/// `slot == None` means the query names no time; an empty `entries` with a
/// slot means no prediction is available for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionAnswer {
    pub slot: Option<Slot>,
    pub label: Option<String>,
    /// The slot was offered because the query was forward-looking, not
    /// because it named a time.
    pub fallback: bool,
    pub entries: Vec<PredictionEntry>,
}

pub async fn predict<R: FullRepository + ?Sized>(
    repo: &R,
    matcher: &SlotMatcher,
    query: &str,
    explicit_hour: Option<u32>,
    limit: usize,
) -> Served<PredictionAnswer> {
    let Some(matched) = matcher.match_slot(query, explicit_hour) else {
        debug!("No slot for query {:?} (hour {:?})", query, explicit_hour);
        return Served::fresh(PredictionAnswer::default());
    };

    let window = matched.window();
    let mut answer = PredictionAnswer {
        slot: Some(window.slot),
        label: Some(window.label.clone()),
        fallback: matched.is_fallback(),
        entries: Vec::new(),
    };

    let table = absorb("fetch_predictions", repo.fetch_predictions().await);
    let buildings = absorb("list_buildings", repo.list_buildings().await);
    let known: HashSet<&str> = buildings.data.iter().map(|b| b.id.as_str()).collect();

    answer.entries = entries_for(&window.label, &table.data, &known, limit)
        .into_iter()
        .cloned()
        .collect();

    Served {
        data: answer,
        degraded: table.degraded || buildings.degraded,
    }
}
