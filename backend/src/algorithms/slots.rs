//! Maps free-text time expressions onto forecast time slots.
//!
//! A [`SlotMatcher`] is compiled once from the configured slot table and then
//! shared read-only. Matching tries, in order: the per-slot keyword lists, an
//! hour of day (explicit or parsed from an `H am|pm` token), and finally the
//! forward-looking words, which fall back to the first configured slot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{PredictionEntry, PredictionTable};

/// Default number of forecast entries returned for a slot.
pub const DEFAULT_ENTRY_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Midday,
    Afternoon,
    Evening,
}

/// One row of the slot table. Hours are inclusive, 0-23.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub slot: Slot,
    /// Forecast table key for this slot.
    pub label: String,
    pub start_hour: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Keyword checks run in ascending priority, then table order.
    #[serde(default)]
    pub keyword_priority: u32,
}

impl SlotWindow {
    pub fn contains_hour(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}

fn window(
    slot: Slot,
    label: &str,
    hours: (u32, u32),
    keywords: &[&str],
    keyword_priority: u32,
) -> SlotWindow {
    SlotWindow {
        slot,
        label: label.to_string(),
        start_hour: hours.0,
        end_hour: hours.1,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        keyword_priority,
    }
}

/// Campus slot table used when the configuration supplies none.
pub fn default_slot_table() -> Vec<SlotWindow> {
    vec![
        window(Slot::Morning, "Morning (7–11 AM)", (7, 10), &["morning", "before class"], 2),
        window(Slot::Midday, "Midday (11 AM–2 PM)", (11, 13), &["lunch", "noon", "midday"], 0),
        window(Slot::Afternoon, "Afternoon (2–6 PM)", (14, 17), &["after class", "afternoon"], 3),
        window(Slot::Evening, "Evening (6–11 PM)", (18, 22), &["tonight", "night", "evening"], 1),
    ]
}

pub fn default_forward_keywords() -> Vec<String> {
    ["later", "predict", "forecast", "plan ahead", "best time"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// How a slot was selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotMatch<'a> {
    Keyword(&'a SlotWindow),
    Hour { window: &'a SlotWindow, hour: u32 },
    /// Forward-looking query with no time in it; the first slot is offered
    /// so the user still gets a forecast.
    Fallback(&'a SlotWindow),
}

impl<'a> SlotMatch<'a> {
    pub fn window(&self) -> &'a SlotWindow {
        match *self {
            SlotMatch::Keyword(w) | SlotMatch::Fallback(w) => w,
            SlotMatch::Hour { window, .. } => window,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SlotMatch::Fallback(_))
    }
}

/// Case-insensitive whole-word alternation over `words`.
fn word_pattern(words: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map(Some)
}

/// Compiled slot table.
#[derive(Debug, Clone)]
pub struct SlotMatcher {
    slots: Vec<SlotWindow>,
    keyword_patterns: Vec<Option<Regex>>,
    /// Slot indices in keyword-check order.
    keyword_order: Vec<usize>,
    forward_pattern: Option<Regex>,
    hour_pattern: Regex,
}

impl SlotMatcher {
    pub fn new(slots: Vec<SlotWindow>, forward_keywords: &[String]) -> Result<Self, regex::Error> {
        let keyword_patterns = slots
            .iter()
            .map(|s| word_pattern(&s.keywords))
            .collect::<Result<Vec<_>, _>>()?;
        let mut keyword_order: Vec<usize> = (0..slots.len()).collect();
        keyword_order.sort_by_key(|&i| slots[i].keyword_priority);

        Ok(Self {
            slots,
            keyword_patterns,
            keyword_order,
            forward_pattern: word_pattern(forward_keywords)?,
            hour_pattern: Regex::new(r"(?i)\b(1[0-2]|0?[1-9])\s*(am|pm)\b")?,
        })
    }

    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(default_slot_table(), &default_forward_keywords())
    }

    pub fn slots(&self) -> &[SlotWindow] {
        &self.slots
    }

    /// Slot containing `hour`, if any.
    pub fn bucket_hour(&self, hour: u32) -> Option<&SlotWindow> {
        self.slots.iter().find(|s| s.contains_hour(hour))
    }

    /// First `H am|pm` token in `text` as a 24-hour value.
    pub fn extract_hour(&self, text: &str) -> Option<u32> {
        let caps = self.hour_pattern.captures(text)?;
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let pm = caps.get(2)?.as_str().eq_ignore_ascii_case("pm");
        Some(hour % 12 + if pm { 12 } else { 0 })
    }

    pub fn is_forward_looking(&self, text: &str) -> bool {
        self.forward_pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Resolve the slot a query refers to.
    ///
    /// Keyword matches win over hours and are tried in keyword priority
    /// order. An `explicit_hour` takes precedence over an hour parsed from
    /// the text.
    pub fn match_slot(&self, query: &str, explicit_hour: Option<u32>) -> Option<SlotMatch<'_>> {
        let keyword = self
            .keyword_order
            .iter()
            .find(|&&i| self.keyword_patterns[i].as_ref().is_some_and(|p| p.is_match(query)))
            .map(|&i| SlotMatch::Keyword(&self.slots[i]));
        if keyword.is_some() {
            return keyword;
        }

        if let Some(hour) = explicit_hour.or_else(|| self.extract_hour(query)) {
            // An hour outside every slot is a definite answer, not a reason
            // to fall back.
            return self
                .bucket_hour(hour)
                .map(|window| SlotMatch::Hour { window, hour });
        }

        if self.is_forward_looking(query) {
            return self.slots.first().map(SlotMatch::Fallback);
        }
        None
    }
}

/// Forecast entries for `label`, restricted to buildings in `known`.
///
/// Source order is preserved. An absent label or no resolvable entry yields
/// an empty vector.
pub fn entries_for<'a>(
    label: &str,
    predictions: &'a PredictionTable,
    known: &HashSet<&str>,
    limit: usize,
) -> Vec<&'a PredictionEntry> {
    predictions
        .get(label)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| known.contains(e.building_id.as_str()))
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}
