//! Per-request context inferred from a chat query.
//!
//! Everything here is a pure function of the query text and the current
//! snapshot: the building the user is at, the building they ask about, and
//! the intent that decides which engine answers.

use serde::{Deserialize, Serialize};

use super::slots::SlotMatcher;
use crate::models::BuildingState;

const LOCATION_WORDS: &[&str] = &["at", "in", "here", "currently", "stuck", "sitting", "studying"];
const CROWD_WORDS: &[&str] = &["full", "busy", "crowded", "packed", "no space"];
const STUDY_WORDS: &[&str] = &[
    "study",
    "studying",
    "quiet",
    "spot",
    "spots",
    "place to work",
    "where can i study",
];
const ACCESSIBILITY_WORDS: &[&str] = &[
    "accessible",
    "accessibility",
    "lift",
    "elevator",
    "elevators",
    "wheelchair",
    "access",
    "ramp",
];
const WEATHER_WORDS: &[&str] = &["weather", "temperature", "rain", "sunny", "forecast"];
const REGISTRATION_WORDS: &[&str] = &[
    "register",
    "registration",
    "enroll",
    "enrollment",
    "course",
    "class",
    "schedule",
    "timetable",
];
const FOOD_WORDS: &[&str] = &[
    "food",
    "eat",
    "dining",
    "cafeteria",
    "restaurant",
    "cafe",
    "coffee",
    "lunch",
    "dinner",
    "breakfast",
];
const QUESTION_PHRASES: &[&str] = &[
    "what is",
    "who is",
    "tell me about",
    "explain",
    "how does",
    "when is",
    "where is",
    "why",
    "how to",
    "how do i",
];

/// Name tokens too generic to identify a building on their own.
const NAME_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "building", "centre", "center", "hall", "library", "learning",
    "student", "campus", "house", "room",
];

/// Minimum length of a name token that identifies a building by itself.
const DISTINCTIVE_TOKEN_LEN: usize = 4;

/// Lowercased word tokens of a query.
///
/// Identifier characters (`_`) stay inside tokens so ids like `old_gym`
/// survive tokenization.
#[derive(Debug, Clone)]
pub struct QueryWords {
    tokens: Vec<String>,
}

impl QueryWords {
    pub fn new(text: &str) -> Self {
        let tokens = text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self { tokens }
    }

    /// Whole-word (or whole-phrase) match.
    pub fn contains(&self, phrase: &str) -> bool {
        let needle: Vec<String> = QueryWords::new(phrase).tokens;
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return false;
        }
        self.tokens.windows(needle.len()).any(|w| w == needle.as_slice())
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.contains(p))
    }
}

/// Whether `building` is referred to by id, full name or a distinctive name token.
pub fn mentions_building(words: &QueryWords, building: &BuildingState) -> bool {
    if words.contains(building.id.as_str()) || words.contains(&building.name) {
        return true;
    }
    QueryWords::new(&building.name).tokens.iter().any(|token| {
        token.chars().count() >= DISTINCTIVE_TOKEN_LEN
            && !NAME_STOP_WORDS.contains(&token.as_str())
            && words.contains(token)
    })
}

/// First snapshot building mentioned in the query.
pub fn find_mentioned_building<'a>(query: &str, buildings: &'a [BuildingState]) -> Option<&'a BuildingState> {
    let words = QueryWords::new(query);
    buildings.iter().find(|b| mentions_building(&words, b))
}

/// Building the user appears to be at.
///
/// Needs a mentioned building plus a location or crowding word anywhere in
/// the query. The first building in snapshot order that qualifies wins.
pub fn extract_current_building<'a>(query: &str, buildings: &'a [BuildingState]) -> Option<&'a BuildingState> {
    let words = QueryWords::new(query);
    if !words.contains_any(LOCATION_WORDS) && !words.contains_any(CROWD_WORDS) {
        return None;
    }
    buildings.iter().find(|b| mentions_building(&words, b))
}

/// Closed set of chat intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    StudySpot,
    Prediction,
    Accessibility,
    BuildingInfo,
    Busy,
    Weather,
    Registration,
    Food,
    GeneralKnowledge,
    Default,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::StudySpot => "study_spot",
            Intent::Prediction => "prediction",
            Intent::Accessibility => "accessibility",
            Intent::BuildingInfo => "building_info",
            Intent::Busy => "busy",
            Intent::Weather => "weather",
            Intent::Registration => "registration",
            Intent::Food => "food",
            Intent::GeneralKnowledge => "general_knowledge",
            Intent::Default => "default",
        }
    }

    /// Intents answered by the engines rather than an external collaborator.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Intent::StudySpot
                | Intent::Prediction
                | Intent::Accessibility
                | Intent::BuildingInfo
                | Intent::Busy
        )
    }
}

/// Facts about a query shared by the intent rules and the responders.
#[derive(Debug, Clone, Default)]
pub struct IntentContext<'a> {
    pub current_building: Option<&'a BuildingState>,
    pub mentioned_building: Option<&'a BuildingState>,
    /// The query names a slot keyword or an hour.
    pub time_reference: bool,
    /// The query uses a forward-looking word such as "later" or "forecast".
    pub forward_looking: bool,
}

impl<'a> IntentContext<'a> {
    pub fn extract(query: &str, buildings: &'a [BuildingState], slots: &SlotMatcher) -> Self {
        let slot = slots.match_slot(query, None);
        Self {
            current_building: extract_current_building(query, buildings),
            mentioned_building: find_mentioned_building(query, buildings),
            time_reference: slot.is_some_and(|m| !m.is_fallback()),
            forward_looking: slots.is_forward_looking(query),
        }
    }
}

type IntentRule = (fn(&QueryWords, &IntentContext<'_>) -> bool, Intent);

fn wants_prediction(words: &QueryWords, ctx: &IntentContext<'_>) -> bool {
    let forward = ctx.forward_looking && !words.contains_any(WEATHER_WORDS);
    let timed = ctx.time_reference && (words.contains_any(STUDY_WORDS) || words.contains_any(CROWD_WORDS));
    forward || timed
}

fn wants_study_spot(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(STUDY_WORDS)
}

fn wants_accessibility(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(ACCESSIBILITY_WORDS)
}

fn names_building(_: &QueryWords, ctx: &IntentContext<'_>) -> bool {
    ctx.mentioned_building.is_some()
}

fn crowded_where_user_is(words: &QueryWords, ctx: &IntentContext<'_>) -> bool {
    ctx.current_building.is_some() && words.contains_any(CROWD_WORDS)
}

fn reports_crowding(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(CROWD_WORDS)
}

fn asks_weather(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(WEATHER_WORDS)
}

fn asks_registration(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(REGISTRATION_WORDS)
}

fn asks_food(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(FOOD_WORDS)
}

fn asks_question(words: &QueryWords, _: &IntentContext<'_>) -> bool {
    words.contains_any(QUESTION_PHRASES)
}

/// Ordered intent rules; the first matching predicate wins.
const INTENT_RULES: &[IntentRule] = &[
    (wants_prediction, Intent::Prediction),
    (wants_study_spot, Intent::StudySpot),
    (wants_accessibility, Intent::Accessibility),
    (crowded_where_user_is, Intent::Busy),
    (names_building, Intent::BuildingInfo),
    (reports_crowding, Intent::Busy),
    (asks_weather, Intent::Weather),
    (asks_registration, Intent::Registration),
    (asks_food, Intent::Food),
    (asks_question, Intent::GeneralKnowledge),
];

pub fn classify_intent(query: &str, ctx: &IntentContext<'_>) -> Intent {
    let words = QueryWords::new(query);
    INTENT_RULES
        .iter()
        .find(|(matches, _)| matches(&words, ctx))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Default)
}
