//! Ordered responders for intents the engines do not answer.
//!
//! External collaborators (language models, web search) plug in as
//! [`Responder`]s. The chain tries them in order, each under its own
//! timeout, and always ends with [`LocalRulesResponder`].

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::algorithms::context::Intent;
use crate::models::{BuildingId, BuildingState};

/// Everything a responder may use to answer one query.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub query: String,
    pub intent: Intent,
    pub snapshot: Arc<Vec<BuildingState>>,
    pub current_building: Option<BuildingId>,
    pub mentioned_building: Option<BuildingId>,
    /// One-paragraph campus summary suitable for a prompt.
    pub campus_context: String,
}

#[async_trait]
pub trait Responder: Send + Sync {
    fn name(&self) -> &str;

    async fn respond(&self, request: &ChatRequest) -> anyhow::Result<String>;
}

/// Text produced by the chain and the responder that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAnswer {
    pub responder: String,
    pub text: String,
}

pub struct ResponderChain {
    responders: Vec<Arc<dyn Responder>>,
    timeout: Duration,
}

impl ResponderChain {
    /// Chain of `external` responders followed by the local rules.
    pub fn new(external: Vec<Arc<dyn Responder>>, timeout: Duration) -> Self {
        let mut responders = external;
        responders.push(Arc::new(LocalRulesResponder));
        Self {
            responders,
            timeout,
        }
    }

    pub fn local_only(timeout: Duration) -> Self {
        Self::new(Vec::new(), timeout)
    }

    pub fn names(&self) -> Vec<&str> {
        self.responders.iter().map(|r| r.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First non-empty answer in chain order.
    pub async fn respond(&self, request: &ChatRequest) -> ChainAnswer {
        for responder in &self.responders {
            let name = responder.name();
            match tokio::time::timeout(self.timeout, responder.respond(request)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    debug!("Responder {} answered {} query", name, request.intent.as_str());
                    return ChainAnswer {
                        responder: name.to_string(),
                        text,
                    };
                }
                Ok(Ok(_)) => debug!("Responder {} returned an empty answer", name),
                Ok(Err(e)) => warn!("Responder {} failed: {}", name, e),
                Err(_) => warn!("Responder {} timed out after {:?}", name, self.timeout),
            }
        }

        // Only reachable if the local responder itself was too slow.
        ChainAnswer {
            responder: LocalRulesResponder::NAME.to_string(),
            text: LocalRulesResponder::answer(request),
        }
    }
}

/// Canned guidance built from the snapshot. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRulesResponder;

const FOOD_AMENITY_WORDS: &[&str] = &["food", "dining", "cafe", "café", "restaurant", "coffee"];
const FOOD_LISTING_LIMIT: usize = 8;

const WEATHER_TEXT: &str = "Weather information is not available right now. \
Please check a weather service for current conditions.";

const REGISTRATION_TEXT: &str = "Course registration happens in Workday.\n\
1. Log into Workday with your CWL.\n\
2. Check your registration date and time.\n\
3. Build a saved schedule with backup sections.\n\
4. Register at your assigned time; join the waitlist if a section is full.\n\
Contact your faculty advisor for program-specific questions.";

const HELP_TEXT: &str = "I can help with campus buildings:\n\
- quiet study spots and less crowded alternatives\n\
- how busy a building is right now\n\
- busy times later today\n\
- accessible buildings with elevators\n\
Try asking \"Where can I study?\" or \"I'm at IKB and it's packed\".";

impl LocalRulesResponder {
    pub const NAME: &'static str = "local";

    pub fn answer(request: &ChatRequest) -> String {
        match request.intent {
            Intent::Weather => WEATHER_TEXT.to_string(),
            Intent::Registration => REGISTRATION_TEXT.to_string(),
            Intent::Food => food_answer(&request.snapshot),
            _ if request.campus_context.is_empty() => HELP_TEXT.to_string(),
            _ => format!("{}\n\n{}", request.campus_context, HELP_TEXT),
        }
    }
}

fn food_answer(buildings: &[BuildingState]) -> String {
    let lines: Vec<String> = buildings
        .iter()
        .filter_map(|b| {
            let food: Vec<&str> = b
                .amenities
                .iter()
                .filter(|a| {
                    let lower = a.to_lowercase();
                    FOOD_AMENITY_WORDS.iter().any(|w| lower.contains(w))
                })
                .map(String::as_str)
                .collect();
            (!food.is_empty()).then(|| format!("- {}: {}", b.name, food.join(", ")))
        })
        .take(FOOD_LISTING_LIMIT)
        .collect();

    if lines.is_empty() {
        "I don't have dining information for campus buildings right now.".to_string()
    } else {
        format!("Places to eat on campus:\n{}", lines.join("\n"))
    }
}

#[async_trait]
impl Responder for LocalRulesResponder {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn respond(&self, request: &ChatRequest) -> anyhow::Result<String> {
        Ok(Self::answer(request))
    }
}
