//! Chat queries answered from the snapshot.
//!
//! Each query is classified once; local intents are answered by the engines
//! and the rest go through the [`ResponderChain`].

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::algorithms::campus;
use crate::algorithms::context::{classify_intent, Intent, IntentContext};
use crate::algorithms::recommend::{self as recommender, is_crowded, RecommendPolicy};
use crate::algorithms::slots::SlotMatcher;
use crate::config::{ConfigError, EngineConfig, RecommendSettings};
use crate::db::repository::FullRepository;
use crate::models::{
    AccessibleBuilding, BuildingId, BuildingState, QuietSpot, Recommendation,
};

use super::predictions::{predict, PredictionAnswer};
use super::responders::{ChatRequest, ResponderChain};
use super::{absorb, Served};

/// Crowded buildings covered by the busy overview.
pub const BUSY_OVERVIEW_LIMIT: usize = 3;

const ENGINE_RESPONDER: &str = "engine";

/// A crowded building and where to go instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyEntry {
    pub building_id: BuildingId,
    pub occupancy_pct: f64,
    pub alternatives: Vec<Recommendation>,
}

/// Structured data behind a chat answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatPayload {
    Alternatives {
        origin: BuildingId,
        occupancy_pct: f64,
        recommendations: Vec<Recommendation>,
    },
    QuietSpots {
        spots: Vec<QuietSpot>,
    },
    Accessible {
        buildings: Vec<AccessibleBuilding>,
    },
    Building {
        building: BuildingState,
        alternatives: Vec<Recommendation>,
    },
    BusyOverview {
        entries: Vec<BusyEntry>,
    },
    Prediction {
        prediction: PredictionAnswer,
    },
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub intent: Intent,
    pub text: String,
    /// `engine` for local intents, otherwise the responder that answered.
    pub responder: String,
    pub current_building: Option<BuildingId>,
    pub payload: ChatPayload,
    pub degraded: bool,
}

pub struct ChatEngine {
    recommend: RecommendSettings,
    prediction_limit: usize,
    matcher: Arc<SlotMatcher>,
    responders: ResponderChain,
}

impl ChatEngine {
    pub fn new(config: &EngineConfig, matcher: Arc<SlotMatcher>, responders: ResponderChain) -> Self {
        Self {
            recommend: config.recommend.clone(),
            prediction_limit: config.predictions.entry_limit,
            matcher,
            responders,
        }
    }

    /// Engine with only the local responder.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let matcher = Arc::new(config.predictions.matcher()?);
        let responders = ResponderChain::local_only(config.server.responder_timeout());
        Ok(Self::new(config, matcher, responders))
    }

    pub fn matcher(&self) -> &Arc<SlotMatcher> {
        &self.matcher
    }

    pub fn responders(&self) -> &ResponderChain {
        &self.responders
    }

    pub async fn answer<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        query: &str,
        hour: Option<u32>,
    ) -> ChatAnswer {
        let snapshot = absorb("list_buildings", repo.list_buildings().await);
        let buildings = snapshot.data;
        let ctx = IntentContext::extract(query, &buildings, &self.matcher);
        let intent = classify_intent(query, &ctx);
        let current = ctx.current_building.map(|b| b.id.clone());
        info!(
            "Chat query classified as {} (current building: {:?})",
            intent.as_str(),
            current.as_ref().map(BuildingId::as_str)
        );

        let names: HashMap<&str, &str> = buildings
            .iter()
            .map(|b| (b.id.as_str(), b.name.as_str()))
            .collect();

        let local = match intent {
            Intent::StudySpot => Some(match ctx.current_building {
                Some(origin) => self.around(origin, &buildings, &names),
                None => self.quiet_spots(&buildings, &names),
            }),
            Intent::Busy => Some(match ctx.current_building {
                Some(origin) => self.move_from(origin, &buildings, &names),
                None => self.busy_overview(&buildings, &names),
            }),
            Intent::BuildingInfo => ctx
                .mentioned_building
                .map(|building| self.building_info(building, &buildings, &names)),
            Intent::Accessibility => Some(self.accessibility(repo, &buildings, &names).await),
            Intent::Prediction => Some(self.prediction(repo, query, hour, &names).await),
            _ => None,
        };

        if let Some(reply) = local {
            return ChatAnswer {
                intent,
                text: reply.data.0,
                responder: ENGINE_RESPONDER.to_string(),
                current_building: current,
                payload: reply.data.1,
                degraded: snapshot.degraded || reply.degraded,
            };
        }

        let request = ChatRequest {
            query: query.to_string(),
            intent,
            current_building: current.clone(),
            mentioned_building: ctx.mentioned_building.map(|b| b.id.clone()),
            campus_context: campus_context(&buildings),
            snapshot: Arc::new(buildings.clone()),
        };
        let answer = self.responders.respond(&request).await;
        ChatAnswer {
            intent,
            text: answer.text,
            responder: answer.responder,
            current_building: current,
            payload: ChatPayload::None,
            degraded: snapshot.degraded,
        }
    }

    fn alternatives_for(
        &self,
        origin: &BuildingState,
        buildings: &[BuildingState],
        policy: &RecommendPolicy,
    ) -> Vec<Recommendation> {
        recommender::recommend(origin.id.as_str(), buildings, policy).unwrap_or_else(|e| {
            warn!("No alternatives for {}: {}", origin.id, e);
            Vec::new()
        })
    }

    /// The user is at `origin`: offer alternatives if it is crowded.
    /// Study spot at `origin`: stay unless it is crowded.
    fn around(
        &self,
        origin: &BuildingState,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let pct = origin.occupancy_pct();
        if !is_crowded(origin) {
            let text = format!(
                "{} is at {:.0}% capacity, so you should be able to find a spot there.",
                origin.name, pct
            );
            let payload = ChatPayload::Building {
                building: origin.clone(),
                alternatives: Vec::new(),
            };
            return Served::fresh((text, payload));
        }
        self.move_from(origin, buildings, names)
    }

    /// The user finds `origin` too busy; always offer somewhere else.
    fn move_from(
        &self,
        origin: &BuildingState,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let pct = origin.occupancy_pct();
        let recommendations =
            self.alternatives_for(origin, buildings, &self.recommend.chat_policy());
        let mut text = format!("{} is at {:.0}% capacity.", origin.name, pct);
        if recommendations.is_empty() {
            text.push_str(" There are no quieter buildings within walking distance right now.");
        } else {
            text.push_str(" Nearby alternatives:");
            push_recommendations(&mut text, &recommendations, names);
        }

        Served::fresh((
            text,
            ChatPayload::Alternatives {
                origin: origin.id.clone(),
                occupancy_pct: pct,
                recommendations,
            },
        ))
    }

    fn quiet_spots(
        &self,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let spots = recommender::quiet_spots(
            buildings,
            self.recommend.quiet_max_occupancy_pct,
            self.recommend.quiet_limit,
        );
        let text = if spots.is_empty() {
            "Every building is fairly busy right now.".to_string()
        } else {
            let mut text = "Quiet places to study right now:".to_string();
            for spot in &spots {
                let _ = write!(
                    text,
                    "\n- {} ({:.0}% full)",
                    display_name(names, &spot.building_id),
                    spot.occupancy_pct
                );
            }
            text
        };
        Served::fresh((text, ChatPayload::QuietSpots { spots }))
    }

    fn busy_overview(
        &self,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let policy = self.recommend.overview_policy();
        let mut crowded: Vec<&BuildingState> = buildings
            .iter()
            .filter(|b| !b.is_broken() && is_crowded(b))
            .collect();
        crowded.sort_by(|a, b| {
            b.occupancy_pct()
                .total_cmp(&a.occupancy_pct())
                .then_with(|| a.id.cmp(&b.id))
        });
        crowded.truncate(BUSY_OVERVIEW_LIMIT);

        let entries: Vec<BusyEntry> = crowded
            .into_iter()
            .map(|b| BusyEntry {
                building_id: b.id.clone(),
                occupancy_pct: b.occupancy_pct(),
                alternatives: self.alternatives_for(b, buildings, &policy),
            })
            .collect();

        let text = if entries.is_empty() {
            "No building is crowded right now.".to_string()
        } else {
            let mut text = "Busiest buildings right now:".to_string();
            for entry in &entries {
                let _ = write!(
                    text,
                    "\n- {} ({:.0}% full)",
                    display_name(names, &entry.building_id),
                    entry.occupancy_pct
                );
                if let Some(best) = entry.alternatives.first() {
                    let _ = write!(
                        text,
                        ", try {} ({} min walk)",
                        display_name(names, &best.building_id),
                        best.walk_time_minutes
                    );
                }
            }
            text
        };
        Served::fresh((text, ChatPayload::BusyOverview { entries }))
    }

    fn building_info(
        &self,
        building: &BuildingState,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let mut text = format!(
            "{} is {} at {:.0}% capacity ({} of {}).",
            building.name,
            building.status.as_str(),
            building.occupancy_pct(),
            building.occupancy,
            building.capacity
        );
        if !building.amenities.is_empty() {
            let _ = write!(text, " Amenities: {}.", building.amenities.join(", "));
        }

        let alternatives = if is_crowded(building) {
            self.alternatives_for(building, buildings, &self.recommend.chat_policy())
        } else {
            Vec::new()
        };
        if !alternatives.is_empty() {
            text.push_str(" Quieter options nearby:");
            push_recommendations(&mut text, &alternatives, names);
        }

        Served::fresh((
            text,
            ChatPayload::Building {
                building: building.clone(),
                alternatives,
            },
        ))
    }

    async fn accessibility<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        buildings: &[BuildingState],
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let info = absorb("list_accessibility", repo.list_accessibility().await);
        let ranked = campus::accessible_buildings(buildings, &info.data);

        let text = if ranked.is_empty() {
            "I don't have accessibility information right now.".to_string()
        } else {
            let mut text = "Accessible buildings:".to_string();
            for entry in &ranked {
                let _ = write!(
                    text,
                    "\n- {}: {} elevator(s), {} accessible washroom(s)",
                    display_name(names, &entry.building_id),
                    entry.elevators,
                    entry.accessible_washrooms
                );
            }
            text
        };
        Served {
            data: (text, ChatPayload::Accessible { buildings: ranked }),
            degraded: info.degraded,
        }
    }

    async fn prediction<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        query: &str,
        hour: Option<u32>,
        names: &HashMap<&str, &str>,
    ) -> Served<(String, ChatPayload)> {
        let served = predict(repo, &self.matcher, query, hour, self.prediction_limit).await;
        let prediction = served.data;

        let text = match prediction.label.as_deref() {
            None => "Tell me a time of day, like \"this evening\" or \"3pm\", and I'll check the forecast.".to_string(),
            Some(label) if prediction.entries.is_empty() => {
                format!("No prediction is available for {}.", label)
            }
            Some(label) => {
                let mut text = format!("Forecast for {}:", label);
                for entry in &prediction.entries {
                    let _ = write!(
                        text,
                        "\n- {}: {:.0}% expected",
                        display_name(names, &entry.building_id),
                        entry.predicted_occupancy
                    );
                    if !entry.best_time.is_empty() {
                        let _ = write!(text, ", best {}", entry.best_time);
                    }
                }
                text
            }
        };

        Served {
            data: (text, ChatPayload::Prediction { prediction }),
            degraded: served.degraded,
        }
    }
}

fn display_name<'a>(names: &HashMap<&str, &'a str>, id: &'a BuildingId) -> &'a str {
    names.get(id.as_str()).copied().unwrap_or(id.as_str())
}

fn push_recommendations(text: &mut String, recs: &[Recommendation], names: &HashMap<&str, &str>) {
    for rec in recs {
        let _ = write!(
            text,
            "\n- {} ({:.0}% full, {} min walk)",
            display_name(names, &rec.building_id),
            rec.occupancy_pct,
            rec.walk_time_minutes
        );
    }
}

/// Short campus summary handed to external responders.
pub fn campus_context(buildings: &[BuildingState]) -> String {
    if buildings.is_empty() {
        return String::new();
    }
    let stats = campus::campus_stats(buildings);
    format!(
        "{} buildings tracked: {} busy, {} quiet, {} closed. Campus occupancy {:.0}%.",
        stats.total_buildings,
        stats.busy_count,
        stats.quiet_count,
        stats.broken_count,
        stats.occupancy_pct
    )
}
