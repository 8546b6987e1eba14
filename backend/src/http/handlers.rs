//! HTTP handlers for the REST API.
//!
//! Each handler validates its input and delegates to the service layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{debug, info};

use super::dto::{
    AccessibleBuilding, AlternativesQuery, BuildingState, CampusStats, ChatAnswer, ChatRequestBody, HealthResponse,
    Hotspot, HotspotsQuery, IngestSummary, IssueReport, NewIssueReport, PredictionAnswer,
    PredictionsQuery, QuietSpot, QuietSpotsQuery, Recommendation, ReportsQuery, Route, RouteQuery,
    Served, StoreReportResponse, TrendAlert, TrendsQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::SnapshotRepository;
use crate::ingest::parse_stream_batch;
use crate::models::BuildingId;
use crate::services::{campus, predictions, reports};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn check_hour(hour: Option<u32>) -> Result<(), AppError> {
    match hour {
        Some(h) if h > 23 => Err(AppError::BadRequest(format!(
            "hour must be between 0 and 23, got {}",
            h
        ))),
        _ => Ok(()),
    }
}

fn check_non_negative(name: &str, value: Option<f64>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::BadRequest(format!(
            "{} must be a non-negative number",
            name
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Buildings
// =============================================================================

/// GET /v1/buildings
pub async fn list_buildings(State(state): State<AppState>) -> HandlerResult<Served<Vec<BuildingState>>> {
    Ok(Json(campus::list_buildings(state.repository.as_ref()).await))
}

/// GET /v1/buildings/{id}
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<BuildingState> {
    Ok(Json(campus::get_building(state.repository.as_ref(), &id).await?))
}

/// GET /v1/buildings/{id}/alternatives
///
/// Nearby buildings under the occupancy threshold, closest first.
pub async fn get_alternatives(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AlternativesQuery>,
) -> HandlerResult<Served<Vec<Recommendation>>> {
    check_non_negative("max_distance_km", query.max_distance_km)?;
    check_non_negative("threshold", query.threshold)?;

    let mut policy = state.config.recommend.chat_policy();
    if let Some(d) = query.max_distance_km {
        policy.max_distance_km = d;
    }
    if let Some(t) = query.threshold {
        policy.occupancy_threshold_pct = t;
    }
    if let Some(limit) = query.limit {
        policy.limit = limit;
    }

    let served = campus::alternatives(state.repository.as_ref(), &id, &policy).await?;
    debug!("{} alternatives for {}", served.data.len(), id);
    Ok(Json(served))
}

/// GET /v1/quiet-spots
pub async fn get_quiet_spots(
    State(state): State<AppState>,
    Query(query): Query<QuietSpotsQuery>,
) -> HandlerResult<Served<Vec<QuietSpot>>> {
    check_non_negative("max_occupancy_pct", query.max_occupancy_pct)?;
    let settings = &state.config.recommend;
    let served = campus::quiet_spots(
        state.repository.as_ref(),
        query.max_occupancy_pct.unwrap_or(settings.quiet_max_occupancy_pct),
        query.limit.unwrap_or(settings.quiet_limit),
    )
    .await;
    Ok(Json(served))
}

/// GET /v1/accessibility
pub async fn get_accessible_buildings(
    State(state): State<AppState>,
) -> HandlerResult<Served<Vec<AccessibleBuilding>>> {
    Ok(Json(campus::accessible_buildings(state.repository.as_ref()).await))
}

/// GET /v1/route?from&to
pub async fn get_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> HandlerResult<Route> {
    Ok(Json(
        campus::route(state.repository.as_ref(), &query.from, &query.to).await?,
    ))
}

/// GET /v1/stats
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<Served<CampusStats>> {
    Ok(Json(campus::campus_stats(state.repository.as_ref()).await))
}

// =============================================================================
// Reports & Trends
// =============================================================================

/// POST /v1/reports
///
/// A newly stored report runs through the same detection and alert ledger as
/// streamed reports.
pub async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<NewIssueReport>,
) -> Result<(StatusCode, Json<StoreReportResponse>), AppError> {
    request.validate().map_err(AppError::BadRequest)?;

    let now = Utc::now();
    let report = request.into_report(now);
    let inserted = reports::store_report(state.repository.as_ref(), report.clone()).await?;
    info!(
        "Report {} for {} ({})",
        report.id, report.building_id, report.issue_type
    );

    if !inserted {
        let response = StoreReportResponse { report, inserted, alerts: Vec::new() };
        return Ok((StatusCode::OK, Json(response)));
    }

    let observed = state.trend_monitor.observe(state.repository.as_ref(), now).await;
    let response = StoreReportResponse { report, inserted, alerts: observed.alerts };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/reports?building
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportsQuery>,
) -> HandlerResult<Served<Vec<IssueReport>>> {
    let building = query.building.map(BuildingId::new);
    Ok(Json(
        reports::list_reports(state.repository.as_ref(), building.as_ref()).await,
    ))
}

/// GET /v1/trends
///
/// On-demand detection over the trailing window. Does not touch the alert
/// ledger used by the stream endpoint.
pub async fn get_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> HandlerResult<Served<Vec<TrendAlert>>> {
    let now = query.at.unwrap_or_else(Utc::now);
    let policy = state.config.trends.policy();
    Ok(Json(
        reports::detect_trends(state.repository.as_ref(), now, &policy).await,
    ))
}

/// GET /v1/hotspots
pub async fn get_hotspots(
    State(state): State<AppState>,
    Query(query): Query<HotspotsQuery>,
) -> HandlerResult<Served<Vec<Hotspot>>> {
    let limit = query.limit.unwrap_or(reports::HOTSPOT_LIMIT);
    Ok(Json(reports::hotspots(state.repository.as_ref(), limit).await))
}

/// POST /v1/stream
///
/// Accepts one change-data-capture batch of report inserts.
pub async fn ingest_stream(
    State(state): State<AppState>,
    body: String,
) -> HandlerResult<IngestSummary> {
    let batch = parse_stream_batch(&body)?;
    let summary = state
        .trend_monitor
        .ingest(state.repository.as_ref(), &batch, Utc::now())
        .await;
    Ok(Json(summary))
}

// =============================================================================
// Predictions & Chat
// =============================================================================

/// GET /v1/predictions?query&hour&limit
pub async fn get_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionsQuery>,
) -> HandlerResult<Served<PredictionAnswer>> {
    check_hour(query.hour)?;
    let limit = query.limit.unwrap_or(state.config.predictions.entry_limit);
    let served = predictions::predict(
        state.repository.as_ref(),
        state.chat.matcher(),
        &query.query,
        query.hour,
        limit,
    )
    .await;
    Ok(Json(served))
}

/// POST /v1/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequestBody>,
) -> HandlerResult<ChatAnswer> {
    if request.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }
    check_hour(request.hour)?;

    let answer = state
        .chat
        .answer(state.repository.as_ref(), &request.query, request.hour)
        .await;
    info!(
        "Chat answered as {} by {}",
        answer.intent.as_str(),
        answer.responder
    );
    Ok(Json(answer))
}
