//! End-to-end tests of the HTTP API against the in-memory repository.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use campusflow::config::EngineConfig;
use campusflow::db::LocalRepository;
use campusflow::http::{create_router, AppState};
use campusflow::services::MemoryNotifier;

struct TestApp {
    router: Router,
    repo: Arc<LocalRepository>,
    notifier: Arc<MemoryNotifier>,
}

fn test_app() -> TestApp {
    let repo = Arc::new(support::seeded_repository());
    let notifier = Arc::new(MemoryNotifier::new());
    let state =
        AppState::with_notifier(repo.clone(), EngineConfig::default(), notifier.clone()).unwrap();
    TestApp {
        router: create_router(state),
        repo,
        notifier,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Extractor rejections answer in plain text.
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["building_id"].as_str().unwrap().to_string())
        .collect()
}

fn crowd_batch(prefix: &str, count: usize) -> String {
    let records: Vec<Value> = (0..count)
        .map(|i| {
            let ts = (Utc::now() - Duration::minutes(i as i64)).to_rfc3339();
            json!({
                "eventID": format!("{}-{}", prefix, i),
                "eventName": "INSERT",
                "dynamodb": {"NewImage": {
                    "building": {"S": "ikb"},
                    "issue_type": {"S": "crowd"},
                    "timestamp": {"S": ts}
                }}
            })
        })
        .collect();
    json!({ "Records": records }).to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_buildings() {
    let app = test_app();

    let (status, body) = send(&app, get("/v1/buildings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], false);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, get("/v1/buildings/koerner")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Koerner Library");

    let (status, body) = send(&app, get("/v1/buildings/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_alternatives() {
    let app = test_app();

    let (status, body) = send(&app, get("/v1/buildings/ikb/alternatives")).await;
    assert_eq!(status, StatusCode::OK);
    let mut got = ids(&body["data"]);
    got.sort();
    assert_eq!(got, vec!["koerner", "nest"]);

    let (_, body) = send(&app, get("/v1/buildings/ikb/alternatives?threshold=35")).await;
    assert_eq!(ids(&body["data"]), vec!["koerner"]);

    let (status, _) = send(&app, get("/v1/buildings/ikb/alternatives?max_distance_km=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/v1/buildings/nowhere/alternatives")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiet_spots_accessibility_and_stats() {
    let app = test_app();

    let (_, body) = send(&app, get("/v1/quiet-spots?limit=1")).await;
    assert_eq!(ids(&body["data"]), vec!["koerner"]);

    let (_, body) = send(&app, get("/v1/accessibility")).await;
    assert_eq!(ids(&body["data"]), vec!["ikb", "koerner"]);

    let (_, body) = send(&app, get("/v1/stats")).await;
    assert_eq!(body["data"]["total_buildings"], 4);
    assert_eq!(body["data"]["broken_count"], 1);
}

#[tokio::test]
async fn test_route() {
    let app = test_app();

    let (status, body) = send(&app, get("/v1/route?from=ikb&to=koerner")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["distance_km"].as_f64().unwrap() > 0.0);
    assert!(body["walk_time_minutes"].as_u64().unwrap() >= 1);

    let (status, _) = send(&app, get("/v1/route?from=ikb&to=nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/v1/route?from=ikb")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reports() {
    let app = test_app();

    let (status, body) = send(
        &app,
        post(
            "/v1/reports",
            json!({"building": "nest", "issue_type": "outlet", "description": "Dead outlet by the window"})
                .to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["inserted"], true);
    assert_eq!(body["report"]["building_id"], "nest");

    let (status, body) = send(
        &app,
        post("/v1/reports", json!({"building": "nest"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, body) = send(&app, get("/v1/reports?building=nest")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/v1/hotspots")).await;
    assert_eq!(body["data"][0]["building_id"], "nest");
    assert_eq!(body["data"][0]["open_issues"], 1);
}

#[tokio::test]
async fn test_submitted_reports_trigger_alerts() {
    let app = test_app();
    let crowd = json!({"building": "ikb", "issue_type": "crowd", "description": "No seats left"});

    for _ in 0..4 {
        let (status, body) = send(&app, post("/v1/reports", crowd.to_string())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["alerts"], json!([]));
    }
    assert!(app.notifier.is_empty());

    let (_, body) = send(&app, post("/v1/reports", crowd.to_string())).await;
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(body["alerts"][0]["count"], 5);
    assert_eq!(app.notifier.len(), 1);
    assert_eq!(app.notifier.alerts()[0].building_id.as_str(), "ikb");

    // The same trend seen again through the stream stays quiet.
    let (_, body) = send(&app, post("/v1/stream", json!({"Records": []}).to_string())).await;
    assert_eq!(body["suppressed"], 1);
    assert_eq!(app.notifier.len(), 1);
}

#[tokio::test]
async fn test_stream_alerts_fire_once() {
    let app = test_app();

    let (status, body) = send(&app, post("/v1/stream", crowd_batch("a", 5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 5);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(body["alerts"][0]["building_id"], "ikb");
    assert_eq!(app.notifier.len(), 1);

    // Redelivery of the same events neither stores nor notifies again.
    let (_, body) = send(&app, post("/v1/stream", crowd_batch("a", 5))).await;
    assert_eq!(body["duplicates"], 5);
    assert_eq!(body["suppressed"], 1);
    assert_eq!(app.notifier.len(), 1);

    // The on-demand view still reports the active trend.
    let (_, body) = send(&app, get("/v1/trends")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["count"], 5);

    let (status, _) = send(&app, post("/v1/stream", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predictions() {
    let app = test_app();

    let (status, body) = send(&app, get("/v1/predictions?query=find%20a%20spot%20this%20evening")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slot"], "evening");
    assert_eq!(ids(&body["data"]["entries"]), vec!["koerner", "nest"]);

    let (_, body) = send(&app, get("/v1/predictions?query=blue%20elephant")).await;
    assert_eq!(body["data"]["slot"], Value::Null);

    let (status, _) = send(&app, get("/v1/predictions?hour=25")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat() {
    let app = test_app();

    let (status, body) = send(&app, post("/v1/chat", json!({"query": "where can I study"}).to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "study_spot");
    assert_eq!(body["payload"]["kind"], "quiet_spots");

    let (_, body) = send(
        &app,
        post("/v1/chat", json!({"query": "how do I register for courses"}).to_string()),
    )
    .await;
    assert_eq!(body["intent"], "registration");
    assert_eq!(body["responder"], "local");

    let (status, _) = send(&app, post("/v1/chat", json!({"query": "  "}).to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_outage() {
    let app = test_app();
    app.repo.set_healthy(false);

    let (status, body) = send(&app, get("/v1/buildings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(&app, get("/v1/buildings/ikb")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert!(body["details"].as_str().unwrap().contains("operation=get_building"));

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["database"], "disconnected");
}
