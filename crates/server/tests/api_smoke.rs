//! Router smoke tests over an in-memory store and mock collaborators.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use grabbit_core::testing::{fixtures, MockDownloader, MockSearcher};
use grabbit_core::{
    load_config_from_str, DecisionStore, DownloadDispatcher, Scheduler, SchedulerConfig,
    Searcher, SqliteStore,
};

use grabbit_server::api;
use grabbit_server::state::AppState;

struct TestApp {
    router: axum::Router,
    searcher: Arc<MockSearcher>,
    store: Arc<SqliteStore>,
}

fn test_app() -> TestApp {
    let config = load_config_from_str("").unwrap();
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let searcher = Arc::new(MockSearcher::new());
    let downloads = Arc::new(DownloadDispatcher::new(vec![
        Arc::new(MockDownloader::torrent()) as _,
    ]));
    let scheduler = Arc::new(Scheduler::new(
        SchedulerConfig::default(),
        store.clone() as Arc<dyn DecisionStore>,
        searcher.clone() as Arc<dyn Searcher>,
        downloads,
        None,
        "media",
    ));
    let app_state = Arc::new(AppState::new(
        config,
        store.clone() as _,
        Some(searcher.clone() as _),
        scheduler,
    ));
    TestApp {
        router: api::create_router(app_state),
        searcher,
        store,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let response = app.router.oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_parse_endpoint() {
    let app = test_app();
    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/parse",
            json!({"title": "Movie.Name.2020.1080p.BluRay.x264-GROUP"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["year"], 2020);
    assert_eq!(body["resolution"], "1080p");
    assert_eq!(body["source"], "BluRay");
    assert_eq!(body["codec"], "x264/H264");
    assert_eq!(body["releaseGroup"], "GROUP");
}

#[tokio::test]
async fn test_profile_crud() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/profiles",
            json!({
                "name": "HD",
                "allowedTiers": ["WEB-1080p", "BluRay-1080p"],
                "upgradeAllowed": true,
                "upgradeUntilScore": 10,
                "minFormatScore": 0,
                "cutoffFormatScore": 100,
                "formatScores": {}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    let response = app.router.oneshot(get("/api/v1/profiles")).await.unwrap();
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "HD");
}

#[tokio::test]
async fn test_scored_search_returns_wire_schema() {
    let app = test_app();
    app.searcher
        .set_results(vec![fixtures::raw_result(
            "Movie.2020.1080p.BluRay.x264-GRP",
            3,
        )])
        .await;

    let response = app
        .router
        .oneshot(post_json("/api/v1/search/scored", json!({"query": "movie"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result["indexerId"], 3);
    assert_eq!(result["quality"], "BluRay-1080p");
    assert_eq!(result["rejected"], false);
    assert!(result["totalScore"].as_i64().unwrap() > 0);
    assert!(result.get("customFormatHits").unwrap().is_array());
}

#[tokio::test]
async fn test_scored_search_keeps_rejected_results() {
    let app = test_app();

    // Profile that rejects everything below 2160p
    let profile_id = app
        .store
        .save_profile(&grabbit_core::QualityProfile {
            id: 0,
            name: "UHD only".to_string(),
            allowed_tiers: vec![grabbit_core::QualityTier::Remux2160],
            upgrade_allowed: false,
            upgrade_until_score: 0,
            min_format_score: 0,
            cutoff_format_score: 0,
            format_scores: Default::default(),
        })
        .unwrap();

    app.searcher
        .set_results(vec![fixtures::raw_result(
            "Movie.2020.1080p.BluRay.x264-GRP",
            1,
        )])
        .await;

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/search/scored",
            json!({"query": "movie", "profileId": profile_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1, "rejected candidates are still returned");
    assert_eq!(results[0]["rejected"], true);
    assert_eq!(results[0]["rejectionReason"], "unsupported quality");
}

#[tokio::test]
async fn test_wanted_crud_and_unknown_item_search() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/wanted",
            json!({"title": "The Matrix", "year": 1999, "mediaKind": "movie", "libraryId": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["title"], "The Matrix");

    let response = app
        .router
        .oneshot(post_json("/api/v1/wanted/999/search", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wanted_item_search_returns_decision_and_results() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/wanted",
            json!({"title": "The Matrix", "year": 1999, "mediaKind": "movie", "libraryId": 1}),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["id"].as_i64().unwrap();

    app.searcher
        .set_results(vec![fixtures::raw_result(
            "The.Matrix.1999.1080p.BluRay.x264-GRP",
            1,
        )])
        .await;

    let response = app
        .router
        .oneshot(post_json(&format!("/api/v1/wanted/{id}/search"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["outcome"], "grabbed");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["quality"], "BluRay-1080p");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app();
    let response = app.router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
