use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::json;

use reelmatch_api::{
    api::{create_router, AppState},
    config::RecommendationSettings,
    db::MemoryInteractionStore,
    middleware::request_id::REQUEST_ID_HEADER,
    models::{Movie, RecommendationResponse},
    services::RecommendationEngine,
};

fn catalog() -> MemoryInteractionStore {
    MemoryInteractionStore::new()
        .with_movie(
            Movie::new("heat-1995", "Heat").with_release_year(1995).with_review_count(400),
            ["crime", "thriller"],
        )
        .with_movie(
            Movie::new("ronin-1998", "Ronin").with_release_year(1998).with_review_count(150),
            ["action", "thriller"],
        )
        .with_movie(
            Movie::new("paddington-2014", "Paddington").with_release_year(2014).with_review_count(300),
            ["family", "comedy"],
        )
        .with_favorite("ana", "heat-1995")
        .with_favorite("ana", "ronin-1998")
        .with_like("bo", "heat-1995")
        .with_like("bo", "paddington-2014")
}

fn app() -> axum::Router {
    let engine = RecommendationEngine::new(Arc::new(catalog()), RecommendationSettings::default());
    create_router(AppState::new(engine))
}

fn create_test_server() -> TestServer {
    TestServer::new(app()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations_endpoint() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "movie_slugs": ["heat-1995"] }))
        .await;

    response.assert_status_ok();
    let body: RecommendationResponse = response.json();
    let slugs: Vec<&str> = body.recommendations.iter().map(|r| r.slug()).collect();
    assert_eq!(slugs, vec!["ronin-1998"]);
    assert_eq!(body.recommendations[0].movie.title, "Ronin");
    assert_eq!(body.recommendations[0].genres, vec!["action", "thriller"]);
    assert!(body.recommendations[0].score > 0.0);
}

#[tokio::test]
async fn test_empty_seed_list_is_not_an_error() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "movie_slugs": [] }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_too_many_seeds_is_rejected() {
    let server = create_test_server();
    let slugs: Vec<String> = (0..26).map(|i| format!("movie-{i}")).collect();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "movie_slugs": slugs }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("25"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = "6f1c2b1e-7c47-4d55-9b8e-0c3f6b8a9d21";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_static(request_id),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        request_id
    );
}
