use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use lastmile::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{path_into_destination, planner_with, FakeRoutingProvider};

fn setup_test_app(provider: FakeRoutingProvider) -> axum::Router {
    let path = path_into_destination(20, 50.0, 25.0);
    let planner = planner_with(Arc::new(provider), &path);
    let state = Arc::new(AppState { planner });

    lastmile::routes::create_router(state)
}

fn scripted_provider() -> FakeRoutingProvider {
    let path = path_into_destination(20, 50.0, 25.0);
    FakeRoutingProvider::new(&path, |d| {
        if (d - 175.0).abs() < 5.0 {
            Some((420.0, 120.0))
        } else {
            Some((200.0, 300.0))
        }
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = setup_test_app(scripted_provider());

    let request = Request::builder()
        .uri("/debug/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["routing_provider"], "fake");
}

#[tokio::test]
async fn test_hybrid_route_endpoint() {
    let app = setup_test_app(scripted_provider());

    let response = app
        .oneshot(post_json(
            "/routes/hybrid",
            json!({"origin": "Home", "destination": "Office", "cutoff_distance": 300}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["recommendation"], "hybrid");
    assert_eq!(json["dropoff_point"]["optimization_type"], "optimized");
    assert_eq!(json["dropoff_point"]["time_saved"], "5 minutes");
    assert_eq!(json["hybrid_route"]["walking_leg"]["duration"], "2 mins");
    assert!(json["full_drive_route"]["polyline"].is_string());
    assert_eq!(json["evaluation"]["sampled"], 4);
}

#[tokio::test]
async fn test_calculate_route_alias() {
    let app = setup_test_app(FakeRoutingProvider::new(
        &path_into_destination(20, 50.0, 25.0),
        |_| None,
    ));

    let response = app
        .oneshot(post_json(
            "/calculate-route",
            json!({"origin": "Home", "destination": "Office"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["recommendation"], "drive_only");
    assert!(json["message"].is_string());
    assert!(json.get("hybrid_route").is_none());
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = setup_test_app(scripted_provider());

    let response = app
        .oneshot(post_json("/routes/hybrid", json!({"origin": "Home"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = read_json(response).await;
    assert_eq!(json["error"], "Bad Request");
    assert_eq!(json["message"], "Origin and destination are required");
}

#[tokio::test]
async fn test_unknown_location_not_found() {
    let app = setup_test_app(scripted_provider());

    let response = app
        .oneshot(post_json(
            "/routes/hybrid",
            json!({"origin": "Atlantis", "destination": "Office"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = read_json(response).await;
    assert_eq!(json["message"], "Location not found: Atlantis");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = setup_test_app(FakeRoutingProvider::failing(
        lastmile::services::routing::RouteError::Upstream("HTTP 401".to_string()),
    ));

    let response = app
        .oneshot(post_json(
            "/routes/hybrid",
            json!({"origin": "Home", "destination": "Office"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = read_json(response).await;
    assert_eq!(json["message"], "Routing service error");
}

#[tokio::test]
async fn test_undecodable_bodies_are_json_bad_requests() {
    let bodies = [
        r#"{"origin":"Home","destination":"Office","cutoff_distance":"far"}"#,
        r#"{"origin":42,"destination":"Office"}"#,
        r#"{"origin":"Home","#,
    ];

    for body in bodies {
        let app = setup_test_app(scripted_provider());
        let request = Request::builder()
            .method("POST")
            .uri("/routes/hybrid")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);

        let json = read_json(response).await;
        assert_eq!(json["error"], "Bad Request");
        assert!(json["message"].is_string());
    }
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = setup_test_app(scripted_provider());
    let request = Request::builder()
        .method("POST")
        .uri("/calculate-route")
        .body(Body::from(r#"{"origin":"Home","destination":"Office"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["message"].is_string());
}
