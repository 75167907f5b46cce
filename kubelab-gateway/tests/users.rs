use httpmock::prelude::*;
use kubelab_telemetry::tracing::init_test_tracing;
use reqwest::StatusCode;

use crate::support::test_app::{closed_port_url, spawn_test_app};

mod support;

#[tokio::test(flavor = "multi_thread")]
async fn listing_users_passes_the_upstream_body_through() {
    init_test_tracing();
    // Arrange
    let upstream = MockServer::start_async().await;
    let mock = upstream
        .mock_async(|when, then| {
            when.method(GET).path("/data/users");
            then.status(200).json_body(serde_json::json!([
                { "id": 1, "name": "John Doe", "email": "john.doe@example.com" },
                { "id": 2, "name": "Jane Doe", "email": "jane.doe@example.com" },
            ]));
        })
        .await;
    let app = spawn_test_app(&upstream.base_url()).await;

    // Act
    let response = app.get_users().await;

    // Assert
    mock.assert_async().await;
    assert!(response.status().is_success());
    let users: serde_json::Value = response.json().await.expect("failed to parse body");
    let users = users.as_array().expect("expected a JSON array");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "john.doe@example.com");
    assert_eq!(users[1]["name"], "Jane Doe");
}

#[tokio::test(flavor = "multi_thread")]
async fn reading_a_user_passes_the_upstream_body_through() {
    init_test_tracing();
    // Arrange
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/data/users/1");
            then.status(200).json_body(serde_json::json!(
                { "id": 1, "name": "John Doe", "email": "john.doe@example.com" }
            ));
        })
        .await;
    let app = spawn_test_app(&upstream.base_url()).await;

    // Act
    let response = app.get_user(1).await;

    // Assert
    assert!(response.status().is_success());
    let user: serde_json::Value = response.json().await.expect("failed to parse body");
    assert_eq!(user["id"], 1);
    assert_eq!(user["name"], "John Doe");
}

#[tokio::test(flavor = "multi_thread")]
async fn an_upstream_404_maps_to_the_gateway_not_found_payload() {
    init_test_tracing();
    // Arrange
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/data/users/42");
            then.status(404)
                .json_body(serde_json::json!({ "message": "User not found with id: 42" }));
        })
        .await;
    let app = spawn_test_app(&upstream.base_url()).await;

    // Act
    let response = app.get_user(42).await;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.expect("failed to parse body");
    assert_eq!(body["detail"], "User with ID 42 not found");
    assert_eq!(body["status_code"], 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_upstream_500_propagates_unchanged() {
    init_test_tracing();
    // Arrange
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/data/users");
            then.status(500).body("upstream exploded");
        })
        .await;
    let app = spawn_test_app(&upstream.base_url()).await;

    // Act
    let response = app.get_users().await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("failed to parse body");
    assert_eq!(body["detail"], "Data service error: upstream exploded");
    assert_eq!(body["status_code"], 500);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_unreachable_data_service_maps_to_503() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app(&closed_port_url()).await;

    // Act
    let response = app.get_users().await;

    // Assert
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.expect("failed to parse body");
    assert_eq!(body["status_code"], 503);
    let detail = body["detail"].as_str().expect("expected a detail string");
    assert!(detail.starts_with("Data service unavailable"));
}
