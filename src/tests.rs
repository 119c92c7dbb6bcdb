// Handler tests for the back-office API
//
// These tests exercise the HTTP surface through a TestServer built over the
// real router. The pool is created lazily, so tests that are rejected by
// validation or auth before any query runs need no live database.

use super::*;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;

use crate::auth::models::Role;
use crate::auth::token::TokenService;

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";

fn create_test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://hotel_user:hotel_pass@db:5432/hotel_db".to_string());

    PgPoolOptions::new()
        .max_connections(2)
        .connect_lazy(&database_url)
        .expect("Failed to create test pool")
}

fn create_test_app() -> TestServer {
    std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);

    let app = create_router(create_test_pool(), TEST_JWT_SECRET.to_string());
    TestServer::new(app).unwrap()
}

fn staff_bearer() -> HeaderValue {
    let token = TokenService::new(TEST_JWT_SECRET.to_string())
        .generate_access_token(1, "reception", Role::Staff)
        .unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn admin_bearer() -> HeaderValue {
    let token = TokenService::new(TEST_JWT_SECRET.to_string())
        .generate_access_token(2, "boss", Role::Admin)
        .unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

// ============================================================================
// Reservation endpoint tests
// ============================================================================

#[tokio::test]
async fn test_create_reservation_requires_authentication() {
    let server = create_test_app();

    let payload = json!({
        "customer_id": "6f9b5c52-7a3e-4f7e-9df1-0a8f2b1c3d4e",
        "room_ids": ["0e8a1f7c-2b3d-4c5e-8f9a-1b2c3d4e5f60"],
        "check_in_date": "2024-06-01",
        "check_out_date": "2024-06-04"
    });

    let response = server.post("/api/reservations").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_reservations_requires_authentication() {
    let server = create_test_app();

    let response = server.get("/api/reservations").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_reservation_rejects_empty_room_list() {
    let server = create_test_app();

    let payload = json!({
        "customer_id": "6f9b5c52-7a3e-4f7e-9df1-0a8f2b1c3d4e",
        "room_ids": [],
        "check_in_date": "2024-06-01",
        "check_out_date": "2024-06-04"
    });

    let response = server
        .post("/api/reservations")
        .add_header(AUTHORIZATION, staff_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_reservation_rejects_inverted_dates() {
    let server = create_test_app();

    let payload = json!({
        "customer_id": "6f9b5c52-7a3e-4f7e-9df1-0a8f2b1c3d4e",
        "room_ids": ["0e8a1f7c-2b3d-4c5e-8f9a-1b2c3d4e5f60"],
        "check_in_date": "2024-06-04",
        "check_out_date": "2024-06-01"
    });

    let response = server
        .post("/api/reservations")
        .add_header(AUTHORIZATION, staff_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.text();
    assert!(body.contains("Check-out date must be after check-in date"));
}

#[tokio::test]
async fn test_create_reservation_rejects_same_day_checkout() {
    let server = create_test_app();

    let payload = json!({
        "customer_id": "6f9b5c52-7a3e-4f7e-9df1-0a8f2b1c3d4e",
        "room_ids": ["0e8a1f7c-2b3d-4c5e-8f9a-1b2c3d4e5f60"],
        "check_in_date": "2024-06-01",
        "check_out_date": "2024-06-01"
    });

    let response = server
        .post("/api/reservations")
        .add_header(AUTHORIZATION, staff_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_reservation_rejects_empty_room_patch() {
    let server = create_test_app();

    // Patching rooms to an empty set is invalid; omitting them keeps the
    // stored set instead
    let payload = json!({ "room_ids": [] });

    let response = server
        .put("/api/reservations/6f9b5c52-7a3e-4f7e-9df1-0a8f2b1c3d4e")
        .add_header(AUTHORIZATION, staff_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Room endpoint tests
// ============================================================================

#[tokio::test]
async fn test_create_room_rejects_empty_name() {
    let server = create_test_app();

    let payload = json!({ "name": "", "price": 1200 });

    let response = server.post("/api/rooms").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_room_rejects_negative_price() {
    let server = create_test_app();

    let payload = json!({ "name": "201", "price": -1 });

    let response = server.post("/api/rooms").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_room_availability_requires_both_dates() {
    let server = create_test_app();

    let response = server
        .get("/api/rooms")
        .add_query_param("check_in", "2024-06-01")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_room_availability_rejects_inverted_window() {
    let server = create_test_app();

    let response = server
        .get("/api/rooms")
        .add_query_param("check_in", "2024-06-04")
        .add_query_param("check_out", "2024-06-01")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Customer endpoint tests
// ============================================================================

#[tokio::test]
async fn test_create_customer_rejects_missing_tax_id() {
    let server = create_test_app();

    let payload = json!({
        "name": "Somchai Trading Co., Ltd.",
        "address": "99 Sukhumvit Rd, Bangkok",
        "tax_id": ""
    });

    let response = server.post("/api/customers").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_customer_rejects_malformed_tax_id() {
    let server = create_test_app();

    let payload = json!({
        "name": "Somchai Trading Co., Ltd.",
        "address": "99 Sukhumvit Rd, Bangkok",
        "tax_id": "not a tax id"
    });

    let response = server.post("/api/customers").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Auth and user management tests
// ============================================================================

#[tokio::test]
async fn test_login_rejects_empty_username() {
    let server = create_test_app();

    let payload = json!({ "username": "", "password": "whatever" });

    let response = server.post("/api/auth/login").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let server = create_test_app();

    let response = server.get("/api/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_management_requires_authentication() {
    let server = create_test_app();

    let response = server.get("/api/users").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_management_denies_staff_role() {
    let server = create_test_app();

    let response = server
        .get("/api/users")
        .add_header(AUTHORIZATION, staff_bearer())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_rejects_short_password() {
    let server = create_test_app();

    let payload = json!({
        "username": "newstaff",
        "password": "short",
        "name": "New Staff"
    });

    let response = server
        .post("/api/users")
        .add_header(AUTHORIZATION, admin_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_rejects_invalid_username() {
    let server = create_test_app();

    let payload = json!({
        "username": "front desk!",
        "password": "long enough password",
        "name": "Front Desk"
    });

    let response = server
        .post("/api/users")
        .add_header(AUTHORIZATION, admin_bearer())
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
