// HTTP handlers for reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::reservations::{
    CreateReservationRequest, ReservationError, ReservationResponse, UpdateReservationRequest,
};

/// Query parameters for the reservation list
#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    /// Restrict to reservations for one customer
    pub customer_id: Option<Uuid>,
    /// Restrict to reservations that include one room
    pub room_id: Option<Uuid>,
}

/// Handler for POST /api/reservations
/// Creates a new reservation for the selected customer and rooms
pub async fn create_reservation_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ReservationError> {
    let response = state.reservation_service.create_reservation(request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/reservations
/// Lists reservations, newest first, with optional customer/room filters
pub async fn list_reservations_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<Vec<ReservationResponse>>, ReservationError> {
    let reservations = state
        .reservation_service
        .list_reservations(query.customer_id, query.room_id)
        .await?;

    Ok(Json(reservations))
}

/// Handler for GET /api/reservations/{id}
pub async fn get_reservation_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ReservationError> {
    let response = state.reservation_service.get_reservation(id).await?;

    Ok(Json(response))
}

/// Handler for PUT /api/reservations/{id}
/// Applies a partial update; omitted fields keep their stored values
pub async fn update_reservation_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>, ReservationError> {
    let response = state
        .reservation_service
        .update_reservation(id, request)
        .await?;

    Ok(Json(response))
}

/// Handler for DELETE /api/reservations/{id}
pub async fn delete_reservation_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ReservationError> {
    state.reservation_service.delete_reservation(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
