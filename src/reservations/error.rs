use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for reservation operations
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Reservation not found")]
    NotFound,

    /// One or more requested rooms are already booked for an overlapping
    /// period. Carries the display names so staff can pick alternates.
    #[error("The following rooms are already booked for the selected period: {}", .0.join(", "))]
    RoomsUnavailable(Vec<String>),

    #[error("Invalid customer or room reference")]
    InvalidReference,

    /// Yearly sequence number collision, e.g. two concurrent creates racing
    /// past the allocator. Safe for the caller to retry the create.
    #[error("Reservation number was already taken, please retry")]
    NumberConflict,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return ReservationError::InvalidReference;
            }
            if db_err.is_unique_violation() {
                // The only unique constraint on reservations is the
                // (year, number) index
                if db_err
                    .constraint()
                    .is_some_and(|c| c.contains("year_number"))
                {
                    return ReservationError::NumberConflict;
                }
            }
        }
        ReservationError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for ReservationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ReservationError::DatabaseError(msg) => {
                tracing::error!("Database error in reservations: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ReservationError::NotFound => {
                (StatusCode::NOT_FOUND, "Reservation not found".to_string())
            }
            ReservationError::RoomsUnavailable(ref rooms) => {
                tracing::warn!("Booking conflict for rooms: {}", rooms.join(", "));
                (StatusCode::CONFLICT, self.to_string())
            }
            ReservationError::InvalidReference => (
                StatusCode::BAD_REQUEST,
                "Invalid customer or room reference".to_string(),
            ),
            ReservationError::NumberConflict => (StatusCode::CONFLICT, self.to_string()),
            ReservationError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_unavailable_message_lists_room_names() {
        let err = ReservationError::RoomsUnavailable(vec!["201".to_string(), "305".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("201"));
        assert!(msg.contains("305"));
    }
}
