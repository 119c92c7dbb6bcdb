use crate::error::ApiError;
use crate::models::Room;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// * `Result<DbPool>` - Configured connection pool or error
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a room with the given name already exists
pub async fn check_duplicate_room_name(pool: &PgPool, name: &str) -> Result<bool, ApiError> {
    tracing::debug!("Checking for duplicate room name: {}", name);

    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}

/// Check if a room with the given name already exists, excluding a specific ID
/// This is used for update operations to allow keeping the same name
pub async fn check_duplicate_room_name_excluding_id(
    pool: &PgPool,
    name: &str,
    exclude_id: Uuid,
) -> Result<bool, ApiError> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE name = $1 AND id != $2)")
            .bind(name)
            .bind(exclude_id)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}

/// Find rooms with no reservation overlapping the requested stay interval
///
/// Uses the half-open interval rule: an existing reservation [in, out) blocks
/// the candidate range [check_in, check_out) iff `in < check_out AND
/// out > check_in`. A room checked out on `check_in` day is therefore free
/// (same-day turnover).
pub async fn find_available_rooms(
    pool: &PgPool,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<Room>, ApiError> {
    tracing::debug!(
        "Finding rooms available between {} and {}",
        check_in,
        check_out
    );

    let rooms = sqlx::query_as::<_, Room>(
        r#"
        SELECT id, name, price, created_at, updated_at
        FROM rooms rm
        WHERE NOT EXISTS (
            SELECT 1
            FROM reservation_rooms rr
            JOIN reservations r ON r.id = rr.reservation_id
            WHERE rr.room_id = rm.id
              AND r.check_in_date < $2
              AND r.check_out_date > $1
        )
        ORDER BY name
        "#,
    )
    .bind(check_in)
    .bind(check_out)
    .fetch_all(pool)
    .await?;

    Ok(rooms)
}
