mod auth;
mod clock;
mod db;
mod error;
mod models;
mod reservations;
mod validation;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;
use validator::Validate;

use auth::{AuthService, RequireRole};
use clock::SystemClock;
use error::ApiError;
use models::{
    CreateCustomerRequest, CreateRoomRequest, Customer, Room, UpdateCustomerRequest,
    UpdateRoomRequest,
};
use reservations::{ReservationService, ReservationsRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_room,
        get_rooms,
        get_room_by_id,
        update_room,
        delete_room,
        create_customer,
        get_customers,
        get_customer_by_id,
        update_customer,
        delete_customer,
    ),
    components(
        schemas(
            Room,
            CreateRoomRequest,
            UpdateRoomRequest,
            Customer,
            CreateCustomerRequest,
            UpdateCustomerRequest
        )
    ),
    tags(
        (name = "rooms", description = "Room management endpoints"),
        (name = "customers", description = "Customer management endpoints")
    ),
    info(
        title = "Hotel Back-Office API",
        version = "1.0.0",
        description = "RESTful API for rooms, customers and reservations"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    db: PgPool,
    reservation_service: ReservationService,
    auth_service: AuthService,
}

/// Query parameters for the room list
#[derive(Debug, Deserialize)]
struct RoomListQuery {
    /// Case-insensitive substring match on the room name
    search: Option<String>,
    /// When true, restrict to rooms free over [check_in, check_out)
    available: Option<bool>,
    /// Start of an availability window; requires check_out as well
    check_in: Option<NaiveDate>,
    /// End of an availability window; requires check_in as well
    check_out: Option<NaiveDate>,
}

/// Query parameters for the customer list
#[derive(Debug, Deserialize)]
struct CustomerListQuery {
    /// Case-insensitive search over name, address and tax ID
    search: Option<String>,
}

/// Handler for POST /api/rooms
/// Creates a new room
#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created successfully", body = Room),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a non-negative number"})),
        (status = 409, description = "Room name already exists", body = String, example = json!({"error": "Room with name '201' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "rooms"
)]
async fn create_room(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    tracing::debug!("Creating new room: {}", payload.name);

    payload.validate()?;
    if payload.price < Decimal::ZERO {
        return Err(ApiError::ValidationError(validation::field_error(
            "price",
            "price_must_be_non_negative",
        )));
    }

    if db::check_duplicate_room_name(&state.db, &payload.name).await? {
        tracing::warn!("Attempt to create duplicate room: {}", payload.name);
        return Err(ApiError::Conflict {
            message: format!("Room with name '{}' already exists", payload.name),
        });
    }

    let room = sqlx::query_as::<_, Room>(
        r#"
        INSERT INTO rooms (id, name, price)
        VALUES ($1, $2, $3)
        RETURNING id, name, price, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(payload.price)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created room with id: {}", room.id);
    Ok((StatusCode::CREATED, Json(room)))
}

/// Handler for GET /api/rooms
/// Lists rooms, optionally restricted to those free for a stay interval
#[utoipa::path(
    get,
    path = "/api/rooms",
    params(
        ("search" = Option<String>, Query, description = "Substring match on room name"),
        ("available" = Option<bool>, Query, description = "Restrict to rooms free over the stay window"),
        ("check_in" = Option<String>, Query, description = "Availability window start (YYYY-MM-DD)"),
        ("check_out" = Option<String>, Query, description = "Availability window end (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "List of rooms", body = Vec<Room>),
        (status = 400, description = "Invalid query parameters", body = String, example = json!({"error": "Validation error"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "rooms"
)]
async fn get_rooms(
    State(state): State<AppState>,
    Query(params): Query<RoomListQuery>,
) -> Result<Json<Vec<Room>>, ApiError> {
    tracing::debug!("Fetching rooms with query parameters: {:?}", params);

    // The availability filter kicks in for `available=true` or whenever a
    // stay window is supplied
    let filter_availability =
        params.available.unwrap_or(false) || params.check_in.is_some() || params.check_out.is_some();

    let rooms = if filter_availability {
        match (params.check_in, params.check_out) {
            (Some(check_in), Some(check_out)) => {
                if check_out <= check_in {
                    return Err(ApiError::ValidationError(validation::field_error(
                        "check_out",
                        "check_out_must_be_after_check_in",
                    )));
                }
                db::find_available_rooms(&state.db, check_in, check_out).await?
            }
            // One date without the other is meaningless for an availability window
            _ => {
                return Err(ApiError::ValidationError(validation::field_error(
                    "check_in",
                    "both_check_in_and_check_out_required",
                )));
            }
        }
    } else {
        sqlx::query_as::<_, Room>(
            "SELECT id, name, price, created_at, updated_at FROM rooms ORDER BY name",
        )
        .fetch_all(&state.db)
        .await?
    };

    let rooms = match params.search {
        Some(ref term) => {
            let term = term.to_lowercase();
            rooms
                .into_iter()
                .filter(|room| room.name.to_lowercase().contains(&term))
                .collect()
        }
        None => rooms,
    };

    tracing::debug!("Query returned {} rooms", rooms.len());
    Ok(Json(rooms))
}

/// Handler for GET /api/rooms/:id
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room found", body = Room),
        (status = 404, description = "Room not found", body = String, example = json!({"error": "Room with id ... not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "rooms"
)]
async fn get_room_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
    let room = sqlx::query_as::<_, Room>(
        "SELECT id, name, price, created_at, updated_at FROM rooms WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Room".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(room))
}

/// Handler for PUT /api/rooms/:id
/// Updates an existing room
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Room ID")
    ),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated successfully", body = Room),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a non-negative number"})),
        (status = 404, description = "Room not found", body = String, example = json!({"error": "Room with id ... not found"})),
        (status = 409, description = "Room name already exists", body = String, example = json!({"error": "Room with name '202' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "rooms"
)]
async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    tracing::debug!("Updating room with id: {}", id);

    payload.validate()?;
    if let Some(price) = payload.price {
        if price < Decimal::ZERO {
            return Err(ApiError::ValidationError(validation::field_error(
                "price",
                "price_must_be_non_negative",
            )));
        }
    }

    // Multi-step update runs in a transaction so the duplicate check and the
    // write see the same state
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Room>(
        "SELECT id, name, price, created_at, updated_at FROM rooms WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Room".to_string(),
        id: id.to_string(),
    })?;

    if let Some(ref new_name) = payload.name {
        if new_name != &existing.name {
            let duplicate_exists: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM rooms WHERE name = $1 AND id != $2)",
            )
            .bind(new_name)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate_exists.unwrap_or(false) {
                tracing::warn!("Attempt to rename room {} to duplicate name: {}", id, new_name);
                return Err(ApiError::Conflict {
                    message: format!("Room with name '{}' already exists", new_name),
                });
            }
        }
    }

    let updated_room = sqlx::query_as::<_, Room>(
        r#"
        UPDATE rooms
        SET name = $1,
            price = $2,
            updated_at = NOW()
        WHERE id = $3
        RETURNING id, name, price, created_at, updated_at
        "#,
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated room with id: {}", id);
    Ok(Json(updated_room))
}

/// Handler for DELETE /api/rooms/:id
/// Deletion is blocked while any reservation still references the room
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 204, description = "Room deleted successfully"),
        (status = 404, description = "Room not found", body = String, example = json!({"error": "Room with id ... not found"})),
        (status = 409, description = "Room is referenced by reservations", body = String, example = json!({"error": "Room is referenced by existing reservations"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "rooms"
)]
async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return ApiError::Conflict {
                        message: "Room is referenced by existing reservations".to_string(),
                    };
                }
            }
            ApiError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Room".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted room with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created successfully", body = Customer),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Tax ID is required"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "customers"
)]
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    tracing::debug!("Creating new customer: {}", payload.name);

    payload.validate()?;

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (id, name, address, tax_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, address, tax_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(&payload.tax_id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created customer with id: {}", customer.id);
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Handler for GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    params(
        ("search" = Option<String>, Query, description = "Search over name, address and tax ID")
    ),
    responses(
        (status = 200, description = "List of customers", body = Vec<Customer>),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "customers"
)]
async fn get_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = match params.search {
        Some(term) => {
            let pattern = format!("%{}%", term);
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, name, address, tax_id, created_at, updated_at
                FROM customers
                WHERE name ILIKE $1 OR address ILIKE $1 OR tax_id ILIKE $1
                ORDER BY name
                "#,
            )
            .bind(pattern)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Customer>(
                "SELECT id, name, address, tax_id, created_at, updated_at FROM customers ORDER BY name",
            )
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(customers))
}

/// Handler for GET /api/customers/:id
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 404, description = "Customer not found", body = String, example = json!({"error": "Customer with id ... not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "customers"
)]
async fn get_customer_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, address, tax_id, created_at, updated_at FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Customer".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(customer))
}

/// Handler for PUT /api/customers/:id
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated successfully", body = Customer),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Tax ID cannot be empty"})),
        (status = 404, description = "Customer not found", body = String, example = json!({"error": "Customer with id ... not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "customers"
)]
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    tracing::debug!("Updating customer with id: {}", id);

    payload.validate()?;

    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Customer>(
        "SELECT id, name, address, tax_id, created_at, updated_at FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Customer".to_string(),
        id: id.to_string(),
    })?;

    let updated_customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers
        SET name = $1,
            address = $2,
            tax_id = $3,
            updated_at = NOW()
        WHERE id = $4
        RETURNING id, name, address, tax_id, created_at, updated_at
        "#,
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.address.unwrap_or(existing.address))
    .bind(payload.tax_id.unwrap_or(existing.tax_id))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated customer with id: {}", id);
    Ok(Json(updated_customer))
}

/// Handler for DELETE /api/customers/:id
/// Deletion is blocked while the customer still has reservations
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 204, description = "Customer deleted successfully"),
        (status = 404, description = "Customer not found", body = String, example = json!({"error": "Customer with id ... not found"})),
        (status = 409, description = "Customer has reservations", body = String, example = json!({"error": "Customer has existing reservations and cannot be deleted"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "customers"
)]
async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return ApiError::Conflict {
                        message: "Customer has existing reservations and cannot be deleted"
                            .to_string(),
                    };
                }
            }
            ApiError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Customer".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted customer with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool, jwt_secret: String) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let reservations_repo = ReservationsRepository::new(db.clone());
    let reservation_service =
        ReservationService::new(reservations_repo, Arc::new(SystemClock));

    let user_repo = auth::repository::UserRepository::new(db.clone());
    let auth_service = AuthService::new(user_repo, auth::token::TokenService::new(jwt_secret));

    let state = AppState {
        db,
        reservation_service,
        auth_service,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Staff account management requires the admin role
    let require_admin = RequireRole::admin();
    let user_routes = Router::new()
        .route("/", post(auth::create_user_handler))
        .route("/", get(auth::list_users_handler))
        .route("/:id", get(auth::get_user_handler))
        .route("/:id", put(auth::update_user_handler))
        .route("/:id", delete(auth::delete_user_handler))
        .layer(axum::middleware::from_fn(move |request, next| {
            let middleware = require_admin.clone();
            async move { middleware.middleware(request, next).await }
        }));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .nest("/api/users", user_routes)
        // Room routes
        .route("/api/rooms", post(create_room))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/:id", get(get_room_by_id))
        .route("/api/rooms/:id", put(update_room))
        .route("/api/rooms/:id", delete(delete_room))
        // Customer routes
        .route("/api/customers", post(create_customer))
        .route("/api/customers", get(get_customers))
        .route("/api/customers/:id", get(get_customer_by_id))
        .route("/api/customers/:id", put(update_customer))
        .route("/api/customers/:id", delete(delete_customer))
        // Reservation routes
        .route(
            "/api/reservations",
            post(reservations::create_reservation_handler),
        )
        .route(
            "/api/reservations",
            get(reservations::list_reservations_handler),
        )
        .route(
            "/api/reservations/:id",
            get(reservations::get_reservation_handler),
        )
        .route(
            "/api/reservations/:id",
            put(reservations::update_reservation_handler),
        )
        .route(
            "/api/reservations/:id",
            delete(reservations::delete_reservation_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Hotel Back-Office API - Starting...");

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let app = create_router(db_pool, jwt_secret);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Hotel Back-Office API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
