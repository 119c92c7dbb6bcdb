use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_tax_id;

/// Represents a hotel room in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: Uuid,
    /// Unique display label, e.g. "201" or "Garden Suite"
    #[schema(example = "201")]
    pub name: String,
    /// Nightly rate
    #[schema(value_type = f64, example = 1200.0)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the data needed to create a new room
///
/// Used for POST /api/rooms requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    #[schema(example = "201")]
    #[validate(length(min = 1, message = "Room name is required"))]
    pub name: String,
    /// Nightly rate, must be non-negative
    #[schema(value_type = f64, example = 1200.0)]
    pub price: Decimal,
}

/// Represents the data for updating an existing room
///
/// All fields are optional to support partial updates
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomRequest {
    #[schema(example = "202")]
    #[validate(length(min = 1, message = "Room name cannot be empty"))]
    pub name: Option<String>,
    #[schema(value_type = f64, example = 1500.0)]
    pub price: Option<Decimal>,
}

/// Represents a customer in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Somchai Trading Co., Ltd.")]
    pub name: String,
    #[schema(example = "99 Sukhumvit Rd, Bangkok")]
    pub address: String,
    /// Tax identifier printed on invoices
    #[schema(example = "0105544045639")]
    pub tax_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the data needed to create a new customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Tax ID is required"), custom = "validate_tax_id")]
    pub tax_id: String,
}

/// Represents the data for updating an existing customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Tax ID cannot be empty"), custom = "validate_tax_id")]
    pub tax_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_room_serialization() {
        let room = Room {
            id: Uuid::new_v4(),
            name: "201".to_string(),
            price: dec!(1200.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&room).expect("Failed to serialize Room");
        assert!(json.contains("\"name\":\"201\""));
        assert!(json.contains("\"price\":\"1200.00\""));
    }

    #[test]
    fn test_create_room_request_validation() {
        let valid = CreateRoomRequest {
            name: "201".to_string(),
            price: dec!(1200),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateRoomRequest {
            name: "".to_string(),
            price: dec!(1200),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_customer_request_partial() {
        let json = r#"{ "address": "1 New Road" }"#;
        let patch: UpdateCustomerRequest =
            serde_json::from_str(json).expect("Failed to deserialize UpdateCustomerRequest");

        assert_eq!(patch.address, Some("1 New Road".to_string()));
        assert_eq!(patch.name, None);
        assert_eq!(patch.tax_id, None);
    }
}
