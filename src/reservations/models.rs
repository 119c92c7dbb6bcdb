use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Domain model representing a reservation in the database
///
/// The stay interval is half-open: the room is occupied over
/// [check_in_date, check_out_date), so the check-out day itself is free for
/// same-day turnover.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    /// Yearly sequence number, restarts at 1 each calendar year
    pub number: i32,
    pub customer_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_amount: Decimal,
    pub extra_bed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One existing room booking, as fetched for conflict checking
///
/// The repository returns every stay that references any candidate room; the
/// overlap rule itself is applied in `availability`.
#[derive(Debug, Clone, FromRow)]
pub struct BookedStay {
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub room_name: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

/// Request DTO for creating a new reservation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "At least one room must be selected"))]
    pub room_ids: Vec<Uuid>,
    #[schema(value_type = String, example = "2024-06-01")]
    pub check_in_date: NaiveDate,
    #[schema(value_type = String, example = "2024-06-04")]
    pub check_out_date: NaiveDate,
    /// Optional client-side total; validated against the server-computed
    /// amount and rejected on mismatch
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub extra_bed: bool,
    pub notes: Option<String>,
}

/// Request DTO for updating a reservation
///
/// All fields are optional; omitted fields keep their stored values. Notes
/// distinguish "omitted" from "explicit null": null clears the stored note.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReservationRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one room must be selected"))]
    pub room_ids: Option<Vec<Uuid>>,
    #[schema(value_type = Option<String>)]
    pub check_in_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub check_out_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Decimal>,
    pub extra_bed: Option<bool>,
    #[serde(default, deserialize_with = "nullable_patch_field")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

/// Deserialize a patch field that must tell "omitted" apart from "null":
/// a missing key stays `None` via the serde default, while a present key
/// (null included) becomes `Some(...)`
fn nullable_patch_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// The effective post-update state of a reservation: the patch merged over
/// the stored record
///
/// Conflict checking and pricing always run against these values, so a
/// date-only patch is still checked against the stored room set.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveStay {
    pub customer_id: Uuid,
    pub room_ids: Vec<Uuid>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub extra_bed: bool,
    pub notes: Option<String>,
}

impl UpdateReservationRequest {
    /// Merge this patch over the stored reservation and its current room set
    pub fn merge_over(&self, existing: &Reservation, existing_room_ids: &[Uuid]) -> EffectiveStay {
        EffectiveStay {
            customer_id: self.customer_id.unwrap_or(existing.customer_id),
            room_ids: self
                .room_ids
                .clone()
                .unwrap_or_else(|| existing_room_ids.to_vec()),
            check_in_date: self.check_in_date.unwrap_or(existing.check_in_date),
            check_out_date: self.check_out_date.unwrap_or(existing.check_out_date),
            extra_bed: self.extra_bed.unwrap_or(existing.extra_bed),
            notes: self
                .notes
                .clone()
                .unwrap_or_else(|| existing.notes.clone()),
        }
    }
}

/// Validated write payload handed to the repository for the create path
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub customer_id: Uuid,
    pub room_ids: Vec<Uuid>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_amount: Decimal,
    pub extra_bed: bool,
    pub notes: Option<String>,
    /// Creation instant from the injected clock; also determines the
    /// numbering year
    pub created_at: DateTime<Utc>,
}

/// Customer detail joined into reservation responses
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tax_id: String,
}

/// Room detail joined into reservation responses
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoomSummary {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
}

/// Response DTO for a reservation with customer and room detail joined
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub number: i32,
    pub customer_id: Uuid,
    #[schema(value_type = String)]
    pub check_in_date: NaiveDate,
    #[schema(value_type = String)]
    pub check_out_date: NaiveDate,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub extra_bed: bool,
    pub notes: Option<String>,
    pub customer: CustomerSummary,
    pub rooms: Vec<RoomSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stored_reservation() -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            number: 7,
            customer_id: Uuid::new_v4(),
            check_in_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            total_amount: dec!(4800),
            extra_bed: false,
            notes: Some("late arrival".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_empty_patch_keeps_stored_values() {
        let existing = stored_reservation();
        let rooms = vec![Uuid::new_v4(), Uuid::new_v4()];
        let patch = UpdateReservationRequest::default();

        let effective = patch.merge_over(&existing, &rooms);

        assert_eq!(effective.customer_id, existing.customer_id);
        assert_eq!(effective.room_ids, rooms);
        assert_eq!(effective.check_in_date, existing.check_in_date);
        assert_eq!(effective.check_out_date, existing.check_out_date);
        assert_eq!(effective.extra_bed, existing.extra_bed);
        assert_eq!(effective.notes, existing.notes);
    }

    #[test]
    fn test_merge_date_only_patch_keeps_stored_room_set() {
        // A date-only change must still produce the stored room set so the
        // conflict check runs against the real rooms
        let existing = stored_reservation();
        let rooms = vec![Uuid::new_v4()];
        let patch = UpdateReservationRequest {
            check_in_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            check_out_date: NaiveDate::from_ymd_opt(2024, 7, 3),
            ..Default::default()
        };

        let effective = patch.merge_over(&existing, &rooms);

        assert_eq!(effective.room_ids, rooms);
        assert_eq!(
            effective.check_in_date,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
        assert_eq!(
            effective.check_out_date,
            NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()
        );
    }

    #[test]
    fn test_merge_room_only_patch_keeps_stored_dates() {
        let existing = stored_reservation();
        let old_rooms = vec![Uuid::new_v4()];
        let new_rooms = vec![Uuid::new_v4(), Uuid::new_v4()];
        let patch = UpdateReservationRequest {
            room_ids: Some(new_rooms.clone()),
            ..Default::default()
        };

        let effective = patch.merge_over(&existing, &old_rooms);

        assert_eq!(effective.room_ids, new_rooms);
        assert_eq!(effective.check_in_date, existing.check_in_date);
        assert_eq!(effective.check_out_date, existing.check_out_date);
    }

    #[test]
    fn test_merge_null_notes_clears_stored_note() {
        let existing = stored_reservation();
        let rooms = vec![Uuid::new_v4()];

        let patch: UpdateReservationRequest =
            serde_json::from_str(r#"{ "notes": null }"#).unwrap();
        assert_eq!(patch.notes, Some(None));

        let effective = patch.merge_over(&existing, &rooms);
        assert_eq!(effective.notes, None);
    }

    #[test]
    fn test_merge_omitted_notes_keeps_stored_note() {
        let existing = stored_reservation();
        let rooms = vec![Uuid::new_v4()];

        let patch: UpdateReservationRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(patch.notes, None);

        let effective = patch.merge_over(&existing, &rooms);
        assert_eq!(effective.notes, Some("late arrival".to_string()));
    }

    #[test]
    fn test_merge_replaces_notes_with_new_value() {
        let existing = stored_reservation();
        let rooms = vec![Uuid::new_v4()];

        let patch: UpdateReservationRequest =
            serde_json::from_str(r#"{ "notes": "early check-in" }"#).unwrap();

        let effective = patch.merge_over(&existing, &rooms);
        assert_eq!(effective.notes, Some("early check-in".to_string()));
    }

    #[test]
    fn test_create_request_requires_rooms() {
        use validator::Validate;

        let request = CreateReservationRequest {
            customer_id: Uuid::new_v4(),
            room_ids: vec![],
            check_in_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            total_amount: None,
            extra_bed: false,
            notes: None,
        };

        assert!(request.validate().is_err());
    }
}
