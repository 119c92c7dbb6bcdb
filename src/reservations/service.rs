use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::reservations::error::ReservationError;
use crate::reservations::models::{
    CreateReservationRequest, NewReservation, Reservation, ReservationResponse,
    UpdateReservationRequest,
};
use crate::reservations::pricing::PriceCalculator;
use crate::reservations::repository::ReservationsRepository;

/// Service for reservation business logic
///
/// Validation, pricing and patch merging happen here; the repository owns the
/// transactional conflict check and number allocation.
#[derive(Clone)]
pub struct ReservationService {
    repository: ReservationsRepository,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    /// Create a new ReservationService
    pub fn new(repository: ReservationsRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Create a new reservation
    pub async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> Result<ReservationResponse, ReservationError> {
        request
            .validate()
            .map_err(|e| ReservationError::ValidationError(e.to_string()))?;
        Self::validate_dates(request.check_in_date, request.check_out_date)?;

        let room_ids = dedupe_rooms(&request.room_ids);
        let total_amount = self
            .price_stay(
                &room_ids,
                request.check_in_date,
                request.check_out_date,
                request.extra_bed,
                request.total_amount,
            )
            .await?;

        let reservation = self
            .repository
            .create(&NewReservation {
                customer_id: request.customer_id,
                room_ids,
                check_in_date: request.check_in_date,
                check_out_date: request.check_out_date,
                total_amount,
                extra_bed: request.extra_bed,
                notes: request.notes,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(
            "Created reservation {}/{} for customer {}",
            reservation.number,
            reservation.created_at.format("%Y"),
            reservation.customer_id
        );

        self.build_response(reservation).await
    }

    /// Update an existing reservation
    ///
    /// The patch is merged over the stored record first; the conflict check
    /// and pricing always run on the merged values, so changing only the
    /// dates still re-checks the stored room set.
    pub async fn update_reservation(
        &self,
        id: Uuid,
        patch: UpdateReservationRequest,
    ) -> Result<ReservationResponse, ReservationError> {
        patch
            .validate()
            .map_err(|e| ReservationError::ValidationError(e.to_string()))?;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ReservationError::NotFound)?;
        let existing_room_ids = self.repository.room_ids_for(id).await?;

        let replace_rooms = patch.room_ids.is_some();
        let client_total = patch.total_amount;

        let mut effective = patch.merge_over(&existing, &existing_room_ids);
        Self::validate_dates(effective.check_in_date, effective.check_out_date)?;
        effective.room_ids = dedupe_rooms(&effective.room_ids);

        let total_amount = self
            .price_stay(
                &effective.room_ids,
                effective.check_in_date,
                effective.check_out_date,
                effective.extra_bed,
                client_total,
            )
            .await?;

        let reservation = self
            .repository
            .update(id, &effective, total_amount, replace_rooms, self.clock.now())
            .await?;

        self.build_response(reservation).await
    }

    /// Get a reservation by ID with customer and room detail
    pub async fn get_reservation(&self, id: Uuid) -> Result<ReservationResponse, ReservationError> {
        let reservation = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ReservationError::NotFound)?;

        self.build_response(reservation).await
    }

    /// List reservations, optionally filtered by customer or room
    pub async fn list_reservations(
        &self,
        customer_id: Option<Uuid>,
        room_id: Option<Uuid>,
    ) -> Result<Vec<ReservationResponse>, ReservationError> {
        let reservations = match (customer_id, room_id) {
            (Some(customer_id), _) => self.repository.find_by_customer(customer_id).await?,
            (None, Some(room_id)) => self.repository.find_by_room(room_id).await?,
            (None, None) => self.repository.find_all().await?,
        };

        let mut responses = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            responses.push(self.build_response(reservation).await?);
        }

        // Apply the room filter on top of a customer filter when both are set
        if let (Some(_), Some(room_id)) = (customer_id, room_id) {
            responses.retain(|r| r.rooms.iter().any(|room| room.id == room_id));
        }

        Ok(responses)
    }

    /// Delete a reservation
    pub async fn delete_reservation(&self, id: Uuid) -> Result<(), ReservationError> {
        self.repository.delete(id).await?;
        tracing::info!("Deleted reservation {}", id);
        Ok(())
    }

    /// Resolve nightly rates and compute the authoritative total
    ///
    /// A client-supplied total is accepted only when it matches the computed
    /// amount exactly; the server never stores a client figure.
    async fn price_stay(
        &self,
        room_ids: &[Uuid],
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
        extra_bed: bool,
        client_total: Option<Decimal>,
    ) -> Result<Decimal, ReservationError> {
        let rooms = self.repository.find_rooms_by_ids(room_ids).await?;
        if rooms.len() != room_ids.len() {
            return Err(ReservationError::InvalidReference);
        }

        let prices: Vec<Decimal> = rooms.iter().map(|room| room.price).collect();
        let total = PriceCalculator::compute_total(&prices, check_in, check_out, extra_bed);

        if let Some(client_total) = client_total {
            if client_total != total {
                return Err(ReservationError::ValidationError(format!(
                    "Total amount mismatch: expected {}, got {}",
                    total, client_total
                )));
            }
        }

        Ok(total)
    }

    fn validate_dates(
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
    ) -> Result<(), ReservationError> {
        if check_out <= check_in {
            return Err(ReservationError::ValidationError(
                "Check-out date must be after check-in date".to_string(),
            ));
        }
        Ok(())
    }

    async fn build_response(
        &self,
        reservation: Reservation,
    ) -> Result<ReservationResponse, ReservationError> {
        let customer = self
            .repository
            .customer_summary(reservation.customer_id)
            .await?
            .ok_or_else(|| {
                ReservationError::DatabaseError(format!(
                    "Reservation {} references a missing customer",
                    reservation.id
                ))
            })?;
        let rooms = self.repository.room_summaries_for(reservation.id).await?;

        Ok(ReservationResponse {
            id: reservation.id,
            number: reservation.number,
            customer_id: reservation.customer_id,
            check_in_date: reservation.check_in_date,
            check_out_date: reservation.check_out_date,
            total_amount: reservation.total_amount,
            extra_bed: reservation.extra_bed,
            notes: reservation.notes,
            customer,
            rooms,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        })
    }
}

/// Drop duplicate room ids while keeping first-seen order
fn dedupe_rooms(room_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(room_ids.len());
    for id in room_ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_dedupe_rooms_keeps_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedupe_rooms(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_dedupe_rooms_empty() {
        assert!(dedupe_rooms(&[]).is_empty());
    }

    #[test]
    fn test_date_validation_rejects_non_positive_stays() {
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();

        assert!(ReservationService::validate_dates(d1, d2).is_ok());
        assert!(ReservationService::validate_dates(d1, d1).is_err());
        assert!(ReservationService::validate_dates(d2, d1).is_err());
    }
}
