use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::Room;
use crate::reservations::availability::conflicting_room_names;
use crate::reservations::error::ReservationError;
use crate::reservations::models::{
    BookedStay, CustomerSummary, EffectiveStay, NewReservation, Reservation, RoomSummary,
};
use crate::reservations::numbering::next_number;

/// Repository for reservation and junction-row operations
///
/// The create and update paths run conflict-check, number allocation and all
/// row writes inside a single transaction; per-room advisory locks serialize
/// concurrent check-and-insert attempts for the same rooms.
#[derive(Clone)]
pub struct ReservationsRepository {
    pool: PgPool,
}

impl ReservationsRepository {
    /// Create a new ReservationsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a reservation by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, ReservationError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, number, customer_id, check_in_date, check_out_date,
                   total_amount, extra_bed, notes, created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Find all reservations, newest first
    pub async fn find_all(&self) -> Result<Vec<Reservation>, ReservationError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, number, customer_id, check_in_date, check_out_date,
                   total_amount, extra_bed, notes, created_at, updated_at
            FROM reservations
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Find all reservations for a customer, newest first
    pub async fn find_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, number, customer_id, check_in_date, check_out_date,
                   total_amount, extra_bed, notes, created_at, updated_at
            FROM reservations
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Find all reservations that include a specific room, newest first
    pub async fn find_by_room(&self, room_id: Uuid) -> Result<Vec<Reservation>, ReservationError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT r.id, r.number, r.customer_id, r.check_in_date, r.check_out_date,
                   r.total_amount, r.extra_bed, r.notes, r.created_at, r.updated_at
            FROM reservations r
            JOIN reservation_rooms rr ON rr.reservation_id = r.id
            WHERE rr.room_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Room ids currently assigned to a reservation
    pub async fn room_ids_for(&self, reservation_id: Uuid) -> Result<Vec<Uuid>, ReservationError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT room_id FROM reservation_rooms WHERE reservation_id = $1 ORDER BY created_at",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Room detail for a reservation, for joined responses
    pub async fn room_summaries_for(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<RoomSummary>, ReservationError> {
        let rooms = sqlx::query_as::<_, RoomSummary>(
            r#"
            SELECT rm.id, rm.name, rm.price
            FROM reservation_rooms rr
            JOIN rooms rm ON rm.id = rr.room_id
            WHERE rr.reservation_id = $1
            ORDER BY rr.created_at
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Customer detail for joined responses
    pub async fn customer_summary(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<CustomerSummary>, ReservationError> {
        let customer = sqlx::query_as::<_, CustomerSummary>(
            "SELECT id, name, address, tax_id FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Find multiple rooms by IDs
    ///
    /// Used by the service to resolve nightly rates; a shorter result than
    /// the requested id set means an unknown room was referenced.
    pub async fn find_rooms_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Room>, ReservationError> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT id, name, price, created_at, updated_at FROM rooms WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Create a reservation with its junction rows in one transaction
    ///
    /// Inside the transaction: lock the requested rooms, re-check for booking
    /// conflicts, allocate the yearly sequence number, then insert the
    /// reservation row and one junction row per room. All rows commit
    /// together or not at all.
    pub async fn create(&self, data: &NewReservation) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await?;

        Self::lock_rooms(&mut tx, &data.room_ids).await?;

        let stays = Self::booked_stays(&mut tx, &data.room_ids).await?;
        let conflicts = conflicting_room_names(
            &stays,
            &data.room_ids,
            data.check_in_date,
            data.check_out_date,
            None,
        );
        if !conflicts.is_empty() {
            // Transaction rolls back on drop
            return Err(ReservationError::RoomsUnavailable(conflicts));
        }

        // Year extraction pins the time zone so it agrees with the UTC year
        // of `created_at` regardless of the session TZ setting
        let year = data.created_at.year();
        let current_max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(number) FROM reservations \
             WHERE EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int = $1",
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;
        let number = next_number(current_max);

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations
                (id, number, customer_id, check_in_date, check_out_date,
                 total_amount, extra_bed, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id, number, customer_id, check_in_date, check_out_date,
                      total_amount, extra_bed, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(data.customer_id)
        .bind(data.check_in_date)
        .bind(data.check_out_date)
        .bind(data.total_amount)
        .bind(data.extra_bed)
        .bind(&data.notes)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_junction_rows(&mut tx, reservation.id, &data.room_ids, data.created_at)
            .await?;

        tx.commit().await?;

        Ok(reservation)
    }

    /// Apply an update with its effective values in one transaction
    ///
    /// The conflict check always runs against the effective (merged) room set
    /// and interval, excluding the reservation itself. When `replace_rooms`
    /// is set, every junction row is deleted and re-inserted so a concurrent
    /// reader never observes a partial room set.
    pub async fn update(
        &self,
        id: Uuid,
        effective: &EffectiveStay,
        total_amount: Decimal,
        replace_rooms: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await?;

        Self::lock_rooms(&mut tx, &effective.room_ids).await?;

        let stays = Self::booked_stays(&mut tx, &effective.room_ids).await?;
        let conflicts = conflicting_room_names(
            &stays,
            &effective.room_ids,
            effective.check_in_date,
            effective.check_out_date,
            Some(id),
        );
        if !conflicts.is_empty() {
            return Err(ReservationError::RoomsUnavailable(conflicts));
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET customer_id = $1,
                check_in_date = $2,
                check_out_date = $3,
                total_amount = $4,
                extra_bed = $5,
                notes = $6,
                updated_at = $7
            WHERE id = $8
            RETURNING id, number, customer_id, check_in_date, check_out_date,
                      total_amount, extra_bed, notes, created_at, updated_at
            "#,
        )
        .bind(effective.customer_id)
        .bind(effective.check_in_date)
        .bind(effective.check_out_date)
        .bind(total_amount)
        .bind(effective.extra_bed)
        .bind(&effective.notes)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ReservationError::NotFound)?;

        if replace_rooms {
            sqlx::query("DELETE FROM reservation_rooms WHERE reservation_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            Self::insert_junction_rows(&mut tx, id, &effective.room_ids, updated_at).await?;
        }

        tx.commit().await?;

        Ok(reservation)
    }

    /// Delete a reservation; junction rows are removed by cascade
    pub async fn delete(&self, id: Uuid) -> Result<(), ReservationError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ReservationError::NotFound);
        }

        Ok(())
    }

    /// Take a transaction-scoped advisory lock per room, in sorted order to
    /// avoid deadlocks between concurrent writers
    async fn lock_rooms(
        tx: &mut Transaction<'_, Postgres>,
        room_ids: &[Uuid],
    ) -> Result<(), ReservationError> {
        let mut sorted = room_ids.to_vec();
        sorted.sort();
        sorted.dedup();

        for room_id in &sorted {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(room_id.to_string())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Every stay that references any of the candidate rooms, with the room
    /// display name joined in for conflict reporting
    async fn booked_stays(
        tx: &mut Transaction<'_, Postgres>,
        room_ids: &[Uuid],
    ) -> Result<Vec<BookedStay>, ReservationError> {
        let stays = sqlx::query_as::<_, BookedStay>(
            r#"
            SELECT r.id AS reservation_id, rr.room_id, rm.name AS room_name,
                   r.check_in_date, r.check_out_date
            FROM reservations r
            JOIN reservation_rooms rr ON rr.reservation_id = r.id
            JOIN rooms rm ON rm.id = rr.room_id
            WHERE rr.room_id = ANY($1)
            ORDER BY r.created_at
            "#,
        )
        .bind(room_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(stays)
    }

    /// Insert one junction row per selected room
    async fn insert_junction_rows(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        room_ids: &[Uuid],
        created_at: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        for room_id in room_ids {
            sqlx::query(
                r#"
                INSERT INTO reservation_rooms (id, reservation_id, room_id, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(reservation_id)
            .bind(room_id)
            .bind(created_at)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
