//! Booking ledger queries.
//!
//! Concurrent admissions for the same slot are serialized by the
//! `bookings_active_slot_key` partial unique index; the loser of the race
//! sees [`StoreError::SlotTaken`].

use crate::{PostgresStore, db_error, to_i32, to_i64, to_u32, to_u64};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use experiences_core::{
    BookedSlot, Booking, BookingId, BookingReference, BookingStatus, BookingStore, ExperienceId,
    PriceBreakdown, SlotKey, StoreError, TimeLabel,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

const ACTIVE_SLOT_CONSTRAINT: &str = "bookings_active_slot_key";
const REFERENCE_CONSTRAINT: &str = "bookings_reference_key";

const BOOKING_COLUMNS: &str = "id, reference, experience_id, full_name, email, booking_date, \
     booking_time, quantity, subtotal, taxes, total, promo_code, status, created_at, updated_at";

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Database(format!("unreadable {column} in bookings: '{value}'"))
}

fn booking_from_row(row: &PgRow) -> Result<Booking, StoreError> {
    let reference: String = row.try_get("reference").map_err(db_error)?;
    let time: String = row.try_get("booking_time").map_err(db_error)?;
    let status: String = row.try_get("status").map_err(db_error)?;

    let subtotal = to_u64(row.try_get("subtotal").map_err(db_error)?, "subtotal")?;
    let taxes = to_u64(row.try_get("taxes").map_err(db_error)?, "taxes")?;

    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id").map_err(db_error)?),
        reference: BookingReference::parse(&reference)
            .ok_or_else(|| corrupt("reference", &reference))?,
        experience_id: ExperienceId::from_uuid(row.try_get("experience_id").map_err(db_error)?),
        full_name: row.try_get("full_name").map_err(db_error)?,
        email: row.try_get("email").map_err(db_error)?,
        date: row.try_get("booking_date").map_err(db_error)?,
        time: TimeLabel::parse(&time).map_err(|_| corrupt("booking_time", &time))?,
        quantity: to_u32(row.try_get("quantity").map_err(db_error)?, "quantity")?,
        price: PriceBreakdown::new(subtotal, taxes),
        promo_code: row.try_get("promo_code").map_err(db_error)?,
        status: status.parse().map_err(|_| corrupt("status", &status))?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

/// Map a failed insert to the constraint it violated.
fn insert_error(e: sqlx::Error) -> StoreError {
    let violated = match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    };

    match violated.as_deref() {
        Some(ACTIVE_SLOT_CONSTRAINT) => StoreError::SlotTaken,
        Some(REFERENCE_CONSTRAINT) => StoreError::DuplicateReference,
        _ => db_error(e),
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn active_slots(
        &self,
        experience_id: ExperienceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<BookedSlot>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT to_char(booking_date, 'YYYY-MM-DD') AS booking_date, booking_time
            FROM bookings
            WHERE experience_id = $1
              AND status <> 'cancelled'
              AND booking_date BETWEEN $2 AND $3
            ",
        )
        .bind(experience_id.as_uuid())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut slots = Vec::with_capacity(rows.len());
        for row in &rows {
            let date: String = row.try_get("booking_date").map_err(db_error)?;
            let time: String = row.try_get("booking_time").map_err(db_error)?;
            match BookedSlot::parse(&date, &time) {
                Some(slot) => slots.push(slot),
                None => tracing::warn!(%date, %time, "Skipping unreadable booking slot"),
            }
        }
        Ok(slots)
    }

    async fn is_slot_taken(&self, slot: &SlotKey) -> Result<bool, StoreError> {
        let (taken,): (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE experience_id = $1
                  AND booking_date = $2
                  AND booking_time = $3
                  AND status <> 'cancelled'
            )
            ",
        )
        .bind(slot.experience_id.as_uuid())
        .bind(slot.date)
        .bind(slot.time.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(taken)
    }

    #[tracing::instrument(skip_all, fields(reference = %booking.reference))]
    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO bookings (
                id, reference, experience_id, full_name, email, booking_date, booking_time,
                quantity, subtotal, taxes, total, promo_code, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.reference.as_str())
        .bind(booking.experience_id.as_uuid())
        .bind(&booking.full_name)
        .bind(&booking.email)
        .bind(booking.date)
        .bind(booking.time.as_str())
        .bind(to_i32(booking.quantity, "quantity")?)
        .bind(to_i64(booking.price.subtotal, "subtotal")?)
        .bind(to_i64(booking.price.taxes, "taxes")?)
        .bind(to_i64(booking.price.total, "total")?)
        .bind(booking.promo_code.as_deref())
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(())
    }

    async fn find_booking(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = $1"
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(
        &self,
        reference: &BookingReference,
        at: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        let row = sqlx::query(&format!(
            r"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE reference = $1 AND status <> $2
            RETURNING {BOOKING_COLUMNS}
            "
        ))
        .bind(reference.as_str())
        .bind(BookingStatus::Cancelled.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(row) = row {
            return booking_from_row(&row);
        }

        // Nothing updated: either unknown or cancelled already.
        match self.find_booking(reference).await? {
            Some(_) => Err(StoreError::AlreadyCancelled(reference.to_string())),
            None => Err(StoreError::NotFound(reference.to_string())),
        }
    }
}
