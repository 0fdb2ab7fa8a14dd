use crate::models::DbBooking;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Result of a guarded insert, before conversion to domain types.
#[derive(Debug)]
pub enum DbInsert {
    Inserted(DbBooking),
    SlotTaken,
    WindowConflict(Vec<DbBooking>),
}

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    tracing::debug!("Getting booking by id: {}", id);

    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, user_id, booking_date, time_slot, created_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

pub async fn list_bookings_by_user(pool: &Pool<Postgres>, user_id: &str) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, user_id, booking_date, time_slot, created_at
        FROM bookings
        WHERE user_id = $1
        ORDER BY booking_date ASC, time_slot ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

pub async fn list_bookings_by_date(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, user_id, booking_date, time_slot, created_at
        FROM bookings
        WHERE booking_date = $1
        ORDER BY time_slot ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

pub async fn list_bookings_between(
    pool: &Pool<Postgres>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, user_id, booking_date, time_slot, created_at
        FROM bookings
        WHERE booking_date BETWEEN $1 AND $2
        ORDER BY booking_date ASC, time_slot ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Inserts a booking unless the slot is held or the user already has a
/// booking between `window_start` and `window_end` (inclusive).
///
/// Runs in one transaction holding a per-user advisory lock, so two requests
/// from the same user are serialized through the window check. The
/// `bookings_date_slot_key` constraint settles races between different users.
pub async fn insert_booking_if_free(
    pool: &Pool<Postgres>,
    user_id: &str,
    date: NaiveDate,
    time_slot: &str,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<DbInsert> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let holder = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM bookings
        WHERE booking_date = $1 AND time_slot = $2
        "#,
    )
    .bind(date)
    .bind(time_slot)
    .fetch_optional(&mut *tx)
    .await?;

    if holder.is_some() {
        tx.rollback().await?;
        return Ok(DbInsert::SlotTaken);
    }

    let own = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, user_id, booking_date, time_slot, created_at
        FROM bookings
        WHERE user_id = $1 AND booking_date BETWEEN $2 AND $3
        ORDER BY booking_date ASC
        "#,
    )
    .bind(user_id)
    .bind(window_start)
    .bind(window_end)
    .fetch_all(&mut *tx)
    .await?;

    if !own.is_empty() {
        tx.rollback().await?;
        return Ok(DbInsert::WindowConflict(own));
    }

    let inserted = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, user_id, booking_date, time_slot, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT bookings_date_slot_key DO NOTHING
        RETURNING id, user_id, booking_date, time_slot, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(date)
    .bind(time_slot)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    match inserted {
        Some(row) => {
            tx.commit().await?;
            tracing::debug!("Booking inserted: id={}, date={}, slot={}", row.id, date, time_slot);
            Ok(DbInsert::Inserted(row))
        }
        None => {
            tx.rollback().await?;
            Ok(DbInsert::SlotTaken)
        }
    }
}

/// Returns whether a row was removed.
pub async fn delete_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
