use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Channel the notify trigger publishes booking changes on.
pub const BOOKING_CHANNEL: &str = "booking_changes";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create bookings table; the (date, slot) key is the authoritative
    // double-booking guard.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id VARCHAR(255) NOT NULL,
            booking_date DATE NOT NULL,
            time_slot VARCHAR(16) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT bookings_date_slot_key UNIQUE (booking_date, time_slot),
            CONSTRAINT bookings_valid_slot
                CHECK (time_slot IN ('08:00-10:00', '10:00-12:00', '14:00-16:00')),
            CONSTRAINT bookings_friday_only CHECK (EXTRACT(ISODOW FROM booking_date) = 5)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id);")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user_date ON bookings(user_id, booking_date);")
        .execute(pool)
        .await?;

    // Change feed for every API instance
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION notify_booking_change() RETURNS trigger AS $$
        DECLARE
            row_data bookings%ROWTYPE;
            kind TEXT;
        BEGIN
            IF TG_OP = 'DELETE' THEN
                row_data := OLD;
                kind := 'cancelled';
            ELSE
                row_data := NEW;
                kind := 'created';
            END IF;
            PERFORM pg_notify(
                'booking_changes',
                json_build_object(
                    'kind', kind,
                    'id', row_data.id,
                    'user_id', row_data.user_id,
                    'date', row_data.booking_date,
                    'slot', row_data.time_slot
                )::text
            );
            RETURN row_data;
        END;
        $$ LANGUAGE plpgsql;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("DROP TRIGGER IF EXISTS bookings_notify ON bookings;")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TRIGGER bookings_notify
            AFTER INSERT OR DELETE ON bookings
            FOR EACH ROW EXECUTE FUNCTION notify_booking_change();
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
