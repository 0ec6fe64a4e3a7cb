//! Database schema management for the daily WeatherLink loader.
//!
//! Ensures required tables and indexes exist before the run starts.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `weather_station` directory table and the
/// `monthly_station_data` table holding one document per station per
/// calendar month. Safe to call on every startup; no-op if objects
/// already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Local station directory queried by the pipeline
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_station (
            id     UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name   TEXT NOT NULL,
            ext_id TEXT NOT NULL,
            origin TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Monthly documents; the reading sequence lives in JSONB so day-level
    // entries can be updated and appended in place
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_station_data (
            id              SERIAL PRIMARY KEY,
            weather_station UUID    NOT NULL,
            year            INTEGER NOT NULL,
            month           INTEGER NOT NULL,
            daily_readings  JSONB   NOT NULL DEFAULT '[]'::jsonb,
            UNIQUE (weather_station, year, month)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Basic index for the prefix query over external ids
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_weather_station_ext_id
            ON weather_station (ext_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
