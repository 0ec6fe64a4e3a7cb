//! Monthly document store and the day-level merge/upsert engine.
//!
//! The store is modeled as the four primitives the persistence layer
//! offers the core: exact-key lookup, targeted update of one day's payload,
//! append of a new day, and whole-document insert. `upsert_daily_reading`
//! composes them into the three-way merge that keeps at most one
//! [`DailyReading`] per day per monthly document.
//!
//! The production implementation is a PostgreSQL table with the reading
//! sequence in a JSONB column; tests exercise the merge logic against an
//! in-memory store implementing the same trait.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DailyReading, MonthlyStationDocument};

// ---

/// Storage primitives for the monthly collection, keyed by
/// (station, year, month).
#[async_trait]
pub trait MonthlyStore: Send + Sync {
    /// Whether a document exists for the key.
    async fn month_exists(&self, station: Uuid, year: i32, month: u32) -> Result<bool>;

    /// Replace the climatic payload of the entry matching `reading.day`
    /// inside the keyed document. Returns `false` when the document holds
    /// no entry for that day (nothing is written in that case).
    async fn update_day(
        &self,
        station: Uuid,
        year: i32,
        month: u32,
        reading: &DailyReading,
    ) -> Result<bool>;

    /// Append a new day entry to the keyed document's reading sequence.
    async fn append_day(
        &self,
        station: Uuid,
        year: i32,
        month: u32,
        reading: &DailyReading,
    ) -> Result<()>;

    /// Insert a whole new monthly document.
    async fn insert_month(&self, document: &MonthlyStationDocument) -> Result<()>;
}

/// Merge one daily reading into the monthly document for
/// (`station`, `year`, `month`).
///
/// Branch order is fixed and is what makes repeated calls converge:
/// 1. document exists and already has this day → targeted update in place;
/// 2. document exists without this day → append;
/// 3. no document → create with a single-element reading sequence.
///
/// Storage errors propagate uncaught; the batch driver decides how to
/// tolerate them per station.
pub async fn upsert_daily_reading<S: MonthlyStore>(
    store: &S,
    station: Uuid,
    year: i32,
    month: u32,
    reading: &DailyReading,
) -> Result<()> {
    // ---
    if store.month_exists(station, year, month).await? {
        // Try the targeted same-day update first; only append when it
        // reports no matching day.
        if !store.update_day(station, year, month, reading).await? {
            store.append_day(station, year, month, reading).await?;
        }
    } else {
        let document = MonthlyStationDocument {
            weather_station: station,
            year,
            month,
            daily_readings: vec![reading.clone()],
        };
        store.insert_month(&document).await?;
    }

    Ok(())
}

// ---

/// PostgreSQL-backed monthly store over the `monthly_station_data` table.
///
/// The reading sequence lives in a JSONB column, which gives the same
/// day-addressed primitives a document database would: the targeted update
/// rewrites only the matching day's `data` field in one statement guarded
/// by JSONB containment, and the append is JSONB array concatenation.
pub struct PgMonthlyStore {
    // ---
    pool: PgPool,
}

impl PgMonthlyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MonthlyStore for PgMonthlyStore {
    async fn month_exists(&self, station: Uuid, year: i32, month: u32) -> Result<bool> {
        // ---
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM monthly_station_data
                WHERE weather_station = $1 AND year = $2 AND month = $3
            )
            "#,
        )
        .bind(station)
        .bind(year)
        .bind(month as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_day(
        &self,
        station: Uuid,
        year: i32,
        month: u32,
        reading: &DailyReading,
    ) -> Result<bool> {
        // ---
        // The containment guard restricts the statement to documents that
        // already hold this day, so rows_affected doubles as the matched
        // count; the CASE rewrite then replaces only that entry's payload.
        let result = sqlx::query(
            r#"
            UPDATE monthly_station_data
            SET daily_readings = (
                SELECT jsonb_agg(
                    CASE WHEN (entry->>'day')::int = $4
                         THEN jsonb_set(entry, '{data}', $5)
                         ELSE entry
                    END
                )
                FROM jsonb_array_elements(daily_readings) AS entry
            )
            WHERE weather_station = $1 AND year = $2 AND month = $3
              AND daily_readings @> $6
            "#,
        )
        .bind(station)
        .bind(year)
        .bind(month as i32)
        .bind(reading.day as i32)
        .bind(serde_json::to_value(&reading.data)?)
        .bind(json!([{ "day": reading.day }]))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_day(
        &self,
        station: Uuid,
        year: i32,
        month: u32,
        reading: &DailyReading,
    ) -> Result<()> {
        // ---
        sqlx::query(
            r#"
            UPDATE monthly_station_data
            SET daily_readings = daily_readings || $4
            WHERE weather_station = $1 AND year = $2 AND month = $3
            "#,
        )
        .bind(station)
        .bind(year)
        .bind(month as i32)
        .bind(json!([reading]))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_month(&self, document: &MonthlyStationDocument) -> Result<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO monthly_station_data (weather_station, year, month, daily_readings)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(document.weather_station)
        .bind(document.year)
        .bind(document.month as i32)
        .bind(serde_json::to_value(&document.daily_readings)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
