//! Batch pipeline: fetch, aggregate and upsert one daily reading per
//! known station.
//!
//! Per-station failures (unparsable external id, vendor fetch error,
//! structurally empty payload, storage write failure) are logged and the
//! run moves on to the next station; they never abort the batch. The run
//! ends with a single summary line stating how many of the discovered
//! stations were submitted.

use anyhow::Result;
use chrono::{Datelike, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info};

use crate::aggregate::aggregate_daily_reading;
use crate::fetch::WeatherLinkClient;
use crate::stations::{extract_external_station_id, fetch_weather_stations};
use crate::store::{upsert_daily_reading, PgMonthlyStore};
use crate::Config;

// ---

/// Run the daily load for every known station.
pub async fn run(cfg: &Config, pool: &PgPool) -> Result<()> {
    // ---
    let today = Utc::now().date_naive();
    info!("Start loading weather data for {}", today);

    let stations = fetch_weather_stations(pool, &cfg.country_prefix).await?;
    info!("Weather stations found: {}", stations.len());

    let client = WeatherLinkClient::new(cfg)?;
    let store = PgMonthlyStore::new(pool.clone());

    let mut count = 0usize;
    for station in &stations {
        // ---
        debug!(
            "Processing station {} ({}, origin {})",
            station.name, station.ext_id, station.origin
        );

        let Some(external_id) = extract_external_station_id(&station.ext_id, &cfg.country_prefix)
        else {
            continue;
        };

        let Some(data) = client.fetch_history(external_id, today).await else {
            continue;
        };

        let Some(daily_reading) = aggregate_daily_reading(&data, today.day()) else {
            continue;
        };

        match upsert_daily_reading(
            &store,
            station.id,
            today.year(),
            today.month(),
            &daily_reading,
        )
        .await
        {
            Ok(()) => count += 1,
            Err(e) => {
                error!(
                    "Failed to store daily reading for station {} ({}): {}",
                    station.name, station.ext_id, e
                );
            }
        }
    }

    info!(
        "Finished loading weather data. {}/{} weather stations submitted",
        count,
        stations.len()
    );
    Ok(())
}
