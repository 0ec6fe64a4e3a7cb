//! WeatherLink v2 historic data fetcher.
//!
//! Thin HTTP collaborator: given a station's external numeric id and the
//! target day, pulls the sensor payload for the 24-hour window ending at
//! 12:00:00 UTC of that day. Any HTTP or decode failure is logged and
//! surfaces to the pipeline as "no data" for that station, never a crash.

use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, error};

use crate::{Config, HistoricalData};

// ---

const HISTORIC_URL: &str = "https://api.weatherlink.com/v2/historic";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the WeatherLink v2 API, carrying the vendor credentials.
pub struct WeatherLinkClient {
    // ---
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
}

impl WeatherLinkClient {
    /// Build a client from the loaded configuration.
    pub fn new(cfg: &Config) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
        })
    }

    /// Fetch the historic payload for `station_id` covering the 24 hours
    /// ending at noon UTC of `today`.
    ///
    /// Returns `None` on any request or decode failure; the error is logged
    /// with station context and the caller moves on to the next station.
    pub async fn fetch_history(
        &self,
        station_id: u64,
        today: NaiveDate,
    ) -> Option<HistoricalData> {
        // ---
        let (start, end) = history_window(today);

        match self.request_history(station_id, start, end).await {
            Ok(data) => {
                debug!(
                    "Station {} history generated_at={} with {} sensor streams",
                    data.station_id,
                    data.generated_at,
                    data.sensors.len()
                );
                Some(data)
            }
            Err(e) => {
                error!("Error loading WeatherLink data for station {}: {}", station_id, e);
                None
            }
        }
    }

    async fn request_history(
        &self,
        station_id: u64,
        start: i64,
        end: i64,
    ) -> Result<HistoricalData> {
        // ---
        let url = format!("{}/{}", HISTORIC_URL, station_id);

        let data = self
            .http
            .get(&url)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("start-timestamp", start.to_string().as_str()),
                ("end-timestamp", end.to_string().as_str()),
            ])
            .header("X-Api-Secret", &self.api_secret)
            .send()
            .await?
            .error_for_status()?
            .json::<HistoricalData>()
            .await?;

        Ok(data)
    }
}

// ---

/// Compute the fetch window for one day: end = `today` at 12:00:00 UTC,
/// start = end − 24 h, both as seconds since the epoch.
pub fn history_window(today: NaiveDate) -> (i64, i64) {
    // ---
    let noon_utc = today.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(12);
    let end = noon_utc.timestamp();
    (end - 24 * 60 * 60, end)
}
