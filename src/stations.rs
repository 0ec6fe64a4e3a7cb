//! Local weather station directory reader.
//!
//! Queries the `weather_station` table for the stations this run should
//! process: those whose external id starts with the configured country
//! prefix and whose origin marks them as WeatherLink stations. Also hosts
//! the helper that recovers the vendor's numeric station id from the
//! prefixed external id string.

use anyhow::Result;
use sqlx::PgPool;
use tracing::error;

use crate::WeatherStation;

// ---

/// Origin tag of stations ingested from WeatherLink.
pub const WEATHERLINK_ORIGIN: &str = "WEATHERLINK";

/// Fetch all WeatherLink stations whose external id starts with
/// `country_prefix`.
pub async fn fetch_weather_stations(
    pool: &PgPool,
    country_prefix: &str,
) -> Result<Vec<WeatherStation>> {
    // ---
    let pattern = format!("{}%", country_prefix);

    let stations = sqlx::query_as::<_, WeatherStation>(
        r#"
        SELECT id, name, ext_id, origin
        FROM weather_station
        WHERE ext_id LIKE $1 AND origin = $2
        "#,
    )
    .bind(&pattern)
    .bind(WEATHERLINK_ORIGIN)
    .fetch_all(pool)
    .await?;

    Ok(stations)
}

/// Recover the vendor's numeric station id from a prefixed external id.
///
/// `"COL123"` with prefix `"COL"` yields `Some(123)`. Returns `None` (with
/// an error log) when the prefix does not match or the remainder is not an
/// integer; the station is then skipped by the pipeline.
pub fn extract_external_station_id(ext_id: &str, prefix: &str) -> Option<u64> {
    // ---
    let Some(remaining) = ext_id.strip_prefix(prefix) else {
        error!(
            "Error extracting external station id for {}: Not starting with {}",
            ext_id, prefix
        );
        return None;
    };

    match remaining.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            error!(
                "Error extracting external station id for {}: Not an integer",
                ext_id
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_extracts_numeric_suffix() {
        // ---
        assert_eq!(extract_external_station_id("COL123456", "COL"), Some(123456));
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        // ---
        assert_eq!(extract_external_station_id("PER123456", "COL"), None);
    }

    #[test]
    fn test_rejects_non_numeric_suffix() {
        // ---
        assert_eq!(extract_external_station_id("COL12a4", "COL"), None);
        assert_eq!(extract_external_station_id("COL", "COL"), None);
    }
}
