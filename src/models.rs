//! Data models for the daily WeatherLink loader.
//!
//! Two families of types live here:
//! - Vendor payload types (`HistoricalData`, `SensorStream`, `SensorReading`)
//!   deserialized from the WeatherLink v2 historic endpoint. Unit conversion
//!   happens at this boundary: `temp_out` arrives in Fahrenheit and is stored
//!   in Celsius. Unknown payload fields are ignored on read and never
//!   round-tripped.
//! - Persisted climate types (`ClimaticMeasure`, `ClimaticData`,
//!   `DailyReading`, `MonthlyStationDocument`) written to the monthly
//!   collection, plus the local `WeatherStation` directory record.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---

/// One timestamped reading from a sensor stream. Any measurement may be
/// absent (sensor gap); only the timestamp is mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorReading {
    // ---
    pub ts: i64,
    pub rainfall_mm: Option<f64>,
    pub solar_rad_avg: Option<f64>,
    /// Outdoor temperature in Celsius (converted from the vendor's
    /// Fahrenheit during deserialization).
    #[serde(default, deserialize_with = "fahrenheit_as_celsius")]
    pub temp_out: Option<f64>,
    pub hum_out: Option<f64>,
}

/// One sensor stream within a station's historic payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorStream {
    // ---
    pub sensor_type: u32,
    pub data_structure_type: u32,
    pub data: Vec<SensorReading>,
}

/// The historic payload for one station and one 24-hour window.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalData {
    // ---
    pub station_id: u64,
    pub generated_at: i64,
    pub sensors: Vec<SensorStream>,
}

/// Local weather station directory record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeatherStation {
    // ---
    pub id: Uuid,
    pub name: String,
    pub ext_id: String,
    pub origin: String,
}

// ---

/// Climatic measure kinds, serialized with the wire codes used by the
/// monthly collection. Only eight are produced by the aggregator;
/// `HumidityRel` and the two precipitation tertiles exist on the wire
/// format but are never emitted by current logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimaticMeasure {
    // ---
    #[serde(rename = "prec")]
    Precipitation,
    #[serde(rename = "t_max")]
    TempMax,
    #[serde(rename = "t_min")]
    TempMin,
    #[serde(rename = "t_avg")]
    TempAvg,
    #[serde(rename = "hum_max")]
    HumidityMax,
    #[serde(rename = "hum_min")]
    HumidityMin,
    #[serde(rename = "hum_avg")]
    HumidityAvg,
    #[serde(rename = "rel_hum")]
    HumidityRel,
    #[serde(rename = "sol_rad")]
    SolarRadiation,
    #[serde(rename = "prec_ter_1")]
    PrecipitationTer1,
    #[serde(rename = "prec_ter_2")]
    PrecipitationTer2,
}

/// One measure with its (possibly uncomputable) value. `None` means
/// "could not be computed", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimaticData {
    // ---
    pub measure: ClimaticMeasure,
    pub value: Option<f64>,
}

/// One day's aggregated climatic summary. The containing monthly document
/// scopes the day; no year/month is attached here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    // ---
    pub day: u32,
    pub data: Vec<ClimaticData>,
}

/// Persisted monthly document grouping all daily readings for one station
/// within one calendar month. Natural key: (weather_station, year, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStationDocument {
    // ---
    pub weather_station: Uuid,
    pub year: i32,
    pub month: u32,
    pub daily_readings: Vec<DailyReading>,
}

// ---

/// Deserialize an optional Fahrenheit value as Celsius.
fn fahrenheit_as_celsius<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    // ---
    let fahrenheit = Option::<f64>::deserialize(deserializer)?;
    Ok(fahrenheit.map(|f| (f - 32.0) * 5.0 / 9.0))
}
