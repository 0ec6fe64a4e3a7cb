//! Daily aggregation of WeatherLink sensor readings.
//!
//! Reduces one station's historic payload for one 24-hour window into a
//! single [`DailyReading`] with eight climatic measures. This is a pure
//! function over the fetched payload; it never fails, it only returns
//! `None` when the payload has no usable primary sensor stream.
//!
//! Aggregation policy: precipitation and solar radiation are additive
//! across the day, so an empty set sums to 0.0. Temperature and humidity
//! are instantaneous, so with no values present their min/max/avg stay
//! `None` rather than being conflated with a zero reading.

use tracing::{debug, warn};

use crate::{
    ClimaticData, ClimaticMeasure, DailyReading, HistoricalData, SensorReading, SensorStream,
};

// ---

/// Vendor sensor type codes of the integrated outdoor sensor suite (ISS).
const PRIMARY_SENSOR_TYPES: [u32; 2] = [37, 84];

/// Aggregate one station's historic payload into a daily summary stamped
/// with `day` (calendar day of month).
///
/// Returns `None` when no primary outdoor sensor stream is present or when
/// the selected stream carries no readings; both cases are logged. Every
/// other input produces a full eight-measure record, with `None` values
/// for measures that could not be computed.
pub fn aggregate_daily_reading(historical_data: &HistoricalData, day: u32) -> Option<DailyReading> {
    // ---
    let Some(sensor) = find_primary_sensor(&historical_data.sensors) else {
        warn!(
            "No primary outdoor sensor present in station: {}",
            historical_data.station_id
        );
        return None;
    };

    let daily_data = &sensor.data;
    if daily_data.is_empty() {
        warn!(
            "Primary sensor (type {}, structure {}) readings are empty in station: {}",
            sensor.sensor_type, sensor.data_structure_type, historical_data.station_id
        );
        return None;
    }

    if let (Some(first), Some(last)) = (daily_data.first(), daily_data.last()) {
        debug!(
            "Aggregating {} readings spanning ts {}..{} for station {}",
            daily_data.len(),
            first.ts,
            last.ts,
            historical_data.station_id
        );
    }

    let precipitation: f64 = daily_data.iter().filter_map(|d| d.rainfall_mm).sum();
    let solar_radiation: f64 = daily_data.iter().filter_map(|d| d.solar_rad_avg).sum();

    let temp = summarize(daily_data, |d| d.temp_out);
    let humidity = summarize(daily_data, |d| d.hum_out);

    Some(DailyReading {
        day,
        data: vec![
            ClimaticData {
                measure: ClimaticMeasure::Precipitation,
                value: Some(precipitation),
            },
            ClimaticData {
                measure: ClimaticMeasure::TempMin,
                value: temp.min,
            },
            ClimaticData {
                measure: ClimaticMeasure::TempMax,
                value: temp.max,
            },
            ClimaticData {
                measure: ClimaticMeasure::TempAvg,
                value: temp.avg,
            },
            ClimaticData {
                measure: ClimaticMeasure::SolarRadiation,
                value: Some(solar_radiation),
            },
            ClimaticData {
                measure: ClimaticMeasure::HumidityMin,
                value: humidity.min,
            },
            ClimaticData {
                measure: ClimaticMeasure::HumidityMax,
                value: humidity.max,
            },
            ClimaticData {
                measure: ClimaticMeasure::HumidityAvg,
                value: humidity.avg,
            },
        ],
    })
}

// ---

/// Select the primary outdoor sensor stream: the first stream whose type is
/// one of the ISS codes, in payload order. At most one stream qualifies in
/// practice; if the vendor ever returns more, the first encountered wins.
fn find_primary_sensor(sensors: &[SensorStream]) -> Option<&SensorStream> {
    // ---
    sensors
        .iter()
        .find(|s| PRIMARY_SENSOR_TYPES.contains(&s.sensor_type))
}

/// Min/max/mean over the readings where one metric is present.
struct MetricSummary {
    min: Option<f64>,
    max: Option<f64>,
    avg: Option<f64>,
}

fn summarize(
    readings: &[SensorReading],
    metric: impl Fn(&SensorReading) -> Option<f64>,
) -> MetricSummary {
    // ---
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in readings.iter().filter_map(metric) {
        min = Some(min.map_or(value, |m: f64| m.min(value)));
        max = Some(max.map_or(value, |m: f64| m.max(value)));
        sum += value;
        count += 1;
    }

    let avg = (count > 0).then(|| sum / count as f64);
    MetricSummary { min, max, avg }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn reading(
        ts: i64,
        rainfall_mm: Option<f64>,
        temp_out: Option<f64>,
        hum_out: Option<f64>,
        solar_rad_avg: Option<f64>,
    ) -> SensorReading {
        // ---
        SensorReading {
            ts,
            rainfall_mm,
            solar_rad_avg,
            temp_out,
            hum_out,
        }
    }

    fn payload(sensor_type: u32, data: Vec<SensorReading>) -> HistoricalData {
        // ---
        HistoricalData {
            station_id: 98765,
            generated_at: 1700000000,
            sensors: vec![SensorStream {
                sensor_type,
                data_structure_type: 11,
                data,
            }],
        }
    }

    fn value_of(daily: &DailyReading, measure: ClimaticMeasure) -> Option<f64> {
        // ---
        daily
            .data
            .iter()
            .find(|d| d.measure == measure)
            .expect("measure missing from daily reading")
            .value
    }

    #[test]
    fn test_no_primary_sensor_yields_none() {
        // ---
        // Type 12 is not an ISS stream, so nothing qualifies
        let data = payload(12, vec![reading(1, Some(1.0), Some(20.0), Some(80.0), None)]);
        assert!(aggregate_daily_reading(&data, 15).is_none());
    }

    #[test]
    fn test_first_matching_iss_stream_is_selected() {
        // ---
        let mut data = payload(12, vec![]);
        data.sensors.push(SensorStream {
            sensor_type: 37,
            data_structure_type: 11,
            data: vec![reading(1, Some(2.5), None, None, None)],
        });

        let daily = aggregate_daily_reading(&data, 15).unwrap();
        assert_eq!(value_of(&daily, ClimaticMeasure::Precipitation), Some(2.5));
    }

    #[test]
    fn test_type_84_also_qualifies_as_primary() {
        // ---
        let data = payload(84, vec![reading(1, Some(1.0), None, None, None)]);
        assert!(aggregate_daily_reading(&data, 15).is_some());
    }

    #[test]
    fn test_empty_readings_yield_none() {
        // ---
        let data = payload(37, vec![]);
        assert!(aggregate_daily_reading(&data, 15).is_none());
    }

    #[test]
    fn test_precipitation_sums_to_zero_when_absent() {
        // ---
        // No rainfall values present at all: the sum is 0.0, never null
        let data = payload(37, vec![reading(1, None, Some(20.0), None, None)]);
        let daily = aggregate_daily_reading(&data, 15).unwrap();

        assert_eq!(value_of(&daily, ClimaticMeasure::Precipitation), Some(0.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::SolarRadiation), Some(0.0));
    }

    #[test]
    fn test_temperature_nulls_when_no_values_present() {
        // ---
        let data = payload(37, vec![reading(1, Some(0.5), None, Some(70.0), None)]);
        let daily = aggregate_daily_reading(&data, 15).unwrap();

        assert_eq!(value_of(&daily, ClimaticMeasure::TempMin), None);
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMax), None);
        assert_eq!(value_of(&daily, ClimaticMeasure::TempAvg), None);
        // Humidity is computed independently of the missing temperatures
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityAvg), Some(70.0));
    }

    #[test]
    fn test_single_temperature_value_collapses_min_max_avg() {
        // ---
        let data = payload(37, vec![reading(1, None, Some(21.5), None, None)]);
        let daily = aggregate_daily_reading(&data, 15).unwrap();

        assert_eq!(value_of(&daily, ClimaticMeasure::TempMin), Some(21.5));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMax), Some(21.5));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempAvg), Some(21.5));
    }

    #[test]
    fn test_day_and_measure_order_are_fixed() {
        // ---
        let data = payload(37, vec![reading(1, Some(1.0), Some(20.0), Some(80.0), Some(5.0))]);
        let daily = aggregate_daily_reading(&data, 28).unwrap();

        assert_eq!(daily.day, 28);
        let order: Vec<ClimaticMeasure> = daily.data.iter().map(|d| d.measure).collect();
        assert_eq!(
            order,
            vec![
                ClimaticMeasure::Precipitation,
                ClimaticMeasure::TempMin,
                ClimaticMeasure::TempMax,
                ClimaticMeasure::TempAvg,
                ClimaticMeasure::SolarRadiation,
                ClimaticMeasure::HumidityMin,
                ClimaticMeasure::HumidityMax,
                ClimaticMeasure::HumidityAvg,
            ]
        );
    }

    #[test]
    fn test_aggregates_wire_payload_end_to_end() {
        // ---
        // Straight off the wire: temperatures in Fahrenheit, one humidity gap
        let json = r#"
        {
            "station_id": 98765,
            "generated_at": 1700000000,
            "sensors": [
                {
                    "sensor_type": 37,
                    "data_structure_type": 11,
                    "data": [
                        {"ts": 1, "rainfall_mm": 2.0, "temp_out": 68.0, "hum_out": 80.0},
                        {"ts": 2, "rainfall_mm": 1.0, "temp_out": 77.0, "hum_out": null}
                    ]
                }
            ]
        }"#;
        let data: HistoricalData = serde_json::from_str(json).unwrap();
        let daily = aggregate_daily_reading(&data, 15).unwrap();

        assert_eq!(value_of(&daily, ClimaticMeasure::Precipitation), Some(3.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMin), Some(20.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMax), Some(25.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempAvg), Some(22.5));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityMin), Some(80.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityMax), Some(80.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityAvg), Some(80.0));
    }

    #[test]
    fn test_partial_gaps_aggregate_per_metric() {
        // ---
        // Two readings as they come off the wire: 68°F and 77°F become
        // 20°C and 25°C at the deserialization boundary, humidity is
        // present in only one of them.
        let data = payload(
            37,
            vec![
                reading(1, Some(2.0), Some(20.0), Some(80.0), None),
                reading(2, Some(1.0), Some(25.0), None, None),
            ],
        );
        let daily = aggregate_daily_reading(&data, 15).unwrap();

        assert_eq!(value_of(&daily, ClimaticMeasure::Precipitation), Some(3.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMin), Some(20.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempMax), Some(25.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::TempAvg), Some(22.5));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityMin), Some(80.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityMax), Some(80.0));
        assert_eq!(value_of(&daily, ClimaticMeasure::HumidityAvg), Some(80.0));
    }
}
