//! Parser for the 10-minute mean wind CSV table.
//!
//! The feed carries one row per automatic weather station. Only the station
//! name and mean speed columns are read; every other column (timestamp,
//! direction, gust) is ignored so that layout changes elsewhere in the table
//! do not break parsing.

use common::{Error, WindReading};
use tracing::debug;

pub const STATION_COLUMN: &str = "Automatic Weather Station";
pub const SPEED_COLUMN: &str = "10-Minute Mean Speed(km/hour)";

const BOM: char = '\u{feff}';

/// Parse a wind table body into one reading per row, in feed order.
pub fn parse_wind_table(body: &str) -> Result<Vec<WindReading>, Error> {
    let body = body.strip_prefix(BOM).unwrap_or(body);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Parse(format!("wind table header unreadable: {e}")))?
        .clone();

    let station_idx = column_index(&headers, STATION_COLUMN)?;
    let speed_idx = column_index(&headers, SPEED_COLUMN)?;

    let mut readings = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record =
            record.map_err(|e| Error::Parse(format!("wind table line {line}: {e}")))?;

        let station = record
            .get(station_idx)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Parse(format!("wind table line {line}: missing station name")))?;

        let raw_speed = record.get(speed_idx).unwrap_or_default();
        let speed = parse_speed(raw_speed).ok_or_else(|| {
            Error::Parse(format!(
                "wind table line {line}: speed {raw_speed:?} for {station} is not a non-negative number"
            ))
        })?;

        readings.push(WindReading::new(station, speed));
    }

    debug!("Parsed {} wind readings", readings.len());
    Ok(readings)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, Error> {
    headers
        .iter()
        .position(|h| h.trim_start_matches(BOM) == name)
        .ok_or_else(|| Error::Parse(format!("wind table missing column {name:?}")))
}

fn parse_speed(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}Date time,Automatic Weather Station,10-Minute Mean Wind Direction(Compass points),10-Minute Mean Speed(km/hour),10-Minute Maximum Gust(km/hour)\n\
202309011440,Chek Lap Kok,East,65,95\n\
202309011440, Cheung Chau ,East, 88 ,120\n\
202309011440,Green Island,East,102,140\n\
202309011440,Kai Tak,North,47.5,70\n";

    #[test]
    fn test_parses_every_row_in_order() {
        let readings = parse_wind_table(SAMPLE).unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0], WindReading::new("Chek Lap Kok", 65.0));
        assert_eq!(readings[1], WindReading::new("Cheung Chau", 88.0));
        // Non-reference stations are kept at this layer.
        assert_eq!(readings[2].station_name, "Green Island");
        assert!((readings[3].mean_speed_kmh - 47.5).abs() < 1e-9);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let body = "10-Minute Mean Speed(km/hour),Automatic Weather Station\n30,Sha Tin\n";
        let readings = parse_wind_table(body).unwrap();
        assert_eq!(readings, vec![WindReading::new("Sha Tin", 30.0)]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let body = "Automatic Weather Station,10-Minute Mean Speed(km/hour)\n\nSai Kung,12\n\n";
        assert_eq!(parse_wind_table(body).unwrap().len(), 1);
    }

    #[test]
    fn test_header_only_yields_no_readings() {
        let body = "Automatic Weather Station,10-Minute Mean Speed(km/hour)\n";
        assert!(parse_wind_table(body).unwrap().is_empty());
    }

    #[test]
    fn test_missing_speed_column_is_parse_error() {
        let body = "Automatic Weather Station,10-Minute Mean Wind Direction(Compass points)\nKai Tak,North\n";
        let err = parse_wind_table(body).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains(SPEED_COLUMN));
    }

    #[test]
    fn test_missing_station_column_is_parse_error() {
        let body = "Station,10-Minute Mean Speed(km/hour)\nKai Tak,40\n";
        assert!(parse_wind_table(body).unwrap_err().is_parse());
    }

    #[test]
    fn test_non_numeric_speed_is_parse_error() {
        let body = "Automatic Weather Station,10-Minute Mean Speed(km/hour)\nKai Tak,N/A\n";
        let err = parse_wind_table(body).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Kai Tak"));
    }

    #[test]
    fn test_negative_or_non_finite_speed_is_parse_error() {
        for bad in ["-3", "NaN", "inf"] {
            let body = format!("Automatic Weather Station,10-Minute Mean Speed(km/hour)\nTsing Yi,{bad}\n");
            assert!(parse_wind_table(&body).unwrap_err().is_parse(), "{bad} accepted");
        }
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let body = "Automatic Weather Station,Other,10-Minute Mean Speed(km/hour)\nTsing Yi,x\n";
        assert!(parse_wind_table(body).unwrap_err().is_parse());
    }
}
