use chrono::{DateTime, NaiveDateTime};

use crate::api::models::{TripDuration, TripResponse};

/// Read-only display projection of one trip result. Recomputed fresh for
/// every successful submission, never merged with a previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub distance_text: String,
    pub duration_text: String,
    pub departure_text: String,
    pub arrival_text: String,
    pub odometer_text: String,
}

impl TripSummary {
    pub fn from_response(response: &TripResponse) -> Self {
        let distance_text = format!("{} km", response.distance_km_value().unwrap_or(0.0));
        let duration_text = match response.duration() {
            Some(TripDuration::Seconds(seconds)) => format_seconds(seconds),
            Some(TripDuration::FractionalMinutes(minutes)) => {
                format_fractional_minutes(minutes)
            }
            None => format_seconds(0),
        };
        let odometer_text = format!(
            "{} → {} km",
            response.start_odometer_value().unwrap_or(0.0),
            response.next_odometer_value().unwrap_or(0.0)
        );
        TripSummary {
            distance_text,
            duration_text,
            departure_text: format_timestamp(response.departure_text_raw()),
            arrival_text: format_timestamp(response.arrival_text_raw()),
            odometer_text,
        }
    }
}

/// `125` -> `"2m 5s"`.
pub fn format_seconds(total_seconds: u64) -> String {
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// `2.0833` -> `"2:05"`. The seconds part carries into the minutes so 59.7
/// seconds never shows as `:60`.
pub fn format_fractional_minutes(minutes: f64) -> String {
    let mut whole = minutes.floor() as u64;
    let mut seconds = ((minutes - minutes.floor()) * 60.0).round() as u64;
    if seconds == 60 {
        whole += 1;
        seconds = 0;
    }
    format!("{whole}:{seconds:02}")
}

/// ISO timestamps render as local-style wall clock text; anything missing or
/// unparsable renders as "0" rather than failing the summary.
fn format_timestamp(raw: Option<&str>) -> String {
    let raw = match raw {
        None => return "0".to_string(),
        Some(raw) => raw,
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    // isoformat() without an offset
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    // the older backend sends preformatted "HH:MM" strings, keep them
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_formatting() {
        assert_eq!(format_seconds(125), "2m 5s");
        assert_eq!(format_seconds(0), "0m 0s");
        assert_eq!(format_seconds(60), "1m 0s");
        assert_eq!(format_seconds(3601), "60m 1s");
    }

    #[test]
    fn fractional_minutes_formatting() {
        assert_eq!(format_fractional_minutes(2.0 + 5.0 / 60.0), "2:05");
        assert_eq!(format_fractional_minutes(0.0), "0:00");
        // rounding at the top of the minute carries
        assert_eq!(format_fractional_minutes(1.9999), "2:00");
    }
}
