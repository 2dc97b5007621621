use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{flight_status::FlightStatus, sim_error::SimError};

/// Console input format for departure and arrival times.
const CONSOLE_DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Represents one flight's tracking snapshot as handed over by the upstream
/// source and as published back to the snapshot store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "flightNumber", default)]
    pub flight_number: String,
    #[serde(rename = "flight_status")]
    pub status: FlightStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_status_label: Option<String>,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    #[serde(default)]
    pub live: Option<Telemetry>,
}

/// One end of the route. Times are kept as the raw strings the source sent so
/// that a malformed value only affects this record's schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub iata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Live position payload, only present while a flight is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub latitude: f64,
    pub longitude: f64,
    /// Feet.
    #[serde(default)]
    pub altitude: f64,
    /// km/h.
    #[serde(default, alias = "speed")]
    pub speed_horizontal: f64,
    #[serde(default)]
    pub speed_vertical: f64,
    /// Degrees, [0, 360).
    #[serde(default)]
    pub direction: f64,
    #[serde(default)]
    pub is_ground: bool,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

/// Departure/arrival instants as epoch millis. `None` when missing or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub departure_ms: Option<i64>,
    pub arrival_ms: Option<i64>,
}

impl Schedule {
    /// Total scheduled duration, if both ends are known and it is positive.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.departure_ms, self.arrival_ms) {
            (Some(departure), Some(arrival)) if arrival > departure => Some(arrival - departure),
            _ => None,
        }
    }

    /// Fraction of the schedule elapsed at `now_ms`, unclamped.
    pub fn elapsed_fraction(&self, now_ms: i64) -> Option<f64> {
        let total = self.duration_ms()?;
        let departure = self.departure_ms?;
        Some((now_ms - departure) as f64 / total as f64)
    }
}

impl FlightRecord {
    /// Creates a scheduled flight between two airports.
    pub fn scheduled(
        flight_number: &str,
        origin: &str,
        destination: &str,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
    ) -> Self {
        FlightRecord {
            id: None,
            flight_number: flight_number.to_string(),
            status: FlightStatus::Scheduled,
            flight_status_label: Some(FlightStatus::Scheduled.label().to_string()),
            departure: Endpoint {
                iata: origin.to_string(),
                scheduled: Some(format_instant(departure_time)),
                ..Endpoint::default()
            },
            arrival: Endpoint {
                iata: destination.to_string(),
                scheduled: Some(format_instant(arrival_time)),
                ..Endpoint::default()
            },
            live: None,
        }
    }

    /// Creates a scheduled flight from the information given in the console.
    pub fn new_from_console(
        flight_number: &str,
        origin_code: &str,
        destination_code: &str,
        departure_time_str: &str,
        arrival_time_str: &str,
    ) -> Result<Self, SimError> {
        if flight_number.trim().is_empty() {
            return Err(SimError::InvalidInput("empty flight number".to_string()));
        }

        let departure_time = parse_console_datetime(departure_time_str)?;
        let arrival_time = parse_console_datetime(arrival_time_str)?;

        if arrival_time <= departure_time {
            return Err(SimError::InvalidInput(
                "arrival must be after departure".to_string(),
            ));
        }

        Ok(Self::scheduled(
            flight_number.trim(),
            &origin_code.trim().to_uppercase(),
            &destination_code.trim().to_uppercase(),
            departure_time,
            arrival_time,
        ))
    }

    /// Stable key of the record: `id` when present, else the flight number.
    pub fn identity(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| Some(self.flight_number.as_str()).filter(|n| !n.trim().is_empty()))
    }

    /// Departure is the scheduled time; arrival prefers the estimate.
    pub fn schedule(&self) -> Schedule {
        let arrival = self
            .arrival
            .estimated
            .as_deref()
            .and_then(parse_instant)
            .or_else(|| self.arrival.scheduled.as_deref().and_then(parse_instant));

        Schedule {
            departure_ms: self
                .departure
                .scheduled
                .as_deref()
                .and_then(parse_instant)
                .map(|t| t.timestamp_millis()),
            arrival_ms: arrival.map(|t| t.timestamp_millis()),
        }
    }

    pub fn set_status(&mut self, status: FlightStatus) {
        self.status = status;
        self.flight_status_label = Some(status.label().to_string());
    }

    /// Airport name when the source gave one, else the IATA code.
    pub fn origin_name(&self) -> &str {
        self.departure.airport.as_deref().unwrap_or(&self.departure.iata)
    }

    pub fn destination_name(&self) -> &str {
        self.arrival.airport.as_deref().unwrap_or(&self.arrival.iata)
    }
}

/// RFC 3339 with millisecond precision, the format written back to the store.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 and the console format (interpreted as UTC).
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_console_datetime(value).ok())
}

fn parse_console_datetime(datetime_str: &str) -> Result<DateTime<Utc>, SimError> {
    NaiveDateTime::parse_from_str(datetime_str.trim(), CONSOLE_DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| SimError::InvalidInput(format!("invalid date: {}", datetime_str)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_identity_prefers_id() {
        let mut record = FlightRecord::scheduled("AB100", "MAD", "BCN", t0(), t0());
        assert_eq!(record.identity(), Some("AB100"));

        record.id = Some("flight-1".to_string());
        assert_eq!(record.identity(), Some("flight-1"));

        record.id = Some("  ".to_string());
        assert_eq!(record.identity(), Some("AB100"));

        record.flight_number.clear();
        assert_eq!(record.identity(), None);
    }

    #[test]
    fn test_schedule_prefers_estimated_arrival() {
        let mut record =
            FlightRecord::scheduled("AB100", "MAD", "BCN", t0(), t0() + Duration::hours(2));
        let schedule = record.schedule();
        assert_eq!(schedule.duration_ms(), Some(2 * 3600 * 1000));

        record.arrival.estimated = Some(format_instant(t0() + Duration::hours(3)));
        assert_eq!(record.schedule().duration_ms(), Some(3 * 3600 * 1000));
    }

    #[test]
    fn test_malformed_schedule_has_no_duration() {
        let mut record =
            FlightRecord::scheduled("AB100", "MAD", "BCN", t0(), t0() + Duration::hours(2));
        record.departure.scheduled = Some("not a date".to_string());
        assert_eq!(record.schedule().departure_ms, None);
        assert_eq!(record.schedule().duration_ms(), None);

        let inverted = FlightRecord::scheduled("AB101", "MAD", "BCN", t0(), t0());
        assert_eq!(inverted.schedule().duration_ms(), None);
    }

    #[test]
    fn test_elapsed_fraction() {
        let record =
            FlightRecord::scheduled("AB100", "MAD", "BCN", t0(), t0() + Duration::hours(2));
        let schedule = record.schedule();
        let halfway = (t0() + Duration::hours(1)).timestamp_millis();
        assert_eq!(schedule.elapsed_fraction(halfway), Some(0.5));
    }

    #[test]
    fn test_new_from_console() {
        let record = FlightRecord::new_from_console(
            "AR1234",
            "aep",
            "mdz",
            "01-05-2024 10:00:00",
            "01-05-2024 12:00:00",
        )
        .unwrap();
        assert_eq!(record.departure.iata, "AEP");
        assert_eq!(record.status, FlightStatus::Scheduled);
        assert_eq!(record.schedule().departure_ms, Some(t0().timestamp_millis()));

        assert!(FlightRecord::new_from_console(
            "AR1234",
            "AEP",
            "MDZ",
            "01-05-2024 12:00:00",
            "01-05-2024 10:00:00"
        )
        .is_err());
        assert!(FlightRecord::new_from_console("AR1234", "AEP", "MDZ", "tomorrow", "later").is_err());
    }

    #[test]
    fn test_deserializes_source_shape() {
        let json = r#"{
            "flightNumber": "IB3100",
            "flight_status": "active",
            "departure": {"iata": "MAD", "scheduled": "2024-05-01T10:00:00+00:00"},
            "arrival": {"iata": "BCN", "scheduled": "2024-05-01T11:15:00Z"},
            "live": {"latitude": 40.9, "longitude": -1.0, "altitude": 33000, "speed": 480}
        }"#;
        let record: FlightRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.identity(), Some("IB3100"));
        assert_eq!(record.status, FlightStatus::Active);
        let live = record.live.unwrap();
        assert_eq!(live.speed_horizontal, 480.0);
        assert_eq!(live.altitude, 33000.0);
        assert_eq!(live.updated, None);
    }
}
