use chrono::{DateTime, Utc};

use crate::error::FareError;

/// A single validated ride. Built once at the boundary; the encoders
/// assume the invariants checked in `new`.
///
/// The pickup instant is stored as UTC. Callers are responsible for
/// resolving the timezone before construction: a timestamp without an
/// offset must be rejected at the parsing edge, never assumed local.
#[derive(Debug, Clone)]
pub struct RideRequest {
    pub pickup_datetime: DateTime<Utc>,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub passenger_count: u32,
}

impl RideRequest {
    pub fn new(
        pickup_datetime: DateTime<Utc>,
        pickup_latitude: f64,
        pickup_longitude: f64,
        dropoff_latitude: f64,
        dropoff_longitude: f64,
        passenger_count: u32,
    ) -> Result<Self, FareError> {
        check_latitude("pickup_latitude", pickup_latitude)?;
        check_longitude("pickup_longitude", pickup_longitude)?;
        check_latitude("dropoff_latitude", dropoff_latitude)?;
        check_longitude("dropoff_longitude", dropoff_longitude)?;
        if passenger_count < 1 {
            return Err(FareError::InvalidInput(
                "passenger_count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            pickup_datetime,
            pickup_latitude,
            pickup_longitude,
            dropoff_latitude,
            dropoff_longitude,
            passenger_count,
        })
    }
}

/// Parses an RFC 3339 pickup timestamp into a UTC instant. The offset
/// is mandatory: a naive timestamp is rejected rather than silently
/// assumed UTC or local.
pub fn parse_pickup_datetime(raw: &str) -> Result<DateTime<Utc>, FareError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            FareError::InvalidInput(format!(
                "pickup_datetime `{raw}`: {e} (RFC 3339 with UTC offset required)"
            ))
        })
}

fn check_latitude(name: &str, value: f64) -> Result<(), FareError> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err(FareError::InvalidInput(format!(
            "{name} out of range: {value}"
        )));
    }
    Ok(())
}

fn check_longitude(name: &str, value: f64) -> Result<(), FareError> {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        return Err(FareError::InvalidInput(format!(
            "{name} out of range: {value}"
        )));
    }
    Ok(())
}
