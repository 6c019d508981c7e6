//! Canonical latitude/longitude pair.
//!
//! Shop rows written by older clients store coordinates as a `"lat,lng"` string, a
//! `[lat, lng]` array, or a `{lat, lng}` / `{latitude, longitude}` object. Deserialization
//! accepts all of them and always produces the same type; serialization writes the
//! object form with full field names.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatesError {
    #[error("coordinates are not numbers: {0}")]
    Malformed(String),
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoordinatesError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoordinatesError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "latitude": self.latitude, "longitude": self.longitude })
    }

    /// Great-circle distance (haversine).
    pub fn distance_meters(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinates {
    Text(String),
    Pair([f64; 2]),
    Short { lat: f64, lng: f64 },
    Long { latitude: f64, longitude: f64 },
}

impl RawCoordinates {
    fn normalize(self) -> Result<Coordinates, CoordinatesError> {
        match self {
            Self::Text(text) => parse_text(&text),
            Self::Pair([lat, lng]) => Coordinates::new(lat, lng),
            Self::Short { lat, lng } => Coordinates::new(lat, lng),
            Self::Long {
                latitude,
                longitude,
            } => Coordinates::new(latitude, longitude),
        }
    }
}

fn parse_text(text: &str) -> Result<Coordinates, CoordinatesError> {
    let inner = text
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);

    let mut parts = inner.split(',').map(str::trim);
    let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CoordinatesError::Malformed(text.to_string()));
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| CoordinatesError::Malformed(text.to_string()))?;
    let lng: f64 = lng
        .parse()
        .map_err(|_| CoordinatesError::Malformed(text.to_string()))?;
    Coordinates::new(lat, lng)
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawCoordinates::deserialize(deserializer)?
            .normalize()
            .map_err(D::Error::custom)
    }
}
