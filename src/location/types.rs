//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::http::ClientError;

/// Place name used when the geocoder gives us nothing usable.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// A point on Earth. Validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::InvalidCoordinates { lat, lon });
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// Address fields from a reverse geocode. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub display_name: Option<String>,
}

impl Address {
    /// Pick the most specific human-meaningful name.
    ///
    /// Priority: road (with house number) > neighbourhood > suburb > city >
    /// town > village > display name > [`UNKNOWN_LOCATION`].
    pub fn place_name(&self) -> String {
        if let Some(road) = non_empty(&self.road) {
            return match non_empty(&self.house_number) {
                Some(number) => format!("{} {}", number, road),
                None => road.to_string(),
            };
        }

        [
            &self.neighbourhood,
            &self.suburb,
            &self.city,
            &self.town,
            &self.village,
            &self.display_name,
        ]
        .into_iter()
        .find_map(non_empty)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A forward-geocode hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedPlace {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Location errors.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Invalid coordinates ({lat}, {lon}). Lat: -90..90, Lon: -180..180")]
    InvalidCoordinates { lat: f64, lon: f64 },
    /// The caller's position could not be determined (refused, unsupported,
    /// or the locating service failed).
    #[error("Location access denied or unavailable: {0}")]
    PermissionDenied(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        Address::default()
    }

    #[test]
    fn test_road_with_house_number() {
        let a = Address {
            road: Some("Downing Street".into()),
            house_number: Some("10".into()),
            city: Some("London".into()),
            ..addr()
        };
        assert_eq!(a.place_name(), "10 Downing Street");
    }

    #[test]
    fn test_road_without_house_number() {
        let a = Address { road: Some("Rue de Rivoli".into()), suburb: Some("1er".into()), ..addr() };
        assert_eq!(a.place_name(), "Rue de Rivoli");
    }

    #[test]
    fn test_house_number_alone_is_ignored() {
        let a = Address { house_number: Some("12".into()), town: Some("Visby".into()), ..addr() };
        assert_eq!(a.place_name(), "Visby");
    }

    #[test]
    fn test_priority_order() {
        let full = Address {
            neighbourhood: Some("Le Marais".into()),
            suburb: Some("Paris 4e".into()),
            city: Some("Paris".into()),
            town: Some("T".into()),
            village: Some("V".into()),
            display_name: Some("D".into()),
            ..addr()
        };
        assert_eq!(full.place_name(), "Le Marais");
        assert_eq!(Address { neighbourhood: None, ..full.clone() }.place_name(), "Paris 4e");
        assert_eq!(Address { neighbourhood: None, suburb: None, ..full.clone() }.place_name(), "Paris");
        let only_tail = Address { village: Some("Hallstatt".into()), display_name: Some("D".into()), ..addr() };
        assert_eq!(only_tail.place_name(), "Hallstatt");
        let display = Address { display_name: Some("Somewhere, Earth".into()), ..addr() };
        assert_eq!(display.place_name(), "Somewhere, Earth");
    }

    #[test]
    fn test_blank_fields_are_skipped() {
        let a = Address {
            road: Some("   ".into()),
            neighbourhood: Some(String::new()),
            city: Some(" Paris ".into()),
            ..addr()
        };
        assert_eq!(a.place_name(), "Paris");
    }

    #[test]
    fn test_unknown_location() {
        assert_eq!(addr().place_name(), UNKNOWN_LOCATION);
        let blanks = Address { city: Some(" ".into()), display_name: Some(String::new()), ..addr() };
        assert_eq!(blanks.place_name(), "Unknown location");
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(48.8566, 2.3522).is_ok());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(LocationError::InvalidCoordinates { .. })
        ));
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_display() {
        let c = Coordinates::new(59.3293, -18.0686).unwrap();
        assert_eq!(c.to_string(), "59.3293\u{00B0}N, 18.0686\u{00B0}W");
    }
}
