//! Location subsystem for LocalLens.
//!
//! Coordinates, address fields and place-name selection, plus the
//! Nominatim geocoder and the IP locator behind narrow traits.

pub mod providers;
pub mod types;

pub use providers::{Geocoder, IpLocator, Locator, NominatimClient};
pub use types::{Address, Coordinates, GeocodedPlace, LocationError, UNKNOWN_LOCATION};
