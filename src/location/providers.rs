//! Location providers: Nominatim geocoding and IP-based geolocation.

use serde::Deserialize;

use super::types::{Address, Coordinates, GeocodedPlace, LocationError};
use crate::config::Config;
use crate::http::{self, ClientError};

/// Reverse and forward geocoding.
pub trait Geocoder: Send + Sync {
    /// Coordinates → address fields.
    fn reverse_geocode(&self, at: Coordinates) -> Result<Address, ClientError>;

    /// Free text → best single hit, if any.
    fn forward_geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, ClientError>;
}

/// Determines where the caller currently is.
pub trait Locator: Send + Sync {
    fn locate(&self) -> Result<Coordinates, LocationError>;
}

// ─── Nominatim provider ─────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Address,
    /// Set instead of an address when Nominatim has nothing at the point.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// OpenStreetMap Nominatim client.
pub struct NominatimClient {
    agent: ureq::Agent,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(&config.user_agent, config.request_timeout()),
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Geocoder for NominatimClient {
    fn reverse_geocode(&self, at: Coordinates) -> Result<Address, ClientError> {
        let request = self
            .agent
            .get(&format!("{}/reverse", self.base_url))
            .query("format", "json")
            .query("lat", &at.lat.to_string())
            .query("lon", &at.lon.to_string())
            .query("addressdetails", "1")
            .query("zoom", "18");

        let response: ReverseResponse = http::get_json(request)?;
        if let Some(reason) = response.error {
            tracing::debug!(%at, %reason, "nominatim has no address here");
            return Ok(Address::default());
        }
        Ok(Address {
            display_name: response.display_name,
            ..response.address
        })
    }

    fn forward_geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, ClientError> {
        let request = self
            .agent
            .get(&format!("{}/search", self.base_url))
            .query("format", "json")
            .query("q", query)
            .query("limit", "1");

        let results: Vec<SearchResult> = http::get_json(request)?;
        results.into_iter().next().map(|hit| search_hit_to_place(hit, query)).transpose()
    }
}

fn search_hit_to_place(hit: SearchResult, query: &str) -> Result<GeocodedPlace, ClientError> {
    let lat: f64 = hit
        .lat
        .parse()
        .map_err(|_| ClientError::InvalidResponse(format!("bad latitude '{}'", hit.lat)))?;
    let lon: f64 = hit
        .lon
        .parse()
        .map_err(|_| ClientError::InvalidResponse(format!("bad longitude '{}'", hit.lon)))?;
    let coordinates =
        Coordinates::new(lat, lon).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    let display_name = hit
        .display_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| query.to_string());

    Ok(GeocodedPlace { coordinates, display_name })
}

// ─── IP-based geolocation ───────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Locates the caller from their public IP (ipapi.co).
pub struct IpLocator {
    agent: ureq::Agent,
    url: String,
}

impl IpLocator {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(&config.user_agent, Some(config.locate_timeout())),
            url: config.ipapi_url.clone(),
        }
    }
}

impl Locator for IpLocator {
    fn locate(&self) -> Result<Coordinates, LocationError> {
        let result: IpApiResult = http::get_json(self.agent.get(&self.url))
            .map_err(|e| LocationError::PermissionDenied(e.to_string()))?;
        ip_result_to_coordinates(result)
    }
}

fn ip_result_to_coordinates(r: IpApiResult) -> Result<Coordinates, LocationError> {
    if r.error {
        let reason = r.reason.unwrap_or_else(|| "lookup refused".into());
        return Err(LocationError::PermissionDenied(reason));
    }
    match (r.latitude, r.longitude) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
        _ => Err(LocationError::PermissionDenied("no position in response".into())),
    }
}
