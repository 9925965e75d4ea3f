//! Fact resolver: orchestrates the fallback chain.
//!
//! Coordinates flow:  reverse geocode → place name → candidate titles → nearby radii
//! Query flow:        forward geocode → candidate titles from the query → nearby radii (if a hit)

use std::sync::Arc;

use super::candidates::candidate_titles;
use super::collector::{Attempt, FactCollector};
use super::providers::{Encyclopedia, WikipediaClient};
use super::types::{LocationResolution, ResolveError, MAX_FACTS};
use crate::config::Config;
use crate::location::{Coordinates, Geocoder, NominatimClient};

/// Tunables for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveSettings {
    /// Nearby-search radii in meters, smallest first.
    pub radii_m: Vec<u32>,
    pub search_limit: usize,
    pub max_facts: usize,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            radii_m: vec![300, 600, 1200],
            search_limit: 10,
            max_facts: MAX_FACTS,
        }
    }
}

/// Turns coordinates or a free-text place into a [`LocationResolution`].
///
/// Holds no state between calls; every resolution starts from scratch.
#[derive(Clone)]
pub struct FactResolver {
    geocoder: Arc<dyn Geocoder>,
    encyclopedia: Arc<dyn Encyclopedia>,
    settings: ResolveSettings,
}

impl FactResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, encyclopedia: Arc<dyn Encyclopedia>) -> Self {
        Self {
            geocoder,
            encyclopedia,
            settings: ResolveSettings::default(),
        }
    }

    /// Nominatim + Wikipedia, configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(NominatimClient::new(config)),
            Arc::new(WikipediaClient::new(config)),
        )
        .with_settings(config.resolve_settings())
    }

    pub fn with_settings(mut self, settings: ResolveSettings) -> Self {
        self.settings = ResolveSettings {
            max_facts: settings.max_facts.clamp(1, MAX_FACTS),
            ..settings
        };
        self
    }

    pub fn settings(&self) -> &ResolveSettings {
        &self.settings
    }

    /// Resolve facts for a point (e.g. the device's position).
    pub fn resolve_from_coordinates(
        &self,
        at: Coordinates,
    ) -> Result<LocationResolution, ResolveError> {
        let address = self
            .geocoder
            .reverse_geocode(at)
            .map_err(ResolveError::ReverseGeocode)?;
        let place_name = address.place_name();
        tracing::info!(%at, place = %place_name, "resolving facts");

        let titles = candidate_titles(&place_name);
        Ok(self.resolve_titles(place_name, titles, Some(at)))
    }

    /// Resolve facts for a place typed by the user.
    pub fn resolve_from_query(&self, text: &str) -> Result<LocationResolution, ResolveError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let hit = self
            .geocoder
            .forward_geocode(query)
            .map_err(|source| ResolveError::ForwardGeocode {
                query: query.to_string(),
                source,
            })?;

        let (place_name, at) = match hit {
            Some(place) => (place.display_name, Some(place.coordinates)),
            None => {
                tracing::debug!(%query, "no geocoder hit; skipping nearby search");
                (query.to_string(), None)
            }
        };
        tracing::info!(%query, place = %place_name, "resolving facts");

        // The user's own wording is a better title than the geocoder's
        // long display name.
        let titles = candidate_titles(query);
        Ok(self.resolve_titles(place_name, titles, at))
    }

    fn resolve_titles(
        &self,
        place_name: String,
        titles: Vec<String>,
        at: Option<Coordinates>,
    ) -> LocationResolution {
        let mut collector = FactCollector::new(self.encyclopedia.as_ref(), self.settings.max_facts);

        let mut attempts: Vec<Attempt> = Vec::with_capacity(1 + self.settings.radii_m.len());
        attempts.push(Box::new(move |c: &mut FactCollector| c.collect(titles)));
        if let Some(at) = at {
            let limit = self.settings.search_limit;
            for &radius_m in &self.settings.radii_m {
                attempts.push(Box::new(move |c: &mut FactCollector| {
                    c.search_radius(at, radius_m, limit)
                }));
            }
        }
        collector.run(attempts);

        tracing::info!(
            place = %place_name,
            facts = collector.len(),
            lookups = collector.lookups(),
            "resolution complete"
        );
        LocationResolution::assemble(place_name, at, collector.into_cards())
    }
}
