//! Encyclopedia provider: Wikipedia page summaries and geosearch.

use serde::Deserialize;
use url::Url;

use super::types::PageSummary;
use crate::config::Config;
use crate::http::{self, ClientError};
use crate::location::Coordinates;

const DEFAULT_PAGE_URL: &str = "https://en.wikipedia.org/wiki";

/// Title summaries and nearby-title search.
pub trait Encyclopedia: Send + Sync {
    /// Summary for a title. `Ok(None)` when no such page exists.
    fn summary(&self, title: &str) -> Result<Option<PageSummary>, ClientError>;

    /// Titles of pages near a point, nearest first, at most `limit`.
    fn search_nearby(
        &self,
        at: Coordinates,
        radius_m: u32,
        limit: usize,
    ) -> Result<Vec<String>, ClientError>;

    /// Canonical link for a page title.
    fn page_url(&self, title: &str) -> Option<String> {
        page_url(DEFAULT_PAGE_URL, title)
    }
}

/// `https://en.wikipedia.org/wiki/Eiffel_Tower` from "Eiffel Tower".
pub fn page_url(base: &str, title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let mut url = Url::parse(base).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(&title.replace(' ', "_"));
    Some(url.into())
}

#[derive(Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    query: Option<GeoSearchQuery>,
}

#[derive(Deserialize)]
struct GeoSearchQuery {
    #[serde(default)]
    geosearch: Vec<GeoSearchHit>,
}

#[derive(Deserialize)]
struct GeoSearchHit {
    title: String,
}

/// English Wikipedia client (REST summaries, action API geosearch).
pub struct WikipediaClient {
    agent: ureq::Agent,
    rest_url: String,
    api_url: String,
    page_url: String,
}

impl WikipediaClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: http::build_agent(&config.user_agent, config.request_timeout()),
            rest_url: config.wikipedia_rest_url.clone(),
            api_url: config.wikipedia_api_url.clone(),
            page_url: config.wikipedia_page_url.clone(),
        }
    }

    fn summary_url(&self, title: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.rest_url)
            .map_err(|e| ClientError::InvalidResponse(format!("bad REST url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidResponse("REST url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["page", "summary", title]);
        Ok(url)
    }
}

impl Encyclopedia for WikipediaClient {
    fn summary(&self, title: &str) -> Result<Option<PageSummary>, ClientError> {
        let url = self.summary_url(title)?;
        http::get_json_opt(self.agent.get(url.as_str()))
    }

    fn search_nearby(
        &self,
        at: Coordinates,
        radius_m: u32,
        limit: usize,
    ) -> Result<Vec<String>, ClientError> {
        let request = self
            .agent
            .get(&self.api_url)
            .query("action", "query")
            .query("list", "geosearch")
            .query("gscoord", &format!("{}|{}", at.lat, at.lon))
            .query("gsradius", &radius_m.to_string())
            .query("gslimit", &limit.to_string())
            .query("format", "json");

        let response: GeoSearchResponse = http::get_json(request)?;
        Ok(geosearch_titles(response, limit))
    }

    fn page_url(&self, title: &str) -> Option<String> {
        page_url(&self.page_url, title)
    }
}

fn geosearch_titles(response: GeoSearchResponse, limit: usize) -> Vec<String> {
    response
        .query
        .map(|q| q.geosearch)
        .unwrap_or_default()
        .into_iter()
        .map(|hit| hit.title)
        .take(limit)
        .collect()
}
