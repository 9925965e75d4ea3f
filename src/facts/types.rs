//! Fact cards, resolutions, and encyclopedia payloads.

use serde::{Deserialize, Serialize};

use crate::http::ClientError;
use crate::location::{Coordinates, UNKNOWN_LOCATION};

/// Upper bound on facts in one resolution.
pub const MAX_FACTS: usize = 3;

pub const NO_FACT_SUMMARY: &str = "No interesting fact found for this location.";
pub const LOCATION_FAILED_SUMMARY: &str = "Unable to fetch location details at the moment.";
pub const QUERY_FAILED_SUMMARY: &str = "Unable to fetch data for the specified place.";

/// One fact about a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCard {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FactCard {
    fn placeholder(title: &str, summary: &str) -> Self {
        Self {
            title: title.to_string(),
            summary: summary.to_string(),
            image: None,
            link: None,
        }
    }
}

/// How a resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one real fact.
    Found,
    /// Every lookup came back empty; one placeholder card.
    NotFound,
    /// The pipeline itself failed; one placeholder card.
    Failed,
}

/// The place name plus up to [`MAX_FACTS`] cards, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResolution {
    pub place_name: String,
    pub facts: Vec<FactCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub outcome: Outcome,
}

impl LocationResolution {
    /// Assemble a resolution from collected cards. No cards means the
    /// "no fact found" placeholder.
    pub fn assemble(
        place_name: String,
        coordinates: Option<Coordinates>,
        mut cards: Vec<FactCard>,
    ) -> Self {
        if cards.is_empty() {
            let facts = vec![FactCard::placeholder(&place_name, NO_FACT_SUMMARY)];
            return Self { place_name, facts, coordinates, outcome: Outcome::NotFound };
        }
        cards.truncate(MAX_FACTS);
        Self { place_name, facts: cards, coordinates, outcome: Outcome::Found }
    }

    /// Placeholder for a pipeline failure, for presentation layers that
    /// render errors as a card.
    pub fn failed(err: &ResolveError) -> Self {
        let (place_name, summary) = match err {
            ResolveError::ReverseGeocode(_) => (UNKNOWN_LOCATION.to_string(), LOCATION_FAILED_SUMMARY),
            ResolveError::ForwardGeocode { query, .. } => (query.clone(), QUERY_FAILED_SUMMARY),
            ResolveError::EmptyQuery => (UNKNOWN_LOCATION.to_string(), QUERY_FAILED_SUMMARY),
        };
        let facts = vec![FactCard::placeholder(&place_name, summary)];
        Self { place_name, facts, coordinates: None, outcome: Outcome::Failed }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == Outcome::Found
    }
}

/// Top-level resolution failures. Per-title lookup misses never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No place name given")]
    EmptyQuery,
    #[error("Reverse geocoding failed: {0}")]
    ReverseGeocode(#[source] ClientError),
    #[error("Place search for '{query}' failed: {source}")]
    ForwardGeocode { query: String, source: ClientError },
}

// ─── Encyclopedia payloads ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageImage {
    pub source: String,
}

/// A page summary as returned by the Wikipedia REST API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageSummary {
    /// Canonical title; may differ from the title that was asked for.
    pub title: String,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub originalimage: Option<PageImage>,
    #[serde(default)]
    pub thumbnail: Option<PageImage>,
}

impl PageSummary {
    /// The extract, if it carries any text.
    pub fn extract_text(&self) -> Option<&str> {
        self.extract.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Full-size image first, then the thumbnail.
    pub fn pick_image(&self) -> Option<&str> {
        [&self.originalimage, &self.thumbnail]
            .into_iter()
            .flatten()
            .map(|img| img.source.as_str())
            .find(|src| !src.is_empty())
    }
}
