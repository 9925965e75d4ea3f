//! Fact resolution: candidate titles, the lookup loop with its nearby-search
//! fallback, and the Wikipedia client.

pub mod candidates;
pub mod collector;
pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use candidates::candidate_titles;
pub use collector::FactCollector;
pub use providers::{Encyclopedia, WikipediaClient};
pub use resolver::{FactResolver, ResolveSettings};
pub use types::{
    FactCard, LocationResolution, Outcome, PageImage, PageSummary, ResolveError, MAX_FACTS,
    NO_FACT_SUMMARY,
};
