//! The fact collector: accumulates cards across the fallback chain.
//!
//! Chain:  candidate titles → nearby search at each radius → done
//!
//! Each link is an [`Attempt`] run in order; the chain stops as soon as the
//! collector holds its target number of cards. Lookups are strictly
//! sequential, so a full collector never issues another request.

use std::collections::HashSet;

use super::providers::Encyclopedia;
use super::types::FactCard;
use crate::location::Coordinates;

/// One deferred step of the fallback chain.
pub type Attempt<'a> = Box<dyn FnOnce(&mut FactCollector<'a>) + 'a>;

pub struct FactCollector<'a> {
    encyclopedia: &'a dyn Encyclopedia,
    target: usize,
    cards: Vec<FactCard>,
    /// Titles already asked for in this resolution.
    queried: HashSet<String>,
    lookups: usize,
}

impl<'a> FactCollector<'a> {
    pub fn new(encyclopedia: &'a dyn Encyclopedia, target: usize) -> Self {
        Self {
            encyclopedia,
            target,
            cards: Vec::with_capacity(target),
            queried: HashSet::new(),
            lookups: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.target
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Summary lookups issued so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Run attempts in order until the collector is full.
    pub fn run<I>(&mut self, attempts: I)
    where
        I: IntoIterator<Item = Attempt<'a>>,
    {
        for attempt in attempts {
            if self.is_full() {
                break;
            }
            attempt(self);
        }
    }

    /// Look up titles in order, keeping every one that has an extract.
    /// Misses and failures are skipped.
    pub fn collect<I>(&mut self, titles: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for title in titles {
            if self.is_full() {
                break;
            }
            let title: String = title.into();
            if !self.queried.insert(title.clone()) {
                continue;
            }
            self.lookups += 1;
            match self.encyclopedia.summary(&title) {
                Ok(Some(summary)) => {
                    let Some(extract) = summary.extract_text() else {
                        tracing::debug!(%title, "summary has no extract");
                        continue;
                    };
                    let card = FactCard {
                        title: summary.title.clone(),
                        summary: extract.to_string(),
                        image: summary.pick_image().map(str::to_string),
                        link: self.encyclopedia.page_url(&summary.title),
                    };
                    tracing::debug!(%title, canonical = %card.title, "fact found");
                    self.cards.push(card);
                }
                Ok(None) => tracing::debug!(%title, "no such page"),
                Err(e) => tracing::debug!(%title, error = %e, "summary lookup failed"),
            }
        }
    }

    /// One nearby search at `radius_m`, feeding its titles into [`collect`](Self::collect).
    pub fn search_radius(&mut self, at: Coordinates, radius_m: u32, limit: usize) {
        if self.is_full() {
            return;
        }
        match self.encyclopedia.search_nearby(at, radius_m, limit) {
            Ok(titles) => {
                tracing::debug!(radius_m, hits = titles.len(), "nearby search");
                self.collect(titles);
            }
            Err(e) => tracing::debug!(radius_m, error = %e, "nearby search failed"),
        }
    }

    pub fn into_cards(self) -> Vec<FactCard> {
        self.cards
    }
}
