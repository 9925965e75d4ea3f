//! In-memory clients that record every call.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::providers::Encyclopedia;
use super::types::{PageImage, PageSummary};
use crate::http::ClientError;
use crate::location::{Address, Coordinates, GeocodedPlace, Geocoder};

enum FakePage {
    Summary(PageSummary),
    Fail,
}

#[derive(Default)]
pub struct FakeEncyclopedia {
    pages: HashMap<String, FakePage>,
    nearby: HashMap<u32, Vec<String>>,
    failing_searches: HashSet<u32>,
    summary_calls: Mutex<Vec<String>>,
    search_calls: Mutex<Vec<u32>>,
}

impl FakeEncyclopedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose canonical title is the title asked for.
    pub fn page(self, title: &str, extract: &str) -> Self {
        self.redirect(title, title, extract)
    }

    /// Asking for `query` returns the page `canonical`.
    pub fn redirect(mut self, query: &str, canonical: &str, extract: &str) -> Self {
        let summary = PageSummary {
            title: canonical.to_string(),
            extract: Some(extract.to_string()),
            originalimage: None,
            thumbnail: None,
        };
        self.pages.insert(query.to_string(), FakePage::Summary(summary));
        self
    }

    pub fn with_image(mut self, canonical: &str, original: Option<&str>, thumbnail: Option<&str>) -> Self {
        for page in self.pages.values_mut() {
            if let FakePage::Summary(s) = page {
                if s.title == canonical {
                    s.originalimage = original.map(|src| PageImage { source: src.to_string() });
                    s.thumbnail = thumbnail.map(|src| PageImage { source: src.to_string() });
                }
            }
        }
        self
    }

    /// Looking up `title` fails with a network error.
    pub fn failing(mut self, title: &str) -> Self {
        self.pages.insert(title.to_string(), FakePage::Fail);
        self
    }

    pub fn nearby(mut self, radius_m: u32, titles: &[&str]) -> Self {
        self.nearby.insert(radius_m, titles.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn failing_search(mut self, radius_m: u32) -> Self {
        self.failing_searches.insert(radius_m);
        self
    }

    pub fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<u32> {
        self.search_calls.lock().unwrap().clone()
    }
}

impl Encyclopedia for FakeEncyclopedia {
    fn summary(&self, title: &str) -> Result<Option<PageSummary>, ClientError> {
        self.summary_calls.lock().unwrap().push(title.to_string());
        match self.pages.get(title) {
            Some(FakePage::Summary(s)) => Ok(Some(s.clone())),
            Some(FakePage::Fail) => Err(ClientError::Network("connection reset".into())),
            None => Ok(None),
        }
    }

    fn search_nearby(&self, _at: Coordinates, radius_m: u32, limit: usize) -> Result<Vec<String>, ClientError> {
        self.search_calls.lock().unwrap().push(radius_m);
        if self.failing_searches.contains(&radius_m) {
            return Err(ClientError::Status { status: 503, url: "https://wiki.test/w/api.php".into() });
        }
        let titles = self.nearby.get(&radius_m).cloned().unwrap_or_default();
        Ok(titles.into_iter().take(limit).collect())
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    address: Option<Address>,
    places: HashMap<String, GeocodedPlace>,
    fail: bool,
    reverse_calls: Mutex<Vec<Coordinates>>,
    forward_calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reverse geocode returns this address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn place(mut self, query: &str, display_name: &str, lat: f64, lon: f64) -> Self {
        let place = GeocodedPlace {
            coordinates: Coordinates::new(lat, lon).unwrap(),
            display_name: display_name.to_string(),
        };
        self.places.insert(query.to_string(), place);
        self
    }

    /// Every call fails with a network error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn reverse_calls(&self) -> Vec<Coordinates> {
        self.reverse_calls.lock().unwrap().clone()
    }

    pub fn forward_calls(&self) -> Vec<String> {
        self.forward_calls.lock().unwrap().clone()
    }
}

impl Geocoder for FakeGeocoder {
    fn reverse_geocode(&self, at: Coordinates) -> Result<Address, ClientError> {
        self.reverse_calls.lock().unwrap().push(at);
        if self.fail {
            return Err(ClientError::Network("dns error".into()));
        }
        Ok(self.address.clone().unwrap_or_default())
    }

    fn forward_geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, ClientError> {
        self.forward_calls.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ClientError::Network("dns error".into()));
        }
        Ok(self.places.get(query).cloned())
    }
}
