//! Runtime configuration: upstream endpoints, search radii, timeouts.
//!
//! Read from `--config <path>` or `~/.config/locallens/config.json` (platform
//! config dir). A missing default file means defaults; every field is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::facts::{ResolveSettings, MAX_FACTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nominatim_url: String,
    pub wikipedia_rest_url: String,
    pub wikipedia_api_url: String,
    pub wikipedia_page_url: String,
    pub ipapi_url: String,
    pub user_agent: String,
    /// Nearby-search radii in meters, tried in order.
    pub search_radii_m: Vec<u32>,
    /// Hits requested per nearby search.
    pub search_limit: usize,
    pub max_facts: usize,
    /// Timeout for geocoder and encyclopedia calls. None = wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub locate_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            wikipedia_rest_url: "https://en.wikipedia.org/api/rest_v1".into(),
            wikipedia_api_url: "https://en.wikipedia.org/w/api.php".into(),
            wikipedia_page_url: "https://en.wikipedia.org/wiki".into(),
            ipapi_url: "https://ipapi.co/json/".into(),
            user_agent: concat!("LocalLens/", env!("CARGO_PKG_VERSION"), " (location-facts)").into(),
            search_radii_m: vec![300, 600, 1200],
            search_limit: 10,
            max_facts: MAX_FACTS,
            request_timeout_secs: None,
            locate_timeout_secs: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Load from an explicit path (must exist), or from the default path if
    /// one exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("locallens").join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_radii_m.is_empty() {
            return Err(ConfigError::Invalid("search_radii_m must not be empty".into()));
        }
        if self.search_radii_m.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(format!(
                "search_radii_m must be strictly ascending, got {:?}",
                self.search_radii_m
            )));
        }
        if self.search_limit == 0 {
            return Err(ConfigError::Invalid("search_limit must be at least 1".into()));
        }
        if !(1..=MAX_FACTS).contains(&self.max_facts) {
            return Err(ConfigError::Invalid(format!(
                "max_facts must be between 1 and {}, got {}",
                MAX_FACTS, self.max_facts
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.locate_timeout_secs)
    }

    pub fn resolve_settings(&self) -> ResolveSettings {
        ResolveSettings {
            radii_m: self.search_radii_m.clone(),
            search_limit: self.search_limit,
            max_facts: self.max_facts,
        }
    }
}

/// Parse a `--radii 300,600,1200` argument.
pub fn parse_radii(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid radius '{}': {}", part.trim(), e))
        })
        .collect()
}
