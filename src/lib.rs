//! LocalLens: a fun fact and a photo about wherever you are.
//!
//! Coordinates (or a free-text place) are reverse/forward geocoded through
//! Nominatim, turned into candidate encyclopedia titles, and resolved against
//! Wikipedia with an escalating nearby-search fallback.

pub mod config;
pub mod facts;
pub mod http;
pub mod location;
pub mod server;
pub mod session;

pub use config::{Config, ConfigError};
pub use facts::{FactCard, FactResolver, LocationResolution, Outcome, ResolveError};
pub use location::{Address, Coordinates, LocationError};
pub use session::{Delivery, RequestId, Session, SessionState};
