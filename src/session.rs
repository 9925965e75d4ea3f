//! Presentation-side state machine around the resolver.
//!
//! Idle → Locating → Resolving → Ready        (device position)
//! Idle → Resolving → Ready                   (typed place / given coordinates)
//! Locating → Error, Resolving → Error
//!
//! Every trigger gets a fresh [`RequestId`]. Only the latest request may move
//! the session forward; results from a superseded request are dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::facts::{LocationResolution, ResolveError};
use crate::location::LocationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Locating,
    Resolving,
    Ready,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Locating => write!(f, "locating"),
            Self::Resolving => write!(f, "resolving"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Monotonically increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a result made it into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Superseded,
}

impl Delivery {
    pub fn is_superseded(self) -> bool {
        self == Self::Superseded
    }
}

#[derive(Debug)]
pub struct Session {
    last_issued: u64,
    current: Option<RequestId>,
    state: SessionState,
    resolution: Option<LocationResolution>,
    error: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Read-only view of a session, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<LocationResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            last_issued: 0,
            current: None,
            state: SessionState::Idle,
            resolution: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn resolution(&self) -> Option<&LocationResolution> {
        self.resolution.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.current == Some(id)
    }

    /// Start a trigger that must first find the device's position.
    pub fn begin_locating(&mut self) -> RequestId {
        self.begin(SessionState::Locating)
    }

    /// Start a trigger that already knows what to resolve.
    pub fn begin_resolving(&mut self) -> RequestId {
        self.begin(SessionState::Resolving)
    }

    fn begin(&mut self, state: SessionState) -> RequestId {
        self.last_issued += 1;
        let id = RequestId(self.last_issued);
        if let Some(previous) = self.current.filter(|_| self.in_flight()) {
            tracing::debug!(%previous, %id, "superseding in-flight request");
        }
        self.current = Some(id);
        self.resolution = None;
        self.error = None;
        self.transition(state);
        id
    }

    fn in_flight(&self) -> bool {
        matches!(self.state, SessionState::Locating | SessionState::Resolving)
    }

    /// Position found: Locating → Resolving.
    pub fn located(&mut self, id: RequestId) -> Delivery {
        if !self.accepts(id, SessionState::Locating) {
            return Delivery::Superseded;
        }
        self.transition(SessionState::Resolving);
        Delivery::Applied
    }

    /// Position unavailable: Locating → Error.
    pub fn locate_failed(&mut self, id: RequestId, err: &LocationError) -> Delivery {
        if !self.accepts(id, SessionState::Locating) {
            return Delivery::Superseded;
        }
        self.error = Some(err.to_string());
        self.transition(SessionState::Error);
        Delivery::Applied
    }

    /// Resolution finished: Resolving → Ready, or Resolving → Error.
    pub fn finish(
        &mut self,
        id: RequestId,
        result: &Result<LocationResolution, ResolveError>,
    ) -> Delivery {
        if !self.accepts(id, SessionState::Resolving) {
            return Delivery::Superseded;
        }
        match result {
            Ok(resolution) => {
                self.resolution = Some(resolution.clone());
                self.transition(SessionState::Ready);
            }
            Err(err) => {
                self.resolution = Some(LocationResolution::failed(err));
                self.error = Some(err.to_string());
                self.transition(SessionState::Error);
            }
        }
        Delivery::Applied
    }

    fn accepts(&self, id: RequestId, expected: SessionState) -> bool {
        if !self.is_current(id) {
            tracing::debug!(%id, current = ?self.current, "dropping stale result");
            return false;
        }
        if self.state != expected {
            tracing::warn!(%id, state = %self.state, %expected, "unexpected transition");
            return false;
        }
        true
    }

    fn transition(&mut self, to: SessionState) {
        tracing::debug!(from = %self.state, %to, "session transition");
        self.state = to;
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            request_id: self.current,
            resolution: self.resolution.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Outcome;
    use crate::http::ClientError;

    fn resolution(place: &str) -> LocationResolution {
        LocationResolution::assemble(place.into(), None, vec![])
    }

    #[test]
    fn test_manual_path() {
        let mut s = Session::new();
        assert_eq!(s.state(), SessionState::Idle);
        let id = s.begin_resolving();
        assert_eq!(s.state(), SessionState::Resolving);
        assert_eq!(s.finish(id, &Ok(resolution("Prague"))), Delivery::Applied);
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.resolution().unwrap().place_name, "Prague");
    }

    #[test]
    fn test_located_path() {
        let mut s = Session::new();
        let id = s.begin_locating();
        assert_eq!(s.state(), SessionState::Locating);
        assert_eq!(s.located(id), Delivery::Applied);
        assert_eq!(s.state(), SessionState::Resolving);
        s.finish(id, &Ok(resolution("Oslo")));
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn test_locate_failure() {
        let mut s = Session::new();
        let id = s.begin_locating();
        let err = LocationError::PermissionDenied("user said no".into());
        assert_eq!(s.locate_failed(id, &err), Delivery::Applied);
        assert_eq!(s.state(), SessionState::Error);
        assert!(s.error().unwrap().contains("user said no"));
        assert!(s.resolution().is_none());
    }

    #[test]
    fn test_resolve_failure_keeps_placeholder() {
        let mut s = Session::new();
        let id = s.begin_resolving();
        let err = ResolveError::ReverseGeocode(ClientError::Network("timeout".into()));
        s.finish(id, &Err(err));
        assert_eq!(s.state(), SessionState::Error);
        assert_eq!(s.resolution().unwrap().outcome, Outcome::Failed);
        assert!(s.error().unwrap().starts_with("Reverse geocoding failed"));
    }

    #[test]
    fn test_stale_result_dropped() {
        let mut s = Session::new();
        let first = s.begin_resolving();
        let second = s.begin_resolving();
        assert!(second > first);

        assert_eq!(s.finish(second, &Ok(resolution("New"))), Delivery::Applied);
        assert!(s.finish(first, &Ok(resolution("Old"))).is_superseded());
        assert_eq!(s.resolution().unwrap().place_name, "New");
    }

    #[test]
    fn test_stale_result_cannot_finish_newer_request() {
        let mut s = Session::new();
        let first = s.begin_resolving();
        let second = s.begin_locating();
        assert!(s.finish(first, &Ok(resolution("Old"))).is_superseded());
        assert_eq!(s.state(), SessionState::Locating);
        assert!(s.located(first).is_superseded());
        assert_eq!(s.located(second), Delivery::Applied);
    }

    #[test]
    fn test_ready_is_terminal_until_retriggered() {
        let mut s = Session::new();
        let id = s.begin_resolving();
        s.finish(id, &Ok(resolution("A")));
        assert!(s.finish(id, &Ok(resolution("B"))).is_superseded());
        assert_eq!(s.resolution().unwrap().place_name, "A");

        let again = s.begin_resolving();
        assert_eq!(s.state(), SessionState::Resolving);
        assert_eq!(again.get(), 2);
    }

    #[test]
    fn test_retrigger_clears_error() {
        let mut s = Session::new();
        let id = s.begin_locating();
        s.locate_failed(id, &LocationError::PermissionDenied("no".into()));
        s.begin_resolving();
        assert!(s.error().is_none());
    }

    #[test]
    fn test_retrigger_drops_previous_resolution() {
        let mut s = Session::new();
        let first = s.begin_resolving();
        s.finish(first, &Ok(resolution("Old")));

        let second = s.begin_locating();
        assert!(s.resolution().is_none());
        s.locate_failed(second, &LocationError::PermissionDenied("no".into()));

        assert_eq!(s.state(), SessionState::Error);
        assert!(s.resolution().is_none());
        let v = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(v["request_id"], 2);
        assert!(v.get("resolution").is_none());
    }

    #[test]
    fn test_snapshot_json() {
        let mut s = Session::new();
        let id = s.begin_resolving();
        s.finish(id, &Ok(resolution("Lima")));
        let v = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(v["state"], "ready");
        assert_eq!(v["request_id"], 1);
        assert_eq!(v["resolution"]["place_name"], "Lima");
        assert!(v.get("error").is_none());
    }
}
