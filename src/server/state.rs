use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::facts::FactResolver;
use crate::location::Locator;
use crate::session::Session;

pub struct AppState {
    pub resolver: FactResolver,
    pub locator: Arc<dyn Locator>,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(resolver: FactResolver, locator: Arc<dyn Locator>) -> Self {
        Self {
            resolver,
            locator,
            session: Mutex::new(Session::new()),
        }
    }

    /// The session survives a panicking handler; its data stays consistent
    /// because every transition is a single assignment.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
