//! Shared HTTP plumbing for the upstream clients (ureq, blocking).

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Failure talking to an upstream API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => Self::Status {
                status,
                url: response.get_url().to_string(),
            },
            ureq::Error::Transport(transport) => Self::Network(transport.to_string()),
        }
    }
}

/// Build an agent with a descriptive User-Agent (required by Nominatim's
/// usage policy) and an optional overall timeout.
pub fn build_agent(user_agent: &str, timeout: Option<Duration>) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Send a GET request and decode the JSON body.
pub(crate) fn get_json<T: DeserializeOwned>(request: ureq::Request) -> Result<T, ClientError> {
    let response = request.call()?;
    response
        .into_json()
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Like [`get_json`], but a 404 is `Ok(None)` rather than an error.
pub(crate) fn get_json_opt<T: DeserializeOwned>(
    request: ureq::Request,
) -> Result<Option<T>, ClientError> {
    match get_json(request) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
