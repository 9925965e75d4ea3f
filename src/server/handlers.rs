use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::facts::{LocationResolution, ResolveError};
use crate::location::Coordinates;
use crate::session::{RequestId, SessionSnapshot};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
    /// Placeholder card for clients that render failures inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<LocationResolution>,
}

pub(super) struct ApiError {
    status: StatusCode,
    message: String,
    resolution: Option<LocationResolution>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), resolution: None }
    }

    fn from_resolve(err: &ResolveError) -> Self {
        let status = match err {
            ResolveError::EmptyQuery => StatusCode::BAD_REQUEST,
            ResolveError::ReverseGeocode(_) | ResolveError::ForwardGeocode { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            message: err.to_string(),
            resolution: Some(LocationResolution::failed(err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            code: self.status.as_u16(),
            resolution: self.resolution,
        };
        (self.status, Json(body)).into_response()
    }
}

// ─── GET /health ─────────────────────────────────────────────────

pub(super) async fn health() -> &'static str {
    "ok"
}

// ─── GET /api/facts ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FactsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct FactsResponse {
    pub request_id: RequestId,
    /// A newer request started before this one finished; the session kept
    /// the newer state.
    pub superseded: bool,
    #[serde(flatten)]
    pub resolution: LocationResolution,
}

enum Target {
    Point(Coordinates),
    Place(String),
}

impl Target {
    fn from_params(params: FactsQuery) -> Result<Self, ApiError> {
        match (params.lat, params.lon, params.query) {
            (Some(lat), Some(lon), _) => Coordinates::new(lat, lon)
                .map(Self::Point)
                .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string())),
            (None, None, Some(q)) if !q.trim().is_empty() => Ok(Self::Place(q.trim().to_string())),
            (Some(_), None, _) | (None, Some(_), _) => Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Both 'lat' and 'lon' are required",
            )),
            _ => Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Provide 'lat' and 'lon', or a non-empty 'query'",
            )),
        }
    }
}

pub(super) async fn facts(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FactsQuery>, QueryRejection>,
) -> Result<Json<FactsResponse>, ApiError> {
    let start = Instant::now();
    let Query(params) =
        params.map_err(|rejection| ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    let target = Target::from_params(params)?;

    let id = state.session().begin_resolving();
    let result = resolve_blocking(&state, target).await?;
    let response = finish(&state, id, result)?;

    tracing::info!(
        request = %id,
        place = %response.resolution.place_name,
        facts = response.resolution.facts.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/facts"
    );
    Ok(Json(response))
}

// ─── GET /api/locate ─────────────────────────────────────────────

pub(super) async fn locate(State(state): State<Arc<AppState>>) -> Result<Json<FactsResponse>, ApiError> {
    let start = Instant::now();
    let id = state.session().begin_locating();

    let locator = Arc::clone(&state.locator);
    let located = tokio::task::spawn_blocking(move || locator.locate())
        .await
        .map_err(join_error)?;

    let at = match located {
        Ok(at) => at,
        Err(err) => {
            state.session().locate_failed(id, &err);
            tracing::warn!(request = %id, error = %err, "locate failed");
            return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()));
        }
    };
    state.session().located(id);

    let result = resolve_blocking(&state, Target::Point(at)).await?;
    let response = finish(&state, id, result)?;

    tracing::info!(
        request = %id,
        %at,
        place = %response.resolution.place_name,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/locate"
    );
    Ok(Json(response))
}

// ─── GET /api/session ────────────────────────────────────────────

pub(super) async fn session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session().snapshot())
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Run a resolution on the blocking pool; the upstream clients block.
async fn resolve_blocking(
    state: &Arc<AppState>,
    target: Target,
) -> Result<Result<LocationResolution, ResolveError>, ApiError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || match target {
        Target::Point(at) => state.resolver.resolve_from_coordinates(at),
        Target::Place(query) => state.resolver.resolve_from_query(&query),
    })
    .await
    .map_err(join_error)
}

fn finish(
    state: &AppState,
    id: RequestId,
    result: Result<LocationResolution, ResolveError>,
) -> Result<FactsResponse, ApiError> {
    let delivery = state.session().finish(id, &result);
    match result {
        Ok(resolution) => Ok(FactsResponse {
            request_id: id,
            superseded: delivery.is_superseded(),
            resolution,
        }),
        Err(err) => {
            tracing::warn!(request = %id, error = %err, "resolution failed");
            Err(ApiError::from_resolve(&err))
        }
    }
}

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("resolver task failed: {}", err),
    )
}
