pub mod config;
pub mod handlers;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use waflens_auth::{AuthError, IdentityProvider, Session};
use waflens_core::{AiSettings, Store};
use waflens_query::QueryClient;

/// Shared service state. Opened once at startup; handlers read through it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub query: QueryClient,
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub ai: AiSettings,
}

impl AppState {
    pub fn new(store: Arc<Store>, identity: Option<Arc<dyn IdentityProvider>>, ai: AiSettings) -> AppState {
        AppState {
            query: QueryClient::new(Arc::clone(&store)),
            store,
            identity,
            ai,
        }
    }
}

/// JSON error response, FastAPI-shaped: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> ApiError {
        ApiError {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn forbidden(detail: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::FORBIDDEN, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn bad_gateway(detail: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::BAD_GATEWAY, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

/// Resolve the request's bearer token into a session.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let identity = state
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::internal(AuthError::NotConfigured.to_string()))?;

    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authentication credentials"))?;

    identity
        .verify_token(token)
        .await
        .map_err(|e| ApiError::unauthorized(format!("Authentication failed: {}", e)))
}

async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let session = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

async fn request_log(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!(%method, path, status = %response.status(), "http request");
    response
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/pillars/{id}/controls", get(handlers::pillar_controls))
        .route("/api/v1/recommendations", get(handlers::list_recommendations))
        .route(
            "/api/v1/assessments",
            get(handlers::list_assessments).post(handlers::create_assessment),
        )
        .route(
            "/api/v1/assessments/{id}",
            get(handlers::get_assessment).patch(handlers::update_assessment),
        )
        .layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(handlers::root_health))
        .route("/health", get(handlers::health))
        .route("/api/docs", get(handlers::api_schemas))
        .route("/api/v1/pillars", get(handlers::list_pillars))
        .route("/api/v1/pillars/{id}", get(handlers::get_pillar))
        // No auth enforcement on the advisory endpoints yet; when an auth
        // policy lands they move into the protected router.
        .route("/api/v1/ai/chat", post(handlers::ai_chat))
        .route("/api/v1/ai/analyze", post(handlers::ai_analyze))
        .merge(protected)
        .layer(from_fn(request_log))
        .with_state(state)
}
