//! HTTP Endpoints
//!
//! REST API for the design mentor.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use design_mentor_agent::{
    AgentError, AskRequest, GroundedAnswer, ProfileUpdate, SearchAnswer, SearchRequest,
};
use design_mentor_core::{SessionAnalytics, UserSession};

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";
/// Upper bound per request; covers a chat call with all its retries
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );

    Router::new()
        // Conversation
        .route("/api/ask", post(ask))
        .route("/api/search", post(search))
        .route("/api/preview", post(preview))
        .route("/api/trending", get(trending))
        // Users
        .route("/api/users/:user_id", get(get_user))
        .route("/api/users/:user_id/analytics", get(get_analytics))
        .route("/api/users/:user_id/tips", get(get_tips))
        .route("/api/users/:user_id/suggestions", get(get_suggestions))
        .route("/api/users/:user_id/profile", post(update_profile))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer
/// - If cors_origins is empty or all invalid, allows localhost:3000 only
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let mut parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        parsed.push(HeaderValue::from_static(DEFAULT_ORIGIN));
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

fn outcome<T>(result: &Result<T, AgentError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AgentError::Busy { .. }) => "busy",
        Err(AgentError::InvalidInput(_)) => "invalid",
        Err(_) => "error",
    }
}

/// General design question
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<GroundedAnswer>, ServerError> {
    let start = Instant::now();
    let result = state.assistant.ask(&request).await;
    record_request("ask", outcome(&result), start.elapsed());
    Ok(Json(result?))
}

/// Retrieval-grounded search
async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchAnswer>, ServerError> {
    let start = Instant::now();
    let result = state.assistant.search(&request).await;
    record_request("search", outcome(&result), start.elapsed());
    Ok(Json(result?))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    user_id: String,
    question: String,
    #[serde(default)]
    command_type: String,
}

/// How a question would be framed at each expertise level
async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if request.user_id.trim().is_empty() || request.question.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "user_id and question are required".to_string(),
        ));
    }
    let previews = state
        .assistant
        .preview(&request.question, &request.command_type, &request.user_id);
    Ok(Json(serde_json::json!({ "previews": previews })))
}

async fn trending(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "trending": state.assistant.trending() }))
}

async fn get_user(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<UserSession> {
    Json(state.assistant.session(&user_id))
}

async fn get_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<SessionAnalytics> {
    Json(state.assistant.analytics(&user_id))
}

async fn get_tips(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tips": state.assistant.tips(&user_id) }))
}

#[derive(Debug, Default, Deserialize)]
struct SuggestionQuery {
    #[serde(default)]
    q: String,
}

async fn get_suggestions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<SuggestionQuery>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "suggestions": state.assistant.suggestions(&user_id, &query.q),
    }))
}

/// Onboarding and preference edits
async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserSession>, ServerError> {
    let session = state.assistant.update_profile(&user_id, &update)?;
    Ok(Json(session))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let passages = state.assistant.passage_count();
    let status = if passages > 0 { "healthy" } else { "degraded" };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "passages": {
                    "status": if passages > 0 { "ok" } else { "empty" },
                    "count": passages,
                },
                "api_key": {
                    "status": if state.config.api.api_key.is_some() { "ok" } else { "missing" },
                },
            },
        })),
    )
}
