use crate::config::{Config, StreamConfig};
use crate::db::Db;
use crate::error::{LexrelError, Result};
use crate::graph::{get_graph, relation_stats, GraphQuery};
use crate::tasks::{status_feed, TaskManager};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Set by the upstream authentication gateway
pub const USER_HEADER: &str = "x-user-id";

/// HTTP server exposing generation control and graph queries
pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
    allowed_origins: Vec<String>,
}

impl HttpServer {
    pub fn new(config: &Config, db: Db, tasks: TaskManager) -> Self {
        Self {
            state: AppState { tasks, db, stream: config.stream.clone() },
            host: config.http_server.host.clone(),
            port: config.http_server.port,
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Serve until the process is stopped
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            LexrelError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {} (set http_server.port in config.toml)", addr, e),
            ))
        })?;

        log::info!("Starting HTTP server on http://{}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| {
                LexrelError::Io(std::io::Error::other(format!("HTTP server error: {}", e)))
            })?;

        Ok(())
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.allowed_origins)
    }
}

fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    // No configured origins: allow any (local development)
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> =
            allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/relations/generate", post(handle_start))
        .route("/api/relations/generate/stop", post(handle_stop))
        .route("/api/relations/generate/status", get(handle_status))
        .route("/api/relations/generate/progress", get(handle_progress))
        .route("/api/relations/graph", get(handle_graph))
        .route("/api/relations/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    tasks: TaskManager,
    db: Db,
    stream: StreamConfig,
}

/// `{success, data, message}`
#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(Envelope { success: true, data: Some(data), message: message.into() }),
    )
        .into_response()
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<LexrelError> for ApiError {
    fn from(err: LexrelError) -> Self {
        let status = match &err {
            LexrelError::UnknownRelationType(_) | LexrelError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            LexrelError::WordNotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                log::error!("Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope { success: false, data: None, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Identity set by the authentication gateway
fn user_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::new(StatusCode::UNAUTHORIZED, format!("Missing {} header", USER_HEADER))
        })
}

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    relation_type: Option<String>,
}

fn requested_type(body: &[u8]) -> ApiResult<String> {
    let request: GenerateRequest = if body.is_empty() {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)))?
    };
    request
        .relation_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "relation_type is required"))
}

async fn handle_start(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let user = user_id(&headers)?;
    let relation_type = requested_type(&body)?;

    if state.tasks.start(&relation_type, &user)? {
        Ok(success(
            json!({ "relation_type": relation_type }),
            format!("{} generation started", relation_type),
        ))
    } else {
        let message = format!("{} generation is already running", relation_type);
        Err(ApiError::new(StatusCode::CONFLICT, message))
    }
}

async fn handle_stop(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let user = user_id(&headers)?;
    let relation_type = requested_type(&body)?;

    if state.tasks.stop(&relation_type, &user)? {
        Ok(success(
            json!({ "relation_type": relation_type }),
            format!("Stopping {} generation", relation_type),
        ))
    } else {
        let message = format!("{} generation is not running", relation_type);
        Err(ApiError::new(StatusCode::BAD_REQUEST, message))
    }
}

async fn handle_status(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user = user_id(&headers)?;
    Ok(success(state.tasks.status(&user), "Generation status retrieved successfully"))
}

/// Server-sent events: `progress`, `completed`, `stopped`, `error`, then `done`
async fn handle_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let user = user_id(&headers)?;
    log::debug!("Status stream opened for user {}", user);

    let (poll, idle) = (state.stream.poll_interval(), state.stream.idle_timeout());
    let events = status_feed(state.tasks.clone(), user, poll, idle)
        .map(|event| {
            let sse = Event::default().event(event.name()).data(event.data().to_string());
            Ok::<Event, Infallible>(sse)
        });

    let keepalive = KeepAlive::new().interval(Duration::from_secs(15)).text("ping");
    Ok(Sse::new(events).keep_alive(keepalive))
}

#[derive(Debug, Deserialize)]
struct GraphParams {
    relation_types: Option<String>,
    word_id: Option<i64>,
    max_depth: Option<usize>,
}

async fn handle_graph(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GraphParams>,
) -> ApiResult<Response> {
    let user = user_id(&headers)?;
    let query =
        GraphQuery::parse(params.relation_types.as_deref(), params.word_id, params.max_depth)?;
    let graph = get_graph(&state.db, &user, &query).await?;
    Ok(success(graph, "Relations graph retrieved successfully"))
}

async fn handle_stats(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user = user_id(&headers)?;
    let stats = relation_stats(&state.db, &user).await?;
    Ok(success(stats, "Relation stats retrieved successfully"))
}

async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "lexrel",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}
