//! HTTP API over the resolver (feature `server`).
//!
//! All routes are `GET` and answer JSON:
//!
//! - `/health`: service status
//! - `/knowledge-graph/task-data?entity_type=&startswith=&contains=&format=`
//! - `/knowledge-graph/roles?class_uri=&startswith=&contains=&format=`
//! - `/knowledge-graph/hazards?startswith=&contains=&format=`
//! - `/knowledge-graph/classes`
//! - `/knowledge-graph/instances?class_uri=&startswith=&contains=`
//! - `/knowledge-graph/sparql?query=`: raw pass-through
//! - `/knowledge-graph/tasks`: static task catalog
//!
//! Engine calls block, so every handler runs its query on tokio's blocking pool.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::browse;
use crate::config::ServiceConfig;
use crate::endpoint::SparqlEndpoint;
use crate::error::{ConfigError, KgError, KgResult};
use crate::resolve::{Candidate, LabelFilter, Resolution, Resolver};
use crate::sparql::{self, Solution};
use crate::tasks::{TaskCatalog, TaskEntry};

type ApiError = (StatusCode, String);

/// Shared, immutable service state.
pub struct AppState {
    pub resolver: Resolver,
    pub endpoint: Arc<dyn SparqlEndpoint>,
    pub catalog: TaskCatalog,
    pub instance_languages: Vec<String>,
}

impl AppState {
    pub fn new(config: &ServiceConfig, endpoint: Arc<dyn SparqlEndpoint>) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver: Resolver::new(&config.resolution)?,
            endpoint,
            catalog: TaskCatalog::new(&config.server.tasks_file),
            instance_languages: config.resolution.instance_languages.clone(),
        })
    }
}

/// Build the router with permissive CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/knowledge-graph/task-data", get(task_data))
        .route("/knowledge-graph/roles", get(roles))
        .route("/knowledge-graph/hazards", get(hazards))
        .route("/knowledge-graph/classes", get(classes))
        .route("/knowledge-graph/instances", get(instances))
        .route("/knowledge-graph/sparql", get(raw_sparql))
        .route("/knowledge-graph/tasks", get(tasks))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Shape of a resolution response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Solution bindings keyed by the output variables.
    #[default]
    Bindings,
    /// `{"id", "label"}` objects.
    Pairs,
}

#[derive(Debug, Deserialize)]
struct TaskDataParams {
    entity_type: Option<String>,
    startswith: Option<String>,
    contains: Option<String>,
    #[serde(default)]
    format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ClassParams {
    class_uri: Option<String>,
    startswith: Option<String>,
    contains: Option<String>,
    #[serde(default)]
    format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct FilterParams {
    startswith: Option<String>,
    contains: Option<String>,
    #[serde(default)]
    format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct SparqlParams {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ResolutionBody {
    Bindings(Vec<Solution>),
    Pairs(Vec<Candidate>),
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    endpoint: String,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn error_response(err: KgError) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        match err {
            KgError::Endpoint(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    };
    if status.is_server_error() {
        tracing::warn!(%status, error = %err, "request failed");
    }
    (status, format!("{err}"))
}

/// Run blocking engine work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> KgResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {e}")))?
        .map_err(error_response)
}

fn shape(resolution: Resolution, format: ResponseFormat) -> Json<ResolutionBody> {
    Json(match format {
        ResponseFormat::Bindings => ResolutionBody::Bindings(resolution.to_bindings()),
        ResponseFormat::Pairs => ResolutionBody::Pairs(resolution.candidates),
    })
}

fn label_filter(startswith: Option<String>, contains: Option<String>) -> LabelFilter {
    LabelFilter {
        startswith,
        contains,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoint: state.endpoint.describe(),
    })
}

async fn resolve_identifier(
    state: Arc<AppState>,
    identifier: Option<String>,
    filter: LabelFilter,
    format: ResponseFormat,
) -> Result<Json<ResolutionBody>, ApiError> {
    let identifier = identifier.unwrap_or_default();
    let resolution = blocking(move || {
        state
            .resolver
            .resolve(state.endpoint.as_ref(), &identifier, &filter)
    })
    .await?;
    Ok(shape(resolution, format))
}

async fn task_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TaskDataParams>,
) -> Result<Json<ResolutionBody>, ApiError> {
    let filter = label_filter(params.startswith, params.contains);
    resolve_identifier(state, params.entity_type, filter, params.format).await
}

/// Legacy alias of `task-data`, keyed by `class_uri`.
async fn roles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassParams>,
) -> Result<Json<ResolutionBody>, ApiError> {
    let filter = label_filter(params.startswith, params.contains);
    resolve_identifier(state, params.class_uri, filter, params.format).await
}

async fn hazards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ResolutionBody>, ApiError> {
    let filter = label_filter(params.startswith, params.contains);
    let resolution =
        blocking(move || state.resolver.hazards(state.endpoint.as_ref(), &filter)).await?;
    Ok(shape(resolution, params.format))
}

async fn classes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Solution>>, ApiError> {
    let rows = blocking(move || {
        let results = state.endpoint.select(&browse::classes_query())?;
        Ok(results.into_solutions())
    })
    .await?;
    Ok(Json(rows))
}

async fn instances(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassParams>,
) -> Result<Json<Vec<Solution>>, ApiError> {
    let raw = params.class_uri.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "missing class_uri".to_string()));
    }
    let class = sparql::parse_iri(raw.trim()).map_err(|e| error_response(e.into()))?;
    let filter = label_filter(params.startswith, params.contains);
    let rows = blocking(move || {
        let query = browse::instances_query(
            &class,
            &filter,
            &state.instance_languages,
            state.resolver.result_limit(),
        );
        Ok(state.endpoint.select(&query)?.into_solutions())
    })
    .await?;
    Ok(Json(rows))
}

async fn raw_sparql(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SparqlParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "missing query".to_string()))?;
    let doc = blocking(move || Ok(state.endpoint.raw(&query)?)).await?;
    Ok(Json(doc))
}

async fn tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TaskEntry>>, ApiError> {
    let entries = blocking(move || Ok(state.catalog.load()?)).await?;
    Ok(Json(entries))
}
