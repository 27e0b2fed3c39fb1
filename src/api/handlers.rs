//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheConfig, CacheEngine};
use crate::error::{CacheError, Result};
use crate::models::{
    ConfigureRequest, ConfigureResponse, DeleteResponse, GetResponse, HealthResponse, PutQuery,
    PutRequest, PutResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the current engine. Reconfiguration swaps in a new engine;
/// requests already running keep the one they started with.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Option<Arc<CacheEngine>>>>,
    /// Server settings that reconfiguration requests are layered over
    defaults: Arc<CacheConfig>,
}

impl AppState {
    /// Creates a new AppState serving the given engine.
    ///
    /// The engine's configuration becomes the base for later reconfiguration.
    pub fn new(engine: CacheEngine) -> Self {
        Self {
            defaults: Arc::new(engine.config().clone()),
            engine: Arc::new(RwLock::new(Some(Arc::new(engine)))),
        }
    }

    /// Creates an AppState with no engine; cache requests fail until configured.
    pub fn unconfigured() -> Self {
        Self {
            engine: Arc::new(RwLock::new(None)),
            defaults: Arc::new(CacheConfig::default()),
        }
    }

    /// Replaces the settings reconfiguration requests are layered over.
    pub fn with_defaults(mut self, defaults: CacheConfig) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    pub fn defaults(&self) -> &CacheConfig {
        &self.defaults
    }

    /// Current engine, or `StoreUnavailable` if none is configured.
    pub async fn engine(&self) -> Result<Arc<CacheEngine>> {
        self.engine.read().await.clone().ok_or_else(|| {
            CacheError::StoreUnavailable("Cache has not been configured".to_string())
        })
    }

    /// Replaces the current engine, dropping the previous store connection.
    pub async fn replace(&self, engine: CacheEngine) {
        *self.engine.write().await = Some(Arc::new(engine));
    }

    pub async fn is_configured(&self) -> bool {
        self.engine.read().await.is_some()
    }
}

/// Handler for GET /cache/object/:key
pub async fn get_object_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let engine = state.engine().await?;
    let raw = engine.get(&key).await?;

    Ok(Json(GetResponse::from_stored(key, raw)))
}

/// Handler for POST /cache/object/:key
///
/// Stores the body's `value` with the optional `ttl` query override.
pub async fn put_object_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PutQuery>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    let engine = state.engine().await?;
    let stored = engine.put(&key, req.value, query.ttl).await?;

    Ok(Json(stored.into()))
}

/// Handler for DELETE /cache/object/:key/delete
pub async fn delete_object_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let engine = state.engine().await?;
    let deleted = engine.delete(&key).await?;

    Ok(Json(DeleteResponse::new(deleted)))
}

/// Handler for PUT /cache/config
///
/// Opens a new store connection and replaces the running engine.
pub async fn configure_handler(
    State(state): State<AppState>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<ConfigureResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let config = req.cache_config(state.defaults());
    let engine = CacheEngine::configure(&req.host, req.port, config.clone()).await?;
    state.replace(engine).await;
    info!("Cache reconfigured against {}:{}", req.host, req.port);

    let addr = format!("{}:{}", req.host, req.port);
    Ok(Json(ConfigureResponse::new(&addr, &config)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let engine = state.engine().await?;
    let resident = engine.resident_count().await?;

    Ok(Json(StatsResponse::new(
        &engine.stats(),
        resident,
        engine.config(),
    )))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.is_configured().await))
}
