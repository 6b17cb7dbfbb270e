//! # HTTP Server
//!
//! Axum surface for the analysis pipeline: a health check and the analyze
//! endpoint, behind CORS for the browser frontend and request tracing.
//!
//! Errors are returned as `{"detail": "<message>"}` with a status that tells
//! request-shape problems (422) apart from bad values (400), upstream site
//! failures (502) and internal failures (500).

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rig::completion::CompletionModel;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::analysis::AnalysisService;
use crate::error::{Error, Result};

/// Largest accepted request body, uploads included
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Browser origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Shared application state
pub struct AppState<M: CompletionModel> {
    pub service: Arc<AnalysisService<M>>,
}

impl<M: CompletionModel> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<M: CompletionModel> AppState<M> {
    pub fn new(service: AnalysisService<M>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Error response for HTTP handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(e) if e.is_schema_error() => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Validation(_) | Error::InvalidUrl(_) | Error::FileProcessing(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::InsightGeneration(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.detail);
        } else {
            warn!("Request rejected: {}", self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the CORS layer for the configured origins
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::Config(format!("invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Create the application router.
pub fn create_router<M>(state: AppState<M>, cors: CorsLayer) -> Router
where
    M: CompletionModel + 'static,
{
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/analyze", post(routes::analyze::<M>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl-C.
pub async fn run_server<M>(config: ServerConfig, service: AnalysisService<M>) -> anyhow::Result<()>
where
    M: CompletionModel + 'static,
{
    let app = create_router(AppState::new(service), cors_layer(&config.allowed_origins)?);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Sales assistant listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received, terminating...");
        })
        .await?;
    Ok(())
}
