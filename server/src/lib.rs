//! HTTP service for todo records stored in ScyllaDB.
//!
//! # Overview
//! `app` wires the five `/todos` routes onto an `AppState` that carries the
//! injected storage backend, and `run` serves it until a shutdown signal
//! arrives. Query building and cursor derivation live in `todo_core`; this
//! crate only executes statements and maps results and errors onto HTTP.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use todo_core::{PageLimits, StatusPolicy};

pub mod config;
pub mod deadline;
pub mod error;
pub mod handlers;
pub mod store;

pub use config::{Config, ConfigError, StoreKind};
pub use deadline::Deadline;
pub use error::AppError;
pub use store::{MemoryStore, ScyllaStore, StoreError, TodoStore};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub page_limits: PageLimits,
    pub statuses: Arc<StatusPolicy>,
    pub request_timeout: Duration,
}

impl AppState {
    /// State with default limits, a free-form status and the default
    /// request timeout.
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            page_limits: PageLimits::default(),
            statuses: Arc::new(StatusPolicy::FreeForm),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(store: Arc<dyn TodoStore>, config: &Config) -> Self {
        Self {
            store,
            page_limits: config.page_limits,
            statuses: Arc::new(config.statuses.clone()),
            request_timeout: config.request_timeout,
        }
    }

    pub fn with_statuses(mut self, statuses: StatusPolicy) -> Self {
        self.statuses = Arc::new(statuses);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Start the storage deadline for one request.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}

/// CORS policy: a single allowed origin, the four CRUD methods, the
/// `Content-Type` header, credentials allowed.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener`, draining in-flight requests on Ctrl-C or
/// SIGTERM.
pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
