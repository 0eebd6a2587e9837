//! Storage backends for todo records.
//!
//! # Design
//! Handlers talk to storage only through `TodoStore`, held as an
//! `Arc<dyn TodoStore>` in `AppState`. `ScyllaStore` owns the single
//! long-lived driver session; `MemoryStore` is an in-process stand-in that
//! orders rows by the same partitioner token, used by tests and for local
//! runs without a cluster.
//!
//! No backend retries. Errors surface to the handler immediately.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use todo_core::{PageQuery, Todo};

use crate::config::{Config, StoreKind};

pub mod memory;
pub mod scylla;

pub use self::memory::MemoryStore;
pub use self::scylla::ScyllaStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to {node}: {source}")]
    Connect {
        node: String,
        #[source]
        source: BoxError,
    },

    #[error("query failed: {0}")]
    Query(#[source] BoxError),

    #[error("failed to decode rows: {0}")]
    Decode(#[source] BoxError),
}

impl StoreError {
    pub fn query<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Query(Box::new(err))
    }

    pub fn decode<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Decode(Box::new(err))
    }
}

/// Storage operations needed by the HTTP handlers.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Write a new record.
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError>;

    /// Point read. A missing row is `Ok(None)`.
    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Overwrite the mutable fields (`title`, `description`, `status`,
    /// `updated`) of the record with `todo.id`.
    async fn update(&self, todo: &Todo) -> Result<(), StoreError>;

    /// Remove a record. Removing an absent id is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Rows matching `query`, in token order, at most `query.page_size`.
    async fn list(&self, query: &PageQuery) -> Result<Vec<Todo>, StoreError>;
}

/// Open the backend selected by `config`.
pub async fn connect(config: &Config) -> Result<Arc<dyn TodoStore>, StoreError> {
    match config.store {
        StoreKind::Scylla => {
            let store = ScyllaStore::connect(&config.scylla).await?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            tracing::info!("using in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
