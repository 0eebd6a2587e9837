//! `TodoStore` over a ScyllaDB / Cassandra session.
//!
//! One `Session` is opened at startup and shared by every request; the
//! driver pools connections internally, so no locking happens here. The
//! four fixed statements are prepared once at connect time. Listing
//! statements vary with the filter and cursor, so they are rendered per
//! request by `PageQuery::to_cql` and streamed row by row.
//!
//! Assumes a pre-existing table:
//!
//! ```cql
//! CREATE TABLE todos (
//!     id uuid PRIMARY KEY,
//!     user_id text,
//!     title text,
//!     description text,
//!     status text,
//!     created timestamp,
//!     updated timestamp
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use scylla::statement::Consistency;
use scylla::value::CqlValue;
use scylla::DeserializeRow;
use uuid::Uuid;

use todo_core::{BindValue, PageQuery, Todo, TODO_COLUMNS};

use super::{StoreError, TodoStore};
use crate::config::ScyllaConfig;

const INSERT: &str = "INSERT INTO todos (id, user_id, title, description, status, created, updated) \
                      VALUES (?, ?, ?, ?, ?, ?, ?)";
const UPDATE: &str = "UPDATE todos SET title = ?, description = ?, status = ?, updated = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM todos WHERE id = ?";

/// Column-level shape of a `todos` row. Text and timestamp columns may be
/// null in rows written by other tools; nulls read back as empty values.
#[derive(Debug, DeserializeRow)]
struct TodoRow {
    id: Uuid,
    user_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        let created = row.created.unwrap_or_default();
        Todo {
            id: row.id,
            user_id: row.user_id.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            status: row.status.unwrap_or_default(),
            created,
            updated: row.updated.unwrap_or(created),
        }
    }
}

fn to_cql_value(value: BindValue) -> CqlValue {
    match value {
        BindValue::Text(s) => CqlValue::Text(s),
        BindValue::Uuid(id) => CqlValue::Uuid(id),
        BindValue::Int(n) => CqlValue::Int(n),
    }
}

pub struct ScyllaStore {
    session: Session,
    insert: PreparedStatement,
    select: PreparedStatement,
    update: PreparedStatement,
    delete: PreparedStatement,
}

impl ScyllaStore {
    /// Open the session and prepare statements. Any failure here is meant
    /// to be fatal for the process.
    pub async fn connect(config: &ScyllaConfig) -> Result<Self, StoreError> {
        let node = config.node();
        let profile = ExecutionProfile::builder()
            .consistency(Consistency::Quorum)
            .build();

        let mut builder = SessionBuilder::new()
            .known_node(&node)
            .connection_timeout(config.connect_timeout)
            .default_execution_profile_handle(profile.into_handle());
        if let Some(username) = &config.username {
            builder = builder.user(username, config.password.as_deref().unwrap_or_default());
        }
        if !config.keyspace.is_empty() {
            builder = builder.use_keyspace(&config.keyspace, false);
        }

        let session = builder.build().await.map_err(|e| StoreError::Connect {
            node: node.clone(),
            source: Box::new(e),
        })?;
        tracing::info!(node = %node, keyspace = %config.keyspace, "connected to ScyllaDB");

        let select = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?");
        let insert = session.prepare(INSERT).await.map_err(StoreError::query)?;
        let select = session.prepare(select).await.map_err(StoreError::query)?;
        let update = session.prepare(UPDATE).await.map_err(StoreError::query)?;
        let delete = session.prepare(DELETE).await.map_err(StoreError::query)?;

        Ok(Self {
            session,
            insert,
            select,
            update,
            delete,
        })
    }
}

#[async_trait]
impl TodoStore for ScyllaStore {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        let values = (
            todo.id,
            &todo.user_id,
            &todo.title,
            &todo.description,
            &todo.status,
            todo.created,
            todo.updated,
        );
        self.session
            .execute_unpaged(&self.insert, values)
            .await
            .map_err(StoreError::query)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let result = self
            .session
            .execute_unpaged(&self.select, (id,))
            .await
            .map_err(StoreError::query)?;
        let rows = result.into_rows_result().map_err(StoreError::decode)?;
        let row = rows
            .maybe_first_row::<TodoRow>()
            .map_err(StoreError::decode)?;
        Ok(row.map(Todo::from))
    }

    async fn update(&self, todo: &Todo) -> Result<(), StoreError> {
        let values = (
            &todo.title,
            &todo.description,
            &todo.status,
            todo.updated,
            todo.id,
        );
        self.session
            .execute_unpaged(&self.update, values)
            .await
            .map_err(StoreError::query)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.session
            .execute_unpaged(&self.delete, (id,))
            .await
            .map_err(StoreError::query)?;
        Ok(())
    }

    async fn list(&self, query: &PageQuery) -> Result<Vec<Todo>, StoreError> {
        let stmt = query.to_cql();
        tracing::debug!(cql = %stmt.text, "listing todos");
        let values: Vec<CqlValue> = stmt.values.into_iter().map(to_cql_value).collect();

        let mut rows = self
            .session
            .query_iter(stmt.text, values)
            .await
            .map_err(StoreError::query)?
            .rows_stream::<TodoRow>()
            .map_err(StoreError::decode)?;

        let mut todos = Vec::with_capacity(query.limit());
        while let Some(row) = rows.try_next().await.map_err(StoreError::query)? {
            todos.push(Todo::from(row));
        }
        Ok(todos)
    }
}
