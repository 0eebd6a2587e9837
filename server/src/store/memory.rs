//! In-process `TodoStore` ordered like the real token ring.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use todo_core::{partition_token, PageQuery, Todo};

use super::{StoreError, TodoStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<HashMap<Uuid, Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.todos.read().await.len()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn update(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&todo.id) {
            Some(existing) => {
                existing.title.clone_from(&todo.title);
                existing.description.clone_from(&todo.description);
                existing.status.clone_from(&todo.status);
                existing.updated = todo.updated;
            }
            // CQL UPDATE is an upsert.
            None => {
                todos.insert(todo.id, todo.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.todos.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self, query: &PageQuery) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        let mut rows: Vec<Todo> = todos.values().filter(|t| query.admits(t)).cloned().collect();
        rows.sort_by_key(|t| (partition_token(t.id), t.id));
        rows.truncate(query.limit());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use todo_core::{CreateTodo, Cursor, UpdateTodo};

    fn todo(user_id: &str, status: &str) -> Todo {
        Todo::new(
            CreateTodo {
                user_id: user_id.to_string(),
                title: "t".to_string(),
                status: status.to_string(),
                ..CreateTodo::default()
            },
            Utc::now(),
        )
    }

    fn query(user_id: &str, page_size: i32) -> PageQuery {
        PageQuery {
            user_id: user_id.to_string(),
            status: None,
            cursor: None,
            page_size,
        }
    }

    #[tokio::test]
    async fn get_returns_inserted_record() {
        let store = MemoryStore::new();
        let t = todo("alice", "");
        store.insert(&t).await.unwrap();
        assert_eq!(store.get(t.id).await.unwrap(), Some(t));
        assert_eq!(store.get(Uuid::nil()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_created() {
        let store = MemoryStore::new();
        let original = todo("alice", "pending");
        store.insert(&original).await.unwrap();

        let mut changed = original.clone();
        changed.apply(
            UpdateTodo {
                status: Some("done".to_string()),
                ..UpdateTodo::default()
            },
            Utc::now(),
        );
        changed.user_id = "mallory".to_string();
        store.update(&changed).await.unwrap();

        let stored = store.get(original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, "done");
        assert_eq!(stored.user_id, "alice");
        assert_eq!(stored.created, original.created);
        assert_eq!(stored.updated, changed.updated);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let t = todo("alice", "");
        store.insert(&t).await.unwrap();
        store.delete(t.id).await.unwrap();
        store.delete(t.id).await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn list_orders_by_token_and_applies_limit() {
        let store = MemoryStore::new();
        for _ in 0..8 {
            store.insert(&todo("alice", "")).await.unwrap();
        }
        store.insert(&todo("bob", "")).await.unwrap();

        let rows = store.list(&query("alice", 5)).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|t| t.user_id == "alice"));
        let tokens: Vec<i64> = rows.iter().map(|t| partition_token(t.id)).collect();
        assert!(tokens.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn list_respects_cursor_and_status() {
        let store = MemoryStore::new();
        for i in 0..6 {
            let status = if i % 2 == 0 { "done" } else { "pending" };
            store.insert(&todo("alice", status)).await.unwrap();
        }

        let mut q = query("alice", 10);
        q.status = Some("done".to_string());
        let done = store.list(&q).await.unwrap();
        assert_eq!(done.len(), 3);

        q.cursor = Some(Cursor::After(done[0].id));
        let rest = store.list(&q).await.unwrap();
        assert_eq!(rest, done[1..].to_vec());

        q.cursor = Some(Cursor::Before(done[2].id));
        let head = store.list(&q).await.unwrap();
        assert_eq!(head, done[..2].to_vec());
    }
}
