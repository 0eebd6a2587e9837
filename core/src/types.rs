//! Todo record and its request/response payloads.
//!
//! # Design
//! `Todo` is the single record shape shared by the wire (JSON) and storage
//! (CQL columns) representations. Field names are identical in both, so the
//! server maps rows onto this struct without renaming.
//!
//! Timestamps are kept at millisecond precision because that is what a CQL
//! `timestamp` column stores; truncating up front keeps a record returned
//! from create identical to the same record read back later.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Todo {
    /// Build a new record from a create payload. The id and both timestamps
    /// are assigned here and nowhere else.
    pub fn new(input: CreateTodo, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(3);
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            status: input.status,
            created: now,
            updated: now,
        }
    }

    /// Merge an update payload into this record and refresh `updated`.
    ///
    /// Non-empty incoming fields overwrite; empty or absent ones are left
    /// untouched. `id`, `user_id` and `created` never change.
    pub fn apply(&mut self, update: UpdateTodo, now: DateTime<Utc>) {
        if let Some(title) = non_empty(update.title) {
            self.title = title;
        }
        if let Some(description) = non_empty(update.description) {
            self.description = description;
        }
        if let Some(status) = non_empty(update.status) {
            self.status = status;
        }
        self.touch(now);
    }

    /// Advance `updated`, guaranteeing it strictly increases even when the
    /// clock has not moved past the stored millisecond.
    fn touch(&mut self, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(3);
        self.updated = if now > self.updated {
            now
        } else {
            self.updated + TimeDelta::milliseconds(1)
        };
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Request payload for creating a todo. Missing fields decode as empty
/// strings; any client-supplied `id` or timestamps are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

/// Request payload for a partial update. Only non-empty fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateTodo {
    /// The status this update would write, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

/// One page of a listing plus the cursors for neighbouring pages.
///
/// Absent tokens serialize as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub next_page_token: String,
    pub prev_page_token: String,
    pub current_page_size: usize,
}
