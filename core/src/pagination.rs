//! Cursor-based pagination over the partitioner's token ring.
//!
//! # Design
//! Listing is split the same way the rest of this crate splits I/O: a
//! `PageQuery` is built from raw query-string parameters and rendered to a
//! CQL statement, the caller executes it, and `TodoPage::from_rows` turns the
//! returned rows into a page with neighbouring cursors.
//!
//! Rows come back in token order, i.e. ordered by the Murmur3 hash of the
//! id. That order is stable but has nothing to do with the id's text form
//! or with creation time. A cursor is simply the id of a boundary row, and
//! the next page is "rows whose `token(id)` is strictly greater".
//!
//! Backward paging is weaker than it looks: `token(id) < token(?)` with a
//! `LIMIT` returns the *first* rows of the ring below the cursor, not the
//! rows immediately preceding it, and `prev_page_token` is only a hint
//! that a previous page may exist (it is emitted whenever a full page came
//! back). Both behaviours are kept as-is.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ParamError;
use crate::partition::partition_token;
use crate::status::StatusPolicy;
use crate::types::{Todo, TodoPage};

pub const DEFAULT_PAGE_SIZE: i32 = 10;
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Column list shared by every read statement.
pub const TODO_COLUMNS: &str = "id, user_id, title, description, status, created, updated";

/// Raw query-string parameters of `GET /todos`. Empty values count as
/// absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub page_size: Option<String>,
    pub page_token: Option<String>,
    pub prev_page_token: Option<String>,
}

/// Default and ceiling for the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i32,
    pub max_size: i32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Exclusive bound on the token ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Rows with `token(id) > token(cursor)`.
    After(Uuid),
    /// Rows with `token(id) < token(cursor)`.
    Before(Uuid),
}

impl Cursor {
    pub fn id(&self) -> Uuid {
        match self {
            Cursor::After(id) | Cursor::Before(id) => *id,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            Cursor::After(_) => ">",
            Cursor::Before(_) => "<",
        }
    }

    fn admits(&self, id: Uuid) -> bool {
        let token = partition_token(id);
        match self {
            Cursor::After(bound) => token > partition_token(*bound),
            Cursor::Before(bound) => token < partition_token(*bound),
        }
    }
}

/// A single bind value of a rendered statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Uuid(Uuid),
    Int(i32),
}

/// A CQL statement with positional bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlStatement {
    pub text: String,
    pub values: Vec<BindValue>,
}

/// A validated, bounded listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub user_id: String,
    pub status: Option<String>,
    pub cursor: Option<Cursor>,
    pub page_size: i32,
}

impl PageQuery {
    /// Validate raw parameters.
    ///
    /// `user_id` is checked first so a request without it is rejected no
    /// matter what else it carries. When both tokens are present the
    /// forward `page_token` wins and `prev_page_token` is not inspected.
    pub fn from_params(
        params: &ListParams,
        limits: &PageLimits,
        statuses: &StatusPolicy,
    ) -> Result<Self, ParamError> {
        let user_id = present(&params.user_id).ok_or(ParamError::MissingUserId)?;

        let page_size = match present(&params.page_size) {
            Some(raw) => parse_page_size(raw, limits.max_size)?,
            None => limits.default_size,
        };

        let status = present(&params.status);
        if let Some(status) = status {
            statuses.check(status)?;
        }

        let cursor = if let Some(raw) = present(&params.page_token) {
            let id = Uuid::parse_str(raw).map_err(|_| ParamError::InvalidPageToken(raw.to_string()))?;
            Some(Cursor::After(id))
        } else if let Some(raw) = present(&params.prev_page_token) {
            let id =
                Uuid::parse_str(raw).map_err(|_| ParamError::InvalidPrevPageToken(raw.to_string()))?;
            Some(Cursor::Before(id))
        } else {
            None
        };

        Ok(Self {
            user_id: user_id.to_string(),
            status: status.map(str::to_string),
            cursor,
            page_size,
        })
    }

    /// Render the `SELECT` for this page. Bind values follow the placeholder
    /// order: user id, status, cursor, limit.
    pub fn to_cql(&self) -> CqlStatement {
        let mut text = format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?");
        let mut values = vec![BindValue::Text(self.user_id.clone())];

        if let Some(status) = &self.status {
            text.push_str(" AND status = ?");
            values.push(BindValue::Text(status.clone()));
        }

        if let Some(cursor) = &self.cursor {
            text.push_str(&format!(" AND token(id) {} token(?)", cursor.operator()));
            values.push(BindValue::Uuid(cursor.id()));
        }

        text.push_str(" LIMIT ? ALLOW FILTERING");
        values.push(BindValue::Int(self.page_size));

        CqlStatement { text, values }
    }

    /// Whether a record passes the filter and cursor bound of this query.
    /// The row limit is not part of this check.
    pub fn admits(&self, todo: &Todo) -> bool {
        todo.user_id == self.user_id
            && self.status.as_ref().is_none_or(|s| todo.status == *s)
            && self.cursor.is_none_or(|c| c.admits(todo.id))
    }

    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(0)
    }
}

impl TodoPage {
    /// Assemble a page from rows returned for a query of `page_size` rows.
    pub fn from_rows(todos: Vec<Todo>, page_size: i32) -> Self {
        let (next_page_token, prev_page_token) = match (todos.first(), todos.last()) {
            (Some(first), Some(last)) => {
                let full = i32::try_from(todos.len()).is_ok_and(|n| n == page_size);
                let prev = if full { first.id.to_string() } else { String::new() };
                (last.id.to_string(), prev)
            }
            _ => (String::new(), String::new()),
        };
        Self {
            current_page_size: todos.len(),
            todos,
            next_page_token,
            prev_page_token,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_page_size(raw: &str, max: i32) -> Result<i32, ParamError> {
    let size: i32 = raw
        .parse()
        .map_err(|_| ParamError::InvalidPageSize(raw.to_string()))?;
    if size <= 0 {
        return Err(ParamError::InvalidPageSize(raw.to_string()));
    }
    if size > max {
        return Err(ParamError::PageSizeTooLarge {
            requested: size,
            max,
        });
    }
    Ok(size)
}
