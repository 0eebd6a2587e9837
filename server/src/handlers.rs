//! `/todos` route handlers.
//!
//! Each handler decodes its inputs, validates them, runs its storage calls
//! under the request deadline and encodes the result. Extractor rejections
//! are taken as `Result`s so malformed JSON, ids and query strings all come
//! back as 400 with the same error body as every other failure.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use todo_core::{CreateTodo, ListParams, PageQuery, Todo, TodoPage, UpdateTodo};

use crate::{error::AppError, AppState};

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(input) = payload?;
    state.statuses.check(&input.status)?;

    let todo = Todo::new(input, Utc::now());
    state.deadline().run(state.store.insert(&todo)).await?;
    tracing::info!(id = %todo.id, user_id = %todo.user_id, "created todo");
    Ok(Json(todo))
}

pub async fn list_todos(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TodoPage>, AppError> {
    let Query(params) = params?;
    let query = PageQuery::from_params(&params, &state.page_limits, &state.statuses)?;

    let todos = state.deadline().run(state.store.list(&query)).await?;
    Ok(Json(TodoPage::from_rows(todos, query.page_size)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Todo>, AppError> {
    let Path(id) = id?;
    let todo = state
        .deadline()
        .run(state.store.get(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Path(id) = id?;
    let Json(update) = payload?;
    if let Some(status) = update.status() {
        state.statuses.check(status)?;
    }

    let deadline = state.deadline();
    let mut todo = deadline
        .run(state.store.get(id))
        .await?
        .ok_or(AppError::NotFound)?;
    todo.apply(update, Utc::now());
    deadline.run(state.store.update(&todo)).await?;
    tracing::info!(id = %todo.id, "updated todo");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.deadline().run(state.store.delete(id)).await?;
    tracing::info!(id = %id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
