use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::TagdbError;
use crate::query::{self, Query};
use crate::store::{Stored, TagStore};

#[derive(Serialize)]
pub struct StoredResponse {
    #[serde(rename = "Id")]
    pub id: i64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The whole request path is the query, so `/` and every path below it is routed.
pub fn router(store: Arc<TagStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    Router::new()
        .route("/", get(retrieve_root).post(create_or_update_root).delete(remove_root))
        .route("/*query", get(retrieve).post(create_or_update).delete(remove))
        .with_state(store)
        .layer(cors)
}

type Captured = Result<Path<String>, PathRejection>;

fn nothing_captured() -> Captured {
    Ok(Path(String::new()))
}

// The wildcard capture loses the leading slash, which is an operator.
fn parse_path(captured: Captured) -> Result<(String, Query), Response> {
    let path = match captured {
        Ok(Path(p)) => format!("/{p}"),
        Err(rejection) => {
            let e = TagdbError::MalformedQuery { message: rejection.body_text(), position: 0 };
            return Err(reject("<undecodable>", e));
        }
    };
    match query::parse(&path) {
        Ok(query) => Ok((path, query)),
        Err(e) => Err(reject(&path, e)),
    }
}

fn reject(path: &str, e: TagdbError) -> Response {
    let status = if e.is_query_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
    let msg = format!("{e}");
    warn!(path, %msg, code = %status.as_u16(), "request rejected");
    (status, Json(ErrorResponse { error: msg })).into_response()
}

fn join_failed(e: tokio::task::JoinError) -> Response {
    warn!(error = %e, "Join error");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: String::from("Join error") })).into_response()
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

async fn retrieve(State(store): State<Arc<TagStore>>, captured: Captured) -> Response {
    let started = Instant::now();
    let (path, query) = match parse_path(captured) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    // The store is synchronous, so it runs on a blocking thread.
    match tokio::task::spawn_blocking(move || store.get_items(&query)).await {
        Ok(items) => {
            info!(method = "GET", path = %path, ms = elapsed_ms(started), items = items.len(), "request complete");
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => join_failed(e),
    }
}

async fn create_or_update(
    State(store): State<Arc<TagStore>>,
    captured: Captured,
    content: String,
) -> Response {
    let started = Instant::now();
    let (path, query) = match parse_path(captured) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let stored = match tokio::task::spawn_blocking(move || store.store(&query, &content)).await {
        Ok(stored) => stored,
        Err(e) => return join_failed(e),
    };
    info!(method = "POST", path = %path, ms = elapsed_ms(started), ?stored, "request complete");
    match stored {
        Stored::Created(id) | Stored::Updated(id) => (StatusCode::OK, Json(StoredResponse { id })).into_response(),
        Stored::Missing(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: format!("No item with id {id}") }),
        )
            .into_response(),
        Stored::Failed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: String::from("Item could not be stored") }),
        )
            .into_response(),
    }
}

async fn remove(State(store): State<Arc<TagStore>>, captured: Captured) -> Response {
    let started = Instant::now();
    let (path, query) = match parse_path(captured) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    match tokio::task::spawn_blocking(move || store.delete_items(&query)).await {
        Ok(deleted) => {
            info!(method = "DELETE", path = %path, ms = elapsed_ms(started), deleted = deleted.len(), "request complete");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => join_failed(e),
    }
}

// `/` has no wildcard to capture, so it gets its own entry points.
async fn retrieve_root(state: State<Arc<TagStore>>) -> Response {
    retrieve(state, nothing_captured()).await
}

async fn create_or_update_root(state: State<Arc<TagStore>>, content: String) -> Response {
    create_or_update(state, nothing_captured(), content).await
}

async fn remove_root(state: State<Arc<TagStore>>) -> Response {
    remove(state, nothing_captured()).await
}
