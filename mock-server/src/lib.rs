//! In-memory Rails-style JSON API for any resource name.
//!
//! Serves `/<resource>.json` and `/<resource>/<id>.json`. Tables are created
//! on first write, rows keep insertion order and get integer ids. Writes must
//! carry the configured `X-CSRF-TOKEN`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const DEFAULT_CSRF_TOKEN: &str = "test-token";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub csrf_token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csrf_token: DEFAULT_CSRF_TOKEN.to_string(),
        }
    }
}

impl AppConfig {
    /// Read `CSRF_TOKEN`, falling back to the default token.
    pub fn from_env() -> Self {
        let csrf_token =
            std::env::var("CSRF_TOKEN").unwrap_or_else(|_| DEFAULT_CSRF_TOKEN.to_string());
        Self { csrf_token }
    }
}

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: Vec<Map<String, Value>>,
}

#[derive(Clone)]
struct AppState {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    csrf_token: Arc<str>,
}

type Failure = (StatusCode, Json<Value>);

pub fn app(config: AppConfig) -> Router {
    let state = AppState {
        tables: Arc::default(),
        csrf_token: config.csrf_token.into(),
    };
    Router::new()
        .route("/{resource}", get(list_items).post(create_item))
        .route(
            "/{resource}/{id}",
            get(show_item).put(update_item).delete(destroy_item),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: AppConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

async fn list_items(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Map<String, Value>>>, Failure> {
    let resource = json_segment(&resource)?;
    let tables = state.tables.read().await;
    let rows = tables
        .get(resource)
        .map(|table| {
            table
                .rows
                .iter()
                .filter(|row| matches_filters(row, &filters))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(rows))
}

async fn create_item(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Map<String, Value>>), Failure> {
    let resource = json_segment(&resource)?;
    check_csrf(&headers, &state.csrf_token)?;
    let mut row = into_object(body)?;

    let mut tables = state.tables.write().await;
    let table = tables.entry(resource.to_string()).or_default();
    table.next_id += 1;
    row.insert("id".to_string(), json!(table.next_id));
    table.rows.push(row.clone());
    debug!(resource, id = table.next_id, "created");
    Ok((StatusCode::CREATED, Json(row)))
}

async fn show_item(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, Failure> {
    let resource = resource.as_str();
    let id = json_segment(&id)?;
    let tables = state.tables.read().await;
    tables
        .get(resource)
        .and_then(|table| table.rows.iter().find(|row| has_id(row, id)))
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn update_item(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Map<String, Value>>, Failure> {
    let resource = resource.as_str();
    let id = json_segment(&id)?;
    check_csrf(&headers, &state.csrf_token)?;
    let changes = into_object(body)?;

    let mut tables = state.tables.write().await;
    let row = tables
        .get_mut(resource)
        .and_then(|table| table.rows.iter_mut().find(|row| has_id(row, id)))
        .ok_or_else(not_found)?;
    for (field, value) in changes {
        if field != "id" {
            row.insert(field, value);
        }
    }
    debug!(resource, id, "updated");
    Ok(Json(row.clone()))
}

async fn destroy_item(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    let resource = resource.as_str();
    let id = json_segment(&id)?;
    check_csrf(&headers, &state.csrf_token)?;

    let mut tables = state.tables.write().await;
    let table = tables.get_mut(resource).ok_or_else(not_found)?;
    let index = table
        .rows
        .iter()
        .position(|row| has_id(row, id))
        .ok_or_else(not_found)?;
    table.rows.remove(index);
    debug!(resource, id, "destroyed");
    Ok(StatusCode::NO_CONTENT)
}

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

fn not_found() -> Failure {
    failure(StatusCode::NOT_FOUND, "not found")
}

/// Only `.json` paths are served; the suffix is stripped.
fn json_segment(segment: &str) -> Result<&str, Failure> {
    segment
        .strip_suffix(".json")
        .filter(|name| !name.is_empty())
        .ok_or_else(not_found)
}

fn check_csrf(headers: &HeaderMap, expected: &str) -> Result<(), Failure> {
    let sent = headers.get("x-csrf-token").and_then(|value| value.to_str().ok());
    if sent == Some(expected) {
        return Ok(());
    }
    Err(failure(
        StatusCode::UNPROCESSABLE_ENTITY,
        "invalid authenticity token",
    ))
}

fn into_object(body: Value) -> Result<Map<String, Value>, Failure> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "invalid")),
    }
}

/// Strings as-is, everything else as JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn has_id(row: &Map<String, Value>, id: &str) -> bool {
    row.get("id").is_some_and(|value| render(value) == id)
}

fn matches_filters(row: &Map<String, Value>, filters: &HashMap<String, String>) -> bool {
    filters
        .iter()
        .all(|(field, expected)| row.get(field).is_some_and(|value| &render(value) == expected))
}
