use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct ItemInput {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// What the echo route saw, returned verbatim as the response body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hits {
    pub hits: usize,
}

#[derive(Clone, Default)]
pub struct AppState {
    items: Arc<RwLock<BTreeMap<u64, Item>>>,
    next_id: Arc<AtomicU64>,
    flaky_hits: Arc<AtomicUsize>,
}

/// Routes live under `/api` so the default base URL shape can be exercised
/// end to end.
pub fn app() -> Router {
    let routes = Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/flaky", any(flaky))
        .route("/flaky/hits", get(flaky_hits))
        .with_state(AppState::default());
    Router::new().nest("/api", routes)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Item>> {
    let items = state.items.read().await;
    let matching = items
        .values()
        .filter(|item| match &query.q {
            Some(q) => item.name.contains(q.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    Json(matching)
}

async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<ItemInput>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: state.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        name: input.name,
    };
    tracing::debug!(id = item.id, "created item");
    state.items.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, StatusCode> {
    let items = state.items.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ItemInput>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = state.items.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut items = state.items.write().await;
    items.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())),
        )
    };
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    })
}

/// Always answers 503 and counts how often it was asked.
async fn flaky(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let hits = state.flaky_hits.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::debug!(hits, "flaky route hit");
    (StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable")
}

async fn flaky_hits(State(state): State<AppState>) -> Json<Hits> {
    Json(Hits {
        hits: state.flaky_hits.load(Ordering::SeqCst),
    })
}
