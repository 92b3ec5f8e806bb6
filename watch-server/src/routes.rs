use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{debug, error};
use watch_core::{PricePoint, ITEMS_ROUTE, WATCHES_PATH};

use crate::store::{StoreError, WatchStore};

pub type SharedStore = Arc<RwLock<WatchStore>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// The two read endpoints, plus the static site when `site_root` is given.
pub fn router(state: AppState, site_root: Option<&Path>) -> Router {
    let api = Router::new()
        .route(WATCHES_PATH, get(list_watches))
        .route(ITEMS_ROUTE, get(watch_items))
        .with_state(state);
    match site_root {
        Some(root) => api.fallback_service(ServeDir::new(root)),
        None => api,
    }
}

async fn list_watches(State(state): State<AppState>) -> Json<Vec<Value>> {
    let store = state.store.read().await;
    debug!(count = store.len(), "listing watches");
    Json(store.summaries())
}

async fn watch_items(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Vec<PricePoint>>, StoreError> {
    let id: u64 = id.parse().map_err(|_| StoreError::NotFound(id.clone()))?;
    let store = state.store.read().await;
    let items = store.items(id)?;
    debug!(id, count = items.len(), "listing items");
    Ok(Json(items.to_vec()))
}
