pub mod schedule;

use axum::{extract::{Query, State}, response::Html, routing::get, Json, Router};
use modpack_core::sort::{sort_packs, SortField, SortOrder};
use modpack_core::ModPack;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

pub use schedule::SharedDataset;

const VIEWER_PAGE: &str = include_str!("../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct DataParams {
    #[serde(default)]
    pub field: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Clone)]
pub struct AppState {
    pub dataset: SharedDataset,
}

pub fn build_app(dataset: SharedDataset) -> Router {
    let app_state = AppState { dataset };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(|| async { "ok" }))
        .route("/data", get(data_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn index_page() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

/// Sorted copy of the dataset; the shared copy keeps its stored order.
pub async fn data_handler(State(state): State<AppState>, Query(params): Query<DataParams>) -> Json<Vec<ModPack>> {
    let mut packs = state.dataset.read().clone();
    sort_packs(&mut packs, params.field, params.order);
    Json(packs)
}
