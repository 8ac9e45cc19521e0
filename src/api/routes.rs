use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::LinkConfig;
use crate::storage::Storage;

use super::analytics::{get_analytics, get_analytics_summary};
use super::handlers::{create_link, get_link, health_check, list_links, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>, links: LinkConfig) -> Router {
    let state = Arc::new(AppState { storage, links });

    let link_routes = Router::new()
        .route("/api/links", get(list_links).post(create_link))
        .route("/api/links/{link}", get(get_link))
        .route("/api/links/{link}/analytics", get(get_analytics))
        .route("/api/links/{link}/analytics/summary", get(get_analytics_summary))
        .layer(CorsLayer::permissive())
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(link_routes)
}
