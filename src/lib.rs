pub mod alias;
pub mod analytics;
pub mod api;
pub mod config;
pub mod links;
pub mod models;
pub mod redirect;
pub mod seed;
pub mod storage;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use analytics::ClickTracker;
use config::Config;
use storage::Storage;

/// Assemble the JSON API and the redirect endpoint into one router
pub fn create_app(storage: Arc<dyn Storage>, tracker: ClickTracker, config: &Config) -> Router {
    let api_router = api::create_api_router(Arc::clone(&storage), config.links.clone());
    let redirect_router =
        redirect::create_redirect_router(storage, tracker, config.analytics.clone());

    api_router
        .merge(redirect_router)
        .layer(TraceLayer::new_for_http())
}
