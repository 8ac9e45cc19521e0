use axum::{routing::get, Router};
use std::sync::Arc;

use crate::analytics::ClickTracker;
use crate::config::AnalyticsConfig;
use crate::storage::Storage;

use super::handlers::{redirect_link, RedirectState};

pub fn create_redirect_router(
    storage: Arc<dyn Storage>,
    tracker: ClickTracker,
    analytics_config: AnalyticsConfig,
) -> Router {
    let state = Arc::new(RedirectState {
        storage,
        tracker,
        analytics_config,
    });

    Router::new()
        .route("/r/{alias}", get(redirect_link))
        .with_state(state)
}
