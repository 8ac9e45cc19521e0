use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

use crate::analytics::{extract_client_ip, ClickContext, ClickTracker};
use crate::config::AnalyticsConfig;
use crate::storage::Storage;

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
    pub tracker: ClickTracker,
    pub analytics_config: AnalyticsConfig,
}

const NOT_FOUND_PAGE: &str = r#"<html>
  <head><title>Link Not Found</title></head>
  <body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>404 - Link Not Found</h1>
    <p>The short link you are looking for does not exist.</p>
    <a href="/">Go Home</a>
  </body>
</html>
"#;

/// Stored URLs are kept verbatim. Non-ASCII destinations go out in their
/// serialized, percent-encoded form.
fn location_header(original_url: &str) -> Option<HeaderValue> {
    if original_url.is_ascii() {
        return HeaderValue::from_str(original_url).ok();
    }
    let normalized = Url::parse(original_url).ok()?;
    HeaderValue::from_str(normalized.as_str()).ok()
}

/// Resolve an alias, record the click in the background and redirect
pub async fn redirect_link(
    State(state): State<Arc<RedirectState>>,
    Path(alias): Path<String>,
    request: Request,
) -> Response {
    let link = match state.storage.get_link_by_alias(&alias).await {
        Ok(Some(link)) => link,
        Ok(None) => return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
        Err(e) => {
            error!(alias = %alias, error = %e, "failed to resolve alias");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    if link.is_expired_at(Utc::now()) {
        debug!(alias = %alias, "link expired");
        return (StatusCode::GONE, "Link Expired").into_response();
    }

    let Some(location) = location_header(&link.original_url) else {
        error!(alias = %alias, "stored destination is not a valid Location header");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    };

    let socket_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let headers = request.headers();

    state.tracker.track(ClickContext {
        link_id: link.id,
        client_ip: extract_client_ip(headers, socket_ip, &state.analytics_config),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
