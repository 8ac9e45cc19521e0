use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::config::LinkConfig;
use crate::links;
use crate::models::{CreateLinkRequest, LinkWithClicks};
use crate::storage::Storage;
use crate::validation::ValidationError;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub links: LinkConfig,
}

/// Create a new short link
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkWithClicks>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ValidationError {
        field: None,
        message: rejection.body_text(),
    })?;

    let link = links::create_link(
        state.storage.as_ref(),
        request,
        state.links.alias_max_length,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(LinkWithClicks { link, clicks: 0 })))
}

/// List all links with click counts, newest first
pub async fn list_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinkWithClicks>>, ApiError> {
    Ok(Json(state.storage.list_links().await?))
}

/// Get a link by alias
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(alias): Path<String>,
) -> Result<Json<LinkWithClicks>, ApiError> {
    let link = state
        .storage
        .get_link_by_alias(&alias)
        .await?
        .ok_or(ApiError::NotFound)?;
    let clicks = state.storage.count_clicks(link.id).await?;

    Ok(Json(LinkWithClicks { link, clicks }))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}
