//! Analytics API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::handlers::AppState;
use crate::analytics::AnalyticsSummary;
use crate::models::ClickEvent;

fn parse_link_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// Click events for a link, newest first. Unknown ids yield an empty list.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClickEvent>>, ApiError> {
    let link_id = parse_link_id(&id)?;
    Ok(Json(state.storage.list_clicks(link_id).await?))
}

/// Device, country and per-day breakdowns for a link
pub async fn get_analytics_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let link_id = parse_link_id(&id)?;
    let events = state.storage.list_clicks(link_id).await?;

    Ok(Json(AnalyticsSummary::from_events(link_id, &events)))
}
