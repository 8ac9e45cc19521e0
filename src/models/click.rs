use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single recorded visit through the redirect endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: i64,
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub user_agent: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
}

/// Click data ready to be appended to the analytics store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClickEvent {
    pub link_id: i64,
    pub ip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub user_agent: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
}
