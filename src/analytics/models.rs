//! Data models for analytics

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Coarse geographic location derived from an IP address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// ISO country code (e.g., "US", "GB")
    pub country: Option<String>,

    /// City name
    pub city: Option<String>,
}

/// What the redirect handler knows about a visit, captured on the hot path.
/// Geo and device resolution are deferred to the tracker task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickContext {
    pub link_id: i64,
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}
