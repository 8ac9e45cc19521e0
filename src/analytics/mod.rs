//! Visitor analytics
//!
//! Click tracking runs off the request path: the redirect handler hands a
//! [`ClickContext`] to the [`ClickTracker`], whose background task resolves
//! location and device and appends the event to storage.

pub mod device;
pub mod geoip;
pub mod ip_extractor;
pub mod models;
pub mod resolver;
pub mod summary;
pub mod tracker;

pub use device::{classify_device, Device};
pub use geoip::GeoIpService;
pub use ip_extractor::{anonymize_ip, extract_client_ip};
pub use models::{ClickContext, GeoLocation};
pub use resolver::ClickResolver;
pub use summary::{AnalyticsSummary, DailyClicks, DimensionCount};
pub use tracker::ClickTracker;

/// Placeholder for unresolved textual values
pub const UNKNOWN: &str = "Unknown";
