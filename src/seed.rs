//! Demo data for an empty database

use anyhow::Result;
use tracing::info;

use crate::models::{NewClickEvent, NewLink};
use crate::storage::Storage;

fn demo_click(
    link_id: i64,
    city: &str,
    country: &str,
    device: &str,
    browser: &str,
) -> NewClickEvent {
    NewClickEvent {
        link_id,
        ip: Some("127.0.0.1".to_string()),
        city: Some(city.to_string()),
        country: Some(country.to_string()),
        user_agent: None,
        device: Some(device.to_string()),
        browser: Some(browser.to_string()),
    }
}

/// Insert two demo links with a few clicks, unless links already exist.
/// Returns whether anything was inserted.
pub async fn seed_if_empty(storage: &dyn Storage) -> Result<bool> {
    if !storage.list_links().await?.is_empty() {
        return Ok(false);
    }

    info!("Seeding database...");
    let google = storage
        .create_link(&NewLink {
            alias: "google".to_string(),
            original_url: "https://google.com".to_string(),
            expires_at: None,
        })
        .await?;
    let replit = storage
        .create_link(&NewLink {
            alias: "replit".to_string(),
            original_url: "https://replit.com".to_string(),
            expires_at: None,
        })
        .await?;

    for click in [
        demo_click(google.id, "San Francisco", "US", "Desktop", "Chrome"),
        demo_click(google.id, "London", "UK", "Mobile", "Safari"),
        demo_click(replit.id, "New York", "US", "Desktop", "Firefox"),
    ] {
        storage.record_click(&click).await?;
    }

    info!("Database seeded");
    Ok(true)
}
