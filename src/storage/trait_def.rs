use crate::models::{ClickEvent, Link, LinkWithClicks, NewClickEvent, NewLink};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("alias already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Insert a new link. The unique constraint on `alias` is the source of
    /// truth for conflicts, so concurrent inserts of one alias yield exactly
    /// one success.
    async fn create_link(&self, link: &NewLink) -> StorageResult<Link>;

    /// Get a link by alias
    async fn get_link_by_alias(&self, alias: &str) -> Result<Option<Link>>;

    /// Get a link by id
    async fn get_link_by_id(&self, id: i64) -> Result<Option<Link>>;

    /// List all links with their click counts, newest first
    async fn list_links(&self) -> Result<Vec<LinkWithClicks>>;

    /// Count the click events recorded for a link
    async fn count_clicks(&self, link_id: i64) -> Result<i64>;

    /// Append a click event
    async fn record_click(&self, click: &NewClickEvent) -> Result<()>;

    /// List click events for a link, newest first
    async fn list_clicks(&self, link_id: i64) -> Result<Vec<ClickEvent>>;
}
