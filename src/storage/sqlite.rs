use crate::models::{ClickEvent, Link, LinkWithClicks, NewClickEvent, NewLink};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                alias TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS click_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                link_id INTEGER NOT NULL REFERENCES links(id),
                timestamp TEXT NOT NULL,
                ip TEXT,
                city TEXT,
                country TEXT,
                user_agent TEXT,
                device TEXT,
                browser TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_created_at ON links(created_at)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_click_events_link ON click_events(link_id, timestamp)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_link(&self, link: &NewLink) -> StorageResult<Link> {
        let created = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (alias, original_url, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(alias) DO NOTHING
            RETURNING id, alias, original_url, created_at, expires_at
            "#,
        )
        .bind(&link.alias)
        .bind(&link.original_url)
        .bind(Utc::now())
        .bind(link.expires_at)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        created.ok_or(StorageError::Conflict)
    }

    async fn get_link_by_alias(&self, alias: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, alias, original_url, created_at, expires_at
            FROM links
            WHERE alias = ?
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn get_link_by_id(&self, id: i64) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, alias, original_url, created_at, expires_at
            FROM links
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list_links(&self) -> Result<Vec<LinkWithClicks>> {
        let links = sqlx::query_as::<_, LinkWithClicks>(
            r#"
            SELECT l.id, l.alias, l.original_url, l.created_at, l.expires_at,
                   COUNT(c.id) AS clicks
            FROM links l
            LEFT JOIN click_events c ON c.link_id = l.id
            GROUP BY l.id
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM click_events WHERE link_id = ?")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn record_click(&self, click: &NewClickEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO click_events
                (link_id, timestamp, ip, city, country, user_agent, device, browser)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(click.link_id)
        .bind(Utc::now())
        .bind(&click.ip)
        .bind(&click.city)
        .bind(&click.country)
        .bind(&click.user_agent)
        .bind(&click.device)
        .bind(&click.browser)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_clicks(&self, link_id: i64) -> Result<Vec<ClickEvent>> {
        let clicks = sqlx::query_as::<_, ClickEvent>(
            r#"
            SELECT id, link_id, timestamp, ip, city, country, user_agent, device, browser
            FROM click_events
            WHERE link_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }
}
