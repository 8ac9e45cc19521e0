use crate::models::{ClickEvent, Link, LinkWithClicks, NewClickEvent, NewLink};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id BIGSERIAL PRIMARY KEY,
                alias TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                expires_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS click_events (
                id BIGSERIAL PRIMARY KEY,
                link_id BIGINT NOT NULL REFERENCES links(id),
                timestamp TIMESTAMPTZ NOT NULL,
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
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (alias) DO NOTHING
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
            WHERE alias = $1
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
            WHERE id = $1
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
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM click_events WHERE link_id = $1")
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
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
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
            WHERE link_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }
}
