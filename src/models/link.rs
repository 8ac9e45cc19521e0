use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i64,
    pub alias: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Link {
    /// A link is expired once its expiration instant lies strictly in the past.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// A link annotated with the number of recorded clicks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkWithClicks {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub link: Link,
    pub clicks: i64,
}

/// Validated input for the link store
#[derive(Debug, Clone)]
pub struct NewLink {
    pub alias: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub original_url: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
