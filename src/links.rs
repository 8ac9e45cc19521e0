//! Link creation flow: validation, alias generation, uniqueness, insert

use thiserror::Error;
use tracing::{debug, info};

use crate::alias::generate_alias;
use crate::models::{CreateLinkRequest, Link, NewLink};
use crate::storage::{Storage, StorageError};
use crate::validation::{validate_alias, validate_original_url, ValidationError};

/// How many fresh aliases to try before reporting a collision
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum CreateLinkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("alias already exists")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Validate a create request and insert the link.
///
/// An omitted or empty alias is replaced by a generated one. Custom aliases
/// that are already taken fail with [`CreateLinkError::Conflict`]; the
/// store's unique constraint backs up the pre-check for racing creates.
pub async fn create_link(
    storage: &dyn Storage,
    request: CreateLinkRequest,
    alias_max_length: Option<usize>,
) -> Result<Link, CreateLinkError> {
    let custom_alias = request.alias.filter(|alias| !alias.is_empty());

    if let Some(alias) = custom_alias.as_deref() {
        validate_alias(alias, alias_max_length)?;
    }
    let original_url = validate_original_url(request.original_url.as_deref())?.to_string();

    match custom_alias {
        Some(alias) => {
            if storage.get_link_by_alias(&alias).await?.is_some() {
                return Err(CreateLinkError::Conflict);
            }
            insert(
                storage,
                NewLink {
                    alias,
                    original_url,
                    expires_at: request.expires_at,
                },
            )
            .await
        }
        None => {
            for attempt in 1..=MAX_GENERATION_ATTEMPTS {
                let alias = generate_alias();
                if storage.get_link_by_alias(&alias).await?.is_some() {
                    debug!(alias = %alias, attempt, "generated alias already taken");
                    continue;
                }

                let new_link = NewLink {
                    alias,
                    original_url: original_url.clone(),
                    expires_at: request.expires_at,
                };
                match insert(storage, new_link).await {
                    Err(CreateLinkError::Conflict) => {
                        debug!(attempt, "generated alias lost an insert race");
                    }
                    result => return result,
                }
            }
            Err(CreateLinkError::Conflict)
        }
    }
}

async fn insert(storage: &dyn Storage, new_link: NewLink) -> Result<Link, CreateLinkError> {
    match storage.create_link(&new_link).await {
        Ok(link) => {
            info!(alias = %link.alias, id = link.id, "created link");
            Ok(link)
        }
        Err(StorageError::Conflict) => Err(CreateLinkError::Conflict),
        Err(StorageError::Other(e)) => Err(CreateLinkError::Storage(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClickEvent, LinkWithClicks, NewClickEvent};
    use crate::storage::{SqliteStorage, StorageResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// How the wrapped store answers alias lookups
    enum Lookup {
        /// Every alias looks free
        AlwaysFree,
        /// Every alias looks taken
        AlwaysTaken,
    }

    struct SkewedLookupStorage {
        inner: Arc<dyn Storage>,
        lookup: Lookup,
        lookups: AtomicUsize,
    }

    impl SkewedLookupStorage {
        fn new(inner: Arc<dyn Storage>, lookup: Lookup) -> Self {
            Self {
                inner,
                lookup,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Storage for SkewedLookupStorage {
        async fn init(&self) -> anyhow::Result<()> {
            self.inner.init().await
        }

        async fn create_link(&self, link: &NewLink) -> StorageResult<Link> {
            self.inner.create_link(link).await
        }

        async fn get_link_by_alias(&self, alias: &str) -> anyhow::Result<Option<Link>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match self.lookup {
                Lookup::AlwaysFree => Ok(None),
                Lookup::AlwaysTaken => {
                    let links = self.inner.list_links().await?;
                    Ok(links.into_iter().next().map(|entry| Link {
                        alias: alias.to_string(),
                        ..entry.link
                    }))
                }
            }
        }

        async fn get_link_by_id(&self, id: i64) -> anyhow::Result<Option<Link>> {
            self.inner.get_link_by_id(id).await
        }

        async fn list_links(&self) -> anyhow::Result<Vec<LinkWithClicks>> {
            self.inner.list_links().await
        }

        async fn count_clicks(&self, link_id: i64) -> anyhow::Result<i64> {
            self.inner.count_clicks(link_id).await
        }

        async fn record_click(&self, click: &NewClickEvent) -> anyhow::Result<()> {
            self.inner.record_click(click).await
        }

        async fn list_clicks(&self, link_id: i64) -> anyhow::Result<Vec<ClickEvent>> {
            self.inner.list_clicks(link_id).await
        }
    }

    async fn seeded_storage() -> Arc<dyn Storage> {
        let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
        storage.init().await.unwrap();
        storage
            .create_link(&NewLink {
                alias: "seed".to_string(),
                original_url: "https://example.com/original".to_string(),
                expires_at: None,
            })
            .await
            .unwrap();
        Arc::new(storage)
    }

    fn request(alias: Option<&str>, url: &str) -> CreateLinkRequest {
        CreateLinkRequest {
            original_url: Some(url.to_string()),
            alias: alias.map(str::to_string),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_custom_alias_conflict_caught_by_unique_constraint() {
        let inner = seeded_storage().await;
        let storage = SkewedLookupStorage::new(Arc::clone(&inner), Lookup::AlwaysFree);

        let result = create_link(
            &storage,
            request(Some("seed"), "https://example.com/intruder"),
            None,
        )
        .await;

        assert!(matches!(result, Err(CreateLinkError::Conflict)));
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 1);

        let links = inner.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link.original_url, "https://example.com/original");
    }

    #[tokio::test]
    async fn test_generated_alias_gives_up_after_repeated_collisions() {
        let inner = seeded_storage().await;
        let storage = SkewedLookupStorage::new(Arc::clone(&inner), Lookup::AlwaysTaken);

        let result = create_link(&storage, request(None, "https://example.com/new"), None).await;

        assert!(matches!(result, Err(CreateLinkError::Conflict)));
        assert_eq!(
            storage.lookups.load(Ordering::SeqCst),
            MAX_GENERATION_ATTEMPTS
        );
        assert_eq!(inner.list_links().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let inner = seeded_storage().await;
        let storage = SkewedLookupStorage::new(inner, Lookup::AlwaysFree);

        let result = create_link(&storage, request(Some("x!"), "not a url"), None).await;

        match result {
            Err(CreateLinkError::Validation(e)) => assert_eq!(e.field, Some("alias")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 0);
    }
}
