//! # Redirect Service

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::ServiceResult;
use crate::repository::{UrlRepository, UrlStatsRepository};

/// Resolves aliases and counts redirects.
#[derive(Clone)]
pub struct RedirectService {
    urls: Arc<dyn UrlRepository>,
    stats: Arc<dyn UrlStatsRepository>,
}

impl RedirectService {
    /// Service over the URL and statistics repositories.
    pub fn new(urls: Arc<dyn UrlRepository>, stats: Arc<dyn UrlStatsRepository>) -> Self {
        Self { urls, stats }
    }

    /// Destination of an active, unexpired alias.
    pub fn resolve_alias(&self, alias: &str) -> Option<String> {
        let Some(url) = self.urls.find_active_by_alias(alias) else {
            debug!(alias, "alias not found or inactive");
            return None;
        };
        if url.is_expired(Utc::now()) {
            debug!(alias, "alias expired");
            return None;
        }
        Some(url.destination_url)
    }

    /// Counts a redirect on the URL and on today's statistics row.
    ///
    /// Returns `false` when the alias is not active.
    pub fn track_redirect(&self, alias: &str) -> ServiceResult<bool> {
        let now = Utc::now();
        let Some(url) = self.urls.record_redirect(alias, now)? else {
            return Ok(false);
        };
        self.stats.increment_daily(url.id, now.date_naive())?;
        debug!(alias, count = url.redirect_count, "tracked redirect");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUrl;
    use crate::repository::MemoryStore;
    use chrono::Duration;

    fn setup() -> (Arc<MemoryStore>, RedirectService) {
        let store = Arc::new(MemoryStore::new());
        let service = RedirectService::new(store.clone(), store.clone());
        (store, service)
    }

    fn insert(store: &MemoryStore, alias: &str, expires_in: Option<Duration>) {
        let now = Utc::now();
        store
            .insert(NewUrl {
                alias: alias.into(),
                destination_url: "https://example.com".into(),
                user_id: "alice".into(),
                expires_at: expires_in.map(|d| now + d),
                created_at: now,
            })
            .unwrap();
    }

    #[test]
    fn test_resolve_active_alias() {
        let (store, service) = setup();
        insert(&store, "live", Some(Duration::hours(1)));
        assert_eq!(service.resolve_alias("live").as_deref(), Some("https://example.com"));
        assert_eq!(service.resolve_alias("missing"), None);
    }

    #[test]
    fn test_expired_and_inactive_do_not_resolve() {
        let (store, service) = setup();
        insert(&store, "old", Some(Duration::hours(-1)));
        assert_eq!(service.resolve_alias("old"), None);

        insert(&store, "off", None);
        let mut url = store.find_by_alias("off").unwrap();
        url.is_active = false;
        store.save(url).unwrap();
        assert_eq!(service.resolve_alias("off"), None);
        assert!(!service.track_redirect("off").unwrap());
    }

    #[test]
    fn test_track_redirect_updates_both_counters() {
        let (store, service) = setup();
        insert(&store, "hit", None);
        assert!(service.track_redirect("hit").unwrap());
        assert!(service.track_redirect("hit").unwrap());

        let url = store.find_by_alias("hit").unwrap();
        assert_eq!(url.redirect_count, 2);
        assert!(url.last_redirect_at.is_some());

        let today = Utc::now().date_naive();
        assert_eq!(store.sum_between(url.id, today, today), 2);
    }
}
