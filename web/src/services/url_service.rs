//! # URL Service
//!
//! Creation, lookup, listing, update and soft delete of short URLs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{NewUrl, Page, PageRequest, UrlRecord};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::UrlRepository;
use crate::services::alias::{self, AliasGenerator, MAX_ALIAS_ATTEMPTS};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Business rules for managing short URLs.
#[derive(Clone)]
pub struct UrlService {
    urls: Arc<dyn UrlRepository>,
    aliases: Arc<dyn AliasGenerator>,
    default_page_size: u32,
}

impl UrlService {
    /// Service over a repository and an alias source.
    pub fn new(urls: Arc<dyn UrlRepository>, aliases: Arc<dyn AliasGenerator>) -> Self {
        Self {
            urls,
            aliases,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used when the caller does not ask for one.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Stores a new short URL owned by `user_id`.
    pub fn create_url(
        &self,
        destination: &str,
        custom_alias: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        user_id: &str,
    ) -> ServiceResult<UrlRecord> {
        let destination = alias::validate_destination(destination)?;
        let alias = match custom_alias {
            Some(custom) => {
                alias::validate_custom_alias(custom)?;
                if self.urls.exists_by_alias(custom) {
                    return Err(ServiceError::Conflict(format!(
                        "Alias already exists: {}",
                        custom
                    )));
                }
                custom.to_string()
            }
            None => self.generate_unique_alias()?,
        };

        let record = self.urls.insert(NewUrl {
            alias,
            destination_url: String::from(destination),
            user_id: user_id.to_string(),
            expires_at,
            created_at: Utc::now(),
        })?;
        info!(alias = %record.alias, user = %record.user_id, "short url created");
        Ok(record)
    }

    fn generate_unique_alias(&self) -> ServiceResult<String> {
        for attempt in 1..=MAX_ALIAS_ATTEMPTS {
            let candidate = self.aliases.generate();
            if !alias::is_reserved(&candidate) && !self.urls.exists_by_alias(&candidate) {
                return Ok(candidate);
            }
            debug!(attempt, alias = %candidate, "generated alias collided");
        }
        Err(ServiceError::AliasExhausted(MAX_ALIAS_ATTEMPTS))
    }

    /// Any URL with this alias, active or not.
    pub fn find_by_alias(&self, alias: &str) -> Option<UrlRecord> {
        self.urls.find_by_alias(alias)
    }

    /// The URL with this alias, provided `user_id` owns it.
    pub fn find_owned(&self, alias: &str, user_id: &str) -> ServiceResult<UrlRecord> {
        let url = self
            .find_by_alias(alias)
            .ok_or_else(|| ServiceError::NotFound(alias.to_string()))?;
        if !url.is_owned_by(user_id) {
            return Err(ServiceError::Forbidden);
        }
        Ok(url)
    }

    /// One page of the user's URLs, newest first.
    pub fn list_urls(
        &self,
        user_id: &str,
        search: Option<&str>,
        page: Option<i32>,
        page_size: Option<i32>,
    ) -> ServiceResult<Page<UrlRecord>> {
        let request = self.page_request(page, page_size)?;
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        Ok(self.urls.find_by_user(user_id, search, request))
    }

    fn page_request(&self, page: Option<i32>, page_size: Option<i32>) -> ServiceResult<PageRequest> {
        let page = match page {
            None => 0,
            Some(page) => u32::try_from(page)
                .map_err(|_| ServiceError::InvalidInput("page must be >= 0".into()))?,
        };
        let page_size = match page_size {
            None => self.default_page_size,
            Some(size) => u32::try_from(size)
                .ok()
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .ok_or_else(|| {
                    ServiceError::InvalidInput(format!(
                        "pageSize must be between 1 and {}",
                        MAX_PAGE_SIZE
                    ))
                })?,
        };
        Ok(PageRequest { page, page_size })
    }

    /// Changes the destination and/or expiry of an owned URL.
    pub fn update_url(
        &self,
        alias: &str,
        user_id: &str,
        destination: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<UrlRecord> {
        let mut url = self.find_owned(alias, user_id)?;
        if let Some(destination) = destination {
            url.destination_url = String::from(alias::validate_destination(destination)?);
        }
        if let Some(expires_at) = expires_at {
            url.expires_at = Some(expires_at);
        }
        url.updated_at = Utc::now();
        Ok(self.urls.save(url)?)
    }

    /// Deactivates an owned URL.
    pub fn delete_url(&self, alias: &str, user_id: &str) -> ServiceResult<()> {
        let mut url = self.find_owned(alias, user_id)?;
        if !url.is_active {
            return Err(ServiceError::Conflict("URL is already inactive".into()));
        }
        url.is_active = false;
        url.updated_at = Utc::now();
        self.urls.save(url)?;
        info!(alias, user = user_id, "short url deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    /// Hands out a fixed sequence of aliases, repeating the last one.
    struct Scripted(Mutex<Vec<&'static str>>);

    impl AliasGenerator for Scripted {
        fn generate(&self) -> String {
            let mut queue = self.0.lock();
            if queue.len() > 1 {
                queue.remove(0).to_string()
            } else {
                queue[0].to_string()
            }
        }
    }

    fn service_with(aliases: Vec<&'static str>) -> UrlService {
        UrlService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Scripted(Mutex::new(aliases))),
        )
    }

    #[test]
    fn test_create_with_custom_alias() {
        let service = service_with(vec!["unused1"]);
        let url = service
            .create_url("https://example.com", Some("docs"), None, "alice")
            .unwrap();
        assert_eq!(url.alias, "docs");
        assert!(url.is_active);
        assert_eq!(url.redirect_count, 0);

        let err = service
            .create_url("https://example.org", Some("docs"), None, "bob")
            .unwrap_err();
        assert_eq!(err, ServiceError::Conflict("Alias already exists: docs".into()));
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let service = service_with(vec!["unused1"]);
        assert!(matches!(
            service.create_url("not a url", None, None, "alice"),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            service.create_url("https://example.com", Some("health"), None, "alice"),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_generated_alias_retries_on_collision() {
        let service = service_with(vec!["taken01", "fresh01"]);
        service
            .create_url("https://example.com", Some("taken01"), None, "alice")
            .unwrap();
        let url = service
            .create_url("https://example.com", None, None, "alice")
            .unwrap();
        assert_eq!(url.alias, "fresh01");
    }

    #[test]
    fn test_generated_alias_gives_up() {
        let service = service_with(vec!["taken01"]);
        service
            .create_url("https://example.com", Some("taken01"), None, "alice")
            .unwrap();
        let err = service
            .create_url("https://example.com", None, None, "alice")
            .unwrap_err();
        assert_eq!(err, ServiceError::AliasExhausted(MAX_ALIAS_ATTEMPTS));
    }

    #[test]
    fn test_ownership_checks() {
        let service = service_with(vec!["unused1"]);
        service
            .create_url("https://example.com", Some("mine"), None, "alice")
            .unwrap();

        assert_eq!(service.find_owned("mine", "bob"), Err(ServiceError::Forbidden));
        assert_eq!(
            service.update_url("mine", "bob", Some("https://x.org"), None),
            Err(ServiceError::Forbidden)
        );
        assert_eq!(service.delete_url("mine", "bob"), Err(ServiceError::Forbidden));
        assert!(matches!(
            service.delete_url("nope", "alice"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let service = service_with(vec!["unused1"]);
        let created = service
            .create_url("https://example.com", Some("edit"), None, "alice")
            .unwrap();
        let updated = service
            .update_url("edit", "alice", None, None)
            .unwrap();
        assert_eq!(updated.destination_url, created.destination_url);
        assert_eq!(updated.expires_at, None);
        assert!(updated.updated_at >= created.updated_at);

        let updated = service
            .update_url("edit", "alice", Some("https://example.org/new"), None)
            .unwrap();
        assert_eq!(updated.destination_url, "https://example.org/new");
    }

    #[test]
    fn test_delete_twice_conflicts() {
        let service = service_with(vec!["unused1"]);
        service
            .create_url("https://example.com", Some("bye"), None, "alice")
            .unwrap();
        service.delete_url("bye", "alice").unwrap();
        assert_eq!(
            service.delete_url("bye", "alice"),
            Err(ServiceError::Conflict("URL is already inactive".into()))
        );
        assert!(!service.find_by_alias("bye").unwrap().is_active);
    }

    #[test]
    fn test_list_validates_paging() {
        let service = service_with(vec!["unused1"]);
        assert!(service.list_urls("alice", None, Some(-1), None).is_err());
        assert!(service.list_urls("alice", None, None, Some(0)).is_err());
        assert!(service.list_urls("alice", None, None, Some(101)).is_err());

        let page = service.list_urls("alice", Some("  "), None, None).unwrap();
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_items, 0);
    }
}
