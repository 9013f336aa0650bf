//! # Repositories
//!
//! Storage traits used by the services, and the in-memory store behind them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{DailyStats, NewUrl, Page, PageRequest, UrlRecord};

/// Storage failures.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Another URL already uses the alias.
    #[display("alias `{_0}` already exists")]
    DuplicateAlias(String),

    /// No URL with this storage id.
    #[display("no url with id {_0}")]
    UnknownUrl(u64),
}

impl std::error::Error for RepoError {}

/// Access to stored short URLs.
pub trait UrlRepository: Send + Sync {
    /// Stores a new, active URL.
    fn insert(&self, url: NewUrl) -> Result<UrlRecord, RepoError>;

    /// Any URL with this alias, active or not.
    fn find_by_alias(&self, alias: &str) -> Option<UrlRecord>;

    /// The URL with this alias if it is still active.
    fn find_active_by_alias(&self, alias: &str) -> Option<UrlRecord>;

    /// Whether any URL uses the alias.
    fn exists_by_alias(&self, alias: &str) -> bool;

    /// Replaces a stored URL.
    fn save(&self, url: UrlRecord) -> Result<UrlRecord, RepoError>;

    /// A user's URLs, newest first, optionally filtered by a substring of the
    /// alias or destination.
    fn find_by_user(&self, user_id: &str, search: Option<&str>, page: PageRequest)
        -> Page<UrlRecord>;

    /// Counts a redirect on an active URL and returns the updated record.
    fn record_redirect(&self, alias: &str, at: DateTime<Utc>)
        -> Result<Option<UrlRecord>, RepoError>;
}

/// Access to daily redirect counters.
pub trait UrlStatsRepository: Send + Sync {
    /// Adds one redirect to the row for `(url_id, date)`, creating it if needed.
    fn increment_daily(&self, url_id: u64, date: NaiveDate) -> Result<DailyStats, RepoError>;

    /// Rows for a URL between two dates (inclusive), oldest first.
    fn find_between(&self, url_id: u64, start: NaiveDate, end: NaiveDate) -> Vec<DailyStats>;

    /// Sum of redirects between two dates (inclusive).
    fn sum_between(&self, url_id: u64, start: NaiveDate, end: NaiveDate) -> i64;
}

#[derive(Debug, Default)]
struct UrlTable {
    next_id: u64,
    by_alias: HashMap<String, UrlRecord>,
}

/// Process-local store implementing both repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    urls: RwLock<UrlTable>,
    stats: RwLock<BTreeMap<(u64, NaiveDate), DailyStats>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UrlRepository for MemoryStore {
    fn insert(&self, url: NewUrl) -> Result<UrlRecord, RepoError> {
        let mut table = self.urls.write();
        if table.by_alias.contains_key(&url.alias) {
            return Err(RepoError::DuplicateAlias(url.alias));
        }
        table.next_id += 1;
        let record = UrlRecord {
            id: table.next_id,
            public_id: Uuid::new_v4(),
            alias: url.alias,
            destination_url: url.destination_url,
            user_id: url.user_id,
            created_at: url.created_at,
            updated_at: url.created_at,
            expires_at: url.expires_at,
            is_active: true,
            redirect_count: 0,
            last_redirect_at: None,
        };
        table.by_alias.insert(record.alias.clone(), record.clone());
        Ok(record)
    }

    fn find_by_alias(&self, alias: &str) -> Option<UrlRecord> {
        self.urls.read().by_alias.get(alias).cloned()
    }

    fn find_active_by_alias(&self, alias: &str) -> Option<UrlRecord> {
        self.find_by_alias(alias).filter(|url| url.is_active)
    }

    fn exists_by_alias(&self, alias: &str) -> bool {
        self.urls.read().by_alias.contains_key(alias)
    }

    fn save(&self, url: UrlRecord) -> Result<UrlRecord, RepoError> {
        let mut table = self.urls.write();
        match table.by_alias.get_mut(&url.alias) {
            Some(stored) if stored.id == url.id => {
                *stored = url.clone();
                Ok(url)
            }
            _ => Err(RepoError::UnknownUrl(url.id)),
        }
    }

    fn find_by_user(
        &self,
        user_id: &str,
        search: Option<&str>,
        page: PageRequest,
    ) -> Page<UrlRecord> {
        let table = self.urls.read();
        let mut matching: Vec<&UrlRecord> = table
            .by_alias
            .values()
            .filter(|url| url.user_id == user_id)
            .filter(|url| match search {
                Some(term) => url.alias.contains(term) || url.destination_url.contains(term),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Page {
            total_items: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(page.offset())
                .take(page.page_size as usize)
                .cloned()
                .collect(),
            page: page.page,
            page_size: page.page_size,
        }
    }

    fn record_redirect(
        &self,
        alias: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<UrlRecord>, RepoError> {
        let mut table = self.urls.write();
        Ok(table
            .by_alias
            .get_mut(alias)
            .filter(|url| url.is_active)
            .map(|url| {
                url.record_redirect(at);
                url.clone()
            }))
    }
}

impl UrlStatsRepository for MemoryStore {
    fn increment_daily(&self, url_id: u64, date: NaiveDate) -> Result<DailyStats, RepoError> {
        let mut stats = self.stats.write();
        let row = stats
            .entry((url_id, date))
            .or_insert_with(|| DailyStats::new(url_id, date));
        row.redirect_count += 1;
        Ok(*row)
    }

    fn find_between(&self, url_id: u64, start: NaiveDate, end: NaiveDate) -> Vec<DailyStats> {
        if start > end {
            return Vec::new();
        }
        self.stats
            .read()
            .range((url_id, start)..=(url_id, end))
            .map(|(_, row)| *row)
            .collect()
    }

    fn sum_between(&self, url_id: u64, start: NaiveDate, end: NaiveDate) -> i64 {
        self.find_between(url_id, start, end)
            .iter()
            .map(|row| row.redirect_count)
            .sum()
    }
}
