//! # Domain Records
//!
//! Storage-side representation of short URLs and their daily counters.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A stored short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Sequential storage id.
    pub id: u64,
    /// Identifier exposed over HTTP.
    pub public_id: Uuid,
    /// Unique short alias.
    pub alias: String,
    /// Redirect target.
    pub destination_url: String,
    /// Owner.
    pub user_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// After this instant the alias no longer resolves.
    pub expires_at: Option<DateTime<Utc>>,
    /// Cleared by a delete.
    pub is_active: bool,
    /// Lifetime number of redirects.
    pub redirect_count: i64,
    /// Time of the latest redirect.
    pub last_redirect_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// True once `expires_at` is in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }

    /// Counts one redirect.
    pub fn record_redirect(&mut self, now: DateTime<Utc>) {
        self.redirect_count += 1;
        self.last_redirect_at = Some(now);
    }

    /// Whether `user_id` owns this URL.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Fields supplied when a URL is first stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrl {
    /// Unique short alias.
    pub alias: String,
    /// Redirect target.
    pub destination_url: String,
    /// Owner.
    pub user_id: String,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Used for both `created_at` and `updated_at`.
    pub created_at: DateTime<Utc>,
}

/// Redirect counters for one URL on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStats {
    /// Storage id of the URL.
    pub url_id: u64,
    /// Day the row counts (UTC).
    pub stat_date: NaiveDate,
    /// Redirects on that day.
    pub redirect_count: i64,
    /// Distinct visitors on that day. Not tracked yet, always 0.
    pub unique_visitors: i64,
}

impl DailyStats {
    /// An empty row.
    pub fn new(url_id: u64, stat_date: NaiveDate) -> Self {
        Self {
            url_id,
            stat_date,
            redirect_count: 0,
            unique_visitors: 0,
        }
    }
}

/// Zero-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page index.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl PageRequest {
    /// Number of items preceding this page.
    pub fn offset(&self) -> usize {
        self.page as usize * self.page_size as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Page index.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Matching items across all pages.
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total_items`.
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(u64::from(self.page_size)) as u32
    }

    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < u64::from(self.total_pages())
    }
}
