//! # Stats Service

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::domain::DailyStats;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{UrlRepository, UrlStatsRepository};

/// Days covered when no range start is given.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Redirect statistics for one URL over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Lifetime redirect count.
    pub total_redirects: i64,
    /// Redirects inside the window.
    pub period_redirects: i64,
    /// Time of the latest redirect.
    pub last_redirect_at: Option<DateTime<Utc>>,
    /// Daily rows inside the window, oldest first.
    pub daily: Vec<DailyStats>,
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window.
    pub end: NaiveDate,
}

/// Read side of redirect statistics.
#[derive(Clone)]
pub struct StatsService {
    urls: Arc<dyn UrlRepository>,
    stats: Arc<dyn UrlStatsRepository>,
    window_days: u64,
}

impl StatsService {
    /// Service over the URL and statistics repositories.
    pub fn new(urls: Arc<dyn UrlRepository>, stats: Arc<dyn UrlStatsRepository>) -> Self {
        Self {
            urls,
            stats,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Length of the default window.
    pub fn with_window_days(mut self, days: u64) -> Self {
        self.window_days = days;
        self
    }

    /// Statistics for an owned URL between two instants (by UTC date, inclusive).
    pub fn get_url_stats(
        &self,
        alias: &str,
        user_id: &str,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
    ) -> ServiceResult<StatsReport> {
        let url = self
            .urls
            .find_by_alias(alias)
            .ok_or_else(|| ServiceError::NotFound(alias.to_string()))?;
        if !url.is_owned_by(user_id) {
            return Err(ServiceError::Forbidden);
        }

        let today = Utc::now().date_naive();
        let start = match range_start {
            Some(start) => start.date_naive(),
            None => today
                .checked_sub_days(Days::new(self.window_days))
                .unwrap_or(NaiveDate::MIN),
        };
        let end = range_end.map_or(today, |end| end.date_naive());
        if start > end {
            return Err(ServiceError::InvalidInput(
                "rangeStart must not be after rangeEnd".into(),
            ));
        }

        Ok(StatsReport {
            total_redirects: url.redirect_count,
            period_redirects: self.stats.sum_between(url.id, start, end),
            last_redirect_at: url.last_redirect_at,
            daily: self.stats.find_between(url.id, start, end),
            start,
            end,
        })
    }
}
