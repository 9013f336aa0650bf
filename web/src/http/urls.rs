//! `UrlsApi`: management endpoints under `/urls`.

use chrono::{DateTime, Utc};

use super::{error_body, unexpected, ApiController};
use crate::domain::UrlRecord;
use crate::error::ServiceError;
use crate::generated::api::{self, HandlerError};
use crate::generated::models::{self, ErrorResponseCode};
use crate::services::StatsReport;

impl ApiController {
    fn to_resource(&self, url: &UrlRecord) -> models::UrlResource {
        models::UrlResource {
            id: url.public_id,
            alias: url.alias.clone(),
            long_url: url.destination_url.clone(),
            short_url: self.short_url(&url.alias),
            created_at: url.created_at,
            updated_at: Some(url.updated_at),
            expires_at: url.expires_at,
            active: url.is_active,
        }
    }

    fn to_stats(alias: String, report: StatsReport) -> models::UrlStats {
        models::UrlStats {
            alias,
            total_redirects: report.total_redirects,
            period_redirects: report.period_redirects,
            unique_visitors: 0,
            last_redirect_at: report.last_redirect_at,
            time_series: report
                .daily
                .into_iter()
                .map(|row| models::DailyRedirectMetrics {
                    date: row.stat_date,
                    redirect_count: row.redirect_count,
                    unique_visitors: row.unique_visitors,
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl api::UrlsApi for ApiController {
    async fn create_url(
        &self,
        x_user_id: Option<String>,
        body: models::CreateUrlRequest,
    ) -> Result<api::CreateUrlResponse, HandlerError> {
        let user = self.user(x_user_id);
        match self.urls.create_url(
            &body.long_url,
            body.custom_alias.as_deref(),
            body.expires_at,
            &user,
        ) {
            Ok(url) => Ok(api::CreateUrlResponse::Created(self.to_resource(&url))),
            Err(err @ ServiceError::InvalidInput(_)) => Ok(api::CreateUrlResponse::BadRequest(
                error_body(ErrorResponseCode::BadRequest, &err),
            )),
            Err(err @ ServiceError::Conflict(_)) => Ok(api::CreateUrlResponse::Conflict(
                error_body(ErrorResponseCode::Conflict, &err),
            )),
            Err(err) => Err(unexpected(err)),
        }
    }

    async fn list_urls(
        &self,
        x_user_id: Option<String>,
        page: Option<i32>,
        page_size: Option<i32>,
        search: Option<String>,
    ) -> Result<api::ListUrlsResponse, HandlerError> {
        let user = self.user(x_user_id);
        let found = match self
            .urls
            .list_urls(&user, search.as_deref(), page, page_size)
        {
            Ok(found) => found,
            Err(err @ ServiceError::InvalidInput(_)) => {
                return Ok(api::ListUrlsResponse::BadRequest(error_body(
                    ErrorResponseCode::BadRequest,
                    &err,
                )))
            }
            Err(err) => return Err(unexpected(err)),
        };

        let body = models::ListUrlsResponse {
            data: found.items.iter().map(|url| self.to_resource(url)).collect(),
            page: found.page as i32,
            page_size: found.page_size as i32,
            total_items: found.total_items as i64,
            total_pages: found.total_pages() as i32,
            next_page: found.has_next().then(|| found.page as i32 + 1),
        };
        Ok(api::ListUrlsResponse::Ok {
            x_total_count: body.total_items,
            body,
        })
    }

    async fn get_url(
        &self,
        alias: String,
        x_user_id: Option<String>,
    ) -> Result<api::GetUrlResponse, HandlerError> {
        let user = self.user(x_user_id);
        match self.urls.find_owned(&alias, &user) {
            Ok(url) => Ok(api::GetUrlResponse::Ok(self.to_resource(&url))),
            Err(err @ ServiceError::Forbidden) => Ok(api::GetUrlResponse::Forbidden(error_body(
                ErrorResponseCode::Forbidden,
                &err,
            ))),
            Err(err @ ServiceError::NotFound(_)) => Ok(api::GetUrlResponse::NotFound(error_body(
                ErrorResponseCode::NotFound,
                &err,
            ))),
            Err(err) => Err(unexpected(err)),
        }
    }

    async fn update_url(
        &self,
        alias: String,
        x_user_id: Option<String>,
        body: models::UpdateUrlRequest,
    ) -> Result<api::UpdateUrlResponse, HandlerError> {
        let user = self.user(x_user_id);
        match self
            .urls
            .update_url(&alias, &user, body.long_url.as_deref(), body.expires_at)
        {
            Ok(url) => Ok(api::UpdateUrlResponse::Ok(self.to_resource(&url))),
            Err(err @ ServiceError::InvalidInput(_)) => Ok(api::UpdateUrlResponse::BadRequest(
                error_body(ErrorResponseCode::BadRequest, &err),
            )),
            Err(err @ ServiceError::Forbidden) => Ok(api::UpdateUrlResponse::Forbidden(
                error_body(ErrorResponseCode::Forbidden, &err),
            )),
            Err(err @ ServiceError::NotFound(_)) => Ok(api::UpdateUrlResponse::NotFound(
                error_body(ErrorResponseCode::NotFound, &err),
            )),
            Err(err) => Err(unexpected(err)),
        }
    }

    async fn delete_url(
        &self,
        alias: String,
        x_user_id: Option<String>,
    ) -> Result<api::DeleteUrlResponse, HandlerError> {
        let user = self.user(x_user_id);
        match self.urls.delete_url(&alias, &user) {
            Ok(()) => Ok(api::DeleteUrlResponse::NoContent),
            Err(err @ ServiceError::Forbidden) => Ok(api::DeleteUrlResponse::Forbidden(
                error_body(ErrorResponseCode::Forbidden, &err),
            )),
            Err(err @ ServiceError::NotFound(_)) => Ok(api::DeleteUrlResponse::NotFound(
                error_body(ErrorResponseCode::NotFound, &err),
            )),
            Err(err @ ServiceError::Conflict(_)) => Ok(api::DeleteUrlResponse::Conflict(
                error_body(ErrorResponseCode::Conflict, &err),
            )),
            Err(err) => Err(unexpected(err)),
        }
    }

    async fn get_url_stats(
        &self,
        alias: String,
        x_user_id: Option<String>,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
    ) -> Result<api::GetUrlStatsResponse, HandlerError> {
        let user = self.user(x_user_id);
        match self
            .stats
            .get_url_stats(&alias, &user, range_start, range_end)
        {
            Ok(report) => Ok(api::GetUrlStatsResponse::Ok(Self::to_stats(alias, report))),
            Err(err @ ServiceError::InvalidInput(_)) => Ok(api::GetUrlStatsResponse::BadRequest(
                error_body(ErrorResponseCode::BadRequest, &err),
            )),
            Err(err @ ServiceError::Forbidden) => Ok(api::GetUrlStatsResponse::Forbidden(
                error_body(ErrorResponseCode::Forbidden, &err),
            )),
            Err(err @ ServiceError::NotFound(_)) => Ok(api::GetUrlStatsResponse::NotFound(
                error_body(ErrorResponseCode::NotFound, &err),
            )),
            Err(err) => Err(unexpected(err)),
        }
    }
}
