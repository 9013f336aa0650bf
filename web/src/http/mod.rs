//! # HTTP Layer
//!
//! `ApiController` implements the generated `UrlsApi` and `AliasApi` traits on
//! top of the services. The generated `configure` mounts it.

use std::sync::Arc;

use actix_web::{get, web, HttpResponse, Responder};

use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::generated::{api, models, server};
use crate::repository::MemoryStore;
use crate::services::{RandomAlias, RedirectService, StatsService, UrlService};

mod alias;
mod urls;

/// Handler state shared by every worker.
#[derive(Clone)]
pub struct ApiController {
    urls: UrlService,
    redirects: RedirectService,
    stats: StatsService,
    base_url: String,
    default_user: String,
}

impl ApiController {
    /// Controller over already-built services.
    pub fn new(
        urls: UrlService,
        redirects: RedirectService,
        stats: StatsService,
        base_url: impl Into<String>,
        default_user: impl Into<String>,
    ) -> Self {
        Self {
            urls,
            redirects,
            stats,
            base_url: base_url.into(),
            default_user: default_user.into(),
        }
    }

    /// Controller backed by a fresh in-memory store.
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let urls = UrlService::new(
            store.clone(),
            Arc::new(RandomAlias::new(usize::from(config.alias_length))),
        )
        .with_default_page_size(config.default_page_size);
        let redirects = RedirectService::new(store.clone(), store.clone());
        let stats = StatsService::new(store.clone(), store).with_window_days(config.stats_window_days);
        Self::new(
            urls,
            redirects,
            stats,
            config.base_url.clone(),
            config.default_user.clone(),
        )
    }

    /// The caller, or the default user when no `X-User-Id` was sent.
    fn user(&self, x_user_id: Option<String>) -> String {
        x_user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_user.clone())
    }

    /// Public short link for an alias.
    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), alias)
    }
}

/// A simple health check handler.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Registers the controller, the health check and every contract route.
pub fn configure(controller: web::Data<ApiController>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(controller).service(health_check);
        server::configure::<ApiController>(cfg);
    }
}

/// JSON error body.
fn error_body(code: models::ErrorResponseCode, err: &ServiceError) -> models::ErrorResponse {
    models::ErrorResponse {
        code,
        message: err.to_string(),
    }
}

/// An error outside the responses an operation documents.
fn unexpected(err: ServiceError) -> api::HandlerError {
    tracing::error!(error = %err, "unexpected service error");
    api::HandlerError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};

    fn controller() -> ApiController {
        ApiController::in_memory(&AppConfig::default())
    }

    #[test]
    fn test_user_falls_back_to_default() {
        let controller = controller();
        assert_eq!(controller.user(None), "anonymous");
        assert_eq!(controller.user(Some("  ".into())), "anonymous");
        assert_eq!(controller.user(Some("alice".into())), "alice");
    }

    #[test]
    fn test_short_url_joins_with_one_slash() {
        let mut controller = controller();
        assert_eq!(controller.short_url("abc"), "https://tiny.url/abc");
        controller.base_url = "https://sho.rt".into();
        assert_eq!(controller.short_url("abc"), "https://sho.rt/abc");
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = actix_test::init_service(
            App::new().configure(configure(web::Data::new(controller()))),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"OK"));
    }
}
