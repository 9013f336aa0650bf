//! `AliasApi`: the public redirect.

use super::ApiController;
use crate::generated::api::{self, HandlerError};

#[async_trait::async_trait]
impl api::AliasApi for ApiController {
    async fn resolve_alias(&self, alias: String) -> Result<api::ResolveAliasResponse, HandlerError> {
        let Some(location) = self.redirects.resolve_alias(&alias) else {
            return Ok(api::ResolveAliasResponse::NotFound);
        };
        // A failed count must not block the redirect.
        if let Err(err) = self.redirects.track_redirect(&alias) {
            tracing::error!(alias = %alias, error = %err, "failed to track redirect");
        }
        Ok(api::ResolveAliasResponse::Found { location })
    }
}
