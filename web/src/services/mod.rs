//! # Services
//!
//! Business logic behind the generated HTTP interfaces.

pub mod alias;
pub mod redirect_service;
pub mod stats_service;
pub mod url_service;

pub use alias::{AliasGenerator, RandomAlias};
pub use redirect_service::RedirectService;
pub use stats_service::{StatsReport, StatsService};
pub use url_service::UrlService;
