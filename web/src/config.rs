//! # Configuration
//!
//! Command line flags, each backed by an environment variable. `.env` is
//! loaded by the binary before parsing.

use clap::Parser;

/// Runtime settings of the service.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(author, version, about = "tiny-url: contract-first URL shortener")]
pub struct AppConfig {
    /// Address to listen on.
    #[clap(long, env = "TINYURL_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Prefix of generated short links.
    #[clap(long, env = "TINYURL_BASE_URL", default_value = "https://tiny.url/")]
    pub base_url: String,

    /// Owner used when a request carries no `X-User-Id`.
    #[clap(long, env = "TINYURL_DEFAULT_USER", default_value = "anonymous")]
    pub default_user: String,

    /// Length of random aliases.
    #[clap(
        long,
        env = "TINYURL_ALIAS_LENGTH",
        default_value_t = 7,
        value_parser = clap::value_parser!(u16).range(4..=32)
    )]
    pub alias_length: u16,

    /// Page size when `pageSize` is omitted.
    #[clap(
        long,
        env = "TINYURL_DEFAULT_PAGE_SIZE",
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub default_page_size: u32,

    /// Days covered by statistics when `rangeStart` is omitted.
    #[clap(long, env = "TINYURL_STATS_WINDOW_DAYS", default_value_t = 30)]
    pub stats_window_days: u64,

    /// Log filter, e.g. `info` or `tinyurl_web=debug`.
    #[clap(long, env = "TINYURL_LOG", default_value = "info")]
    pub log: String,

    /// Start and immediately stop the server.
    #[clap(long, env = "TINYURL_ONESHOT")]
    pub oneshot: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
            base_url: "https://tiny.url/".into(),
            default_user: "anonymous".into(),
            alias_length: 7,
            default_page_size: 20,
            stats_window_days: 30,
            log: "info".into(),
            oneshot: false,
        }
    }
}
