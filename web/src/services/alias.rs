//! # Aliases
//!
//! Random alias generation and the rules a custom alias has to follow.

use url::Url;

use crate::error::{ServiceError, ServiceResult};

/// Characters random aliases are drawn from.
pub const ALIAS_CHARACTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated aliases.
pub const DEFAULT_ALIAS_LENGTH: usize = 7;

/// How many random aliases are tried before giving up.
pub const MAX_ALIAS_ATTEMPTS: usize = 10;

/// Aliases that would shadow a fixed route.
pub const RESERVED_ALIASES: &[&str] = &["urls", "health"];

const CUSTOM_ALIAS_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;

/// Source of candidate aliases.
pub trait AliasGenerator: Send + Sync {
    /// Produces one candidate; uniqueness is checked by the caller.
    fn generate(&self) -> String;
}

/// Uniformly random alphanumeric aliases.
#[derive(Debug, Clone, Copy)]
pub struct RandomAlias {
    length: usize,
}

impl RandomAlias {
    /// Generator for aliases of `length` characters.
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomAlias {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_LENGTH)
    }
}

impl AliasGenerator for RandomAlias {
    fn generate(&self) -> String {
        std::iter::repeat_with(|| {
            ALIAS_CHARACTERS[rand::random_range(0..ALIAS_CHARACTERS.len())] as char
        })
        .take(self.length)
        .collect()
    }
}

/// Whether `alias` collides with a fixed route.
pub fn is_reserved(alias: &str) -> bool {
    RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
}

/// Checks a user-chosen alias.
pub fn validate_custom_alias(alias: &str) -> ServiceResult<()> {
    if !CUSTOM_ALIAS_LENGTH.contains(&alias.len()) {
        return Err(ServiceError::InvalidInput(format!(
            "customAlias must be between {} and {} characters",
            CUSTOM_ALIAS_LENGTH.start(),
            CUSTOM_ALIAS_LENGTH.end()
        )));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ServiceError::InvalidInput(
            "customAlias may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    if is_reserved(alias) {
        return Err(ServiceError::InvalidInput(format!(
            "customAlias `{}` is reserved",
            alias
        )));
    }
    Ok(())
}

/// Checks that a destination is an absolute http(s) URL and returns it in
/// serialized form, which is safe to send back as a `Location` header.
pub fn validate_destination(destination: &str) -> ServiceResult<Url> {
    let trimmed = destination.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("longUrl cannot be empty".into()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid URL format: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(ServiceError::InvalidInput("longUrl must have a host".into())),
        other => Err(ServiceError::InvalidInput(format!(
            "Invalid protocol: {}. Only http:// and https:// are allowed",
            other
        ))),
    }
}
