#![deny(missing_docs)]

//! # Generator Configuration
//!
//! The three knobs that shape generated output. Everything else about the
//! output is fixed: same contract plus same knobs gives byte-identical files.

use crate::error::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;

/// Web framework the `server.rs` bindings target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framework {
    /// actix-web 4 (`configure::<T>(&mut ServiceConfig)`).
    #[default]
    ActixWeb,
    /// axum (`router(Arc<T>) -> Router`).
    Axum,
    /// No framework bindings; only models and traits are emitted.
    None,
}

impl FromStr for Framework {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "actix-web" | "actix_web" | "actix" => Ok(Framework::ActixWeb),
            "axum" => Ok(Framework::Axum),
            "none" => Ok(Framework::None),
            other => Err(AppError::Config(format!(
                "unknown framework `{}` (expected actix-web, axum or none)",
                other
            ))),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Framework::ActixWeb => "actix-web",
            Framework::Axum => "axum",
            Framework::None => "none",
        })
    }
}

/// Rust types used for `date` and `date-time` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLibrary {
    /// `chrono::DateTime<chrono::Utc>` and `chrono::NaiveDate`.
    #[default]
    Chrono,
    /// `time::OffsetDateTime` (RFC 3339 on the wire) and `time::Date`.
    Time,
    /// Plain `String`.
    String,
}

impl FromStr for DateLibrary {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrono" => Ok(DateLibrary::Chrono),
            "time" => Ok(DateLibrary::Time),
            "string" => Ok(DateLibrary::String),
            other => Err(AppError::Config(format!(
                "unknown date library `{}` (expected chrono, time or string)",
                other
            ))),
        }
    }
}

impl fmt::Display for DateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateLibrary::Chrono => "chrono",
            DateLibrary::Time => "time",
            DateLibrary::String => "string",
        })
    }
}

/// Options controlling code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// When true, trait methods carry no default body.
    pub interface_only: bool,
    /// Target framework for `server.rs`.
    pub framework: Framework,
    /// Date/time representation in models.
    pub date_library: DateLibrary,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interface_only: true,
            framework: Framework::default(),
            date_library: DateLibrary::default(),
        }
    }
}

impl GeneratorConfig {
    /// Applies a single `key=value` option using the contract-tooling key names
    /// (`interfaceOnly`, `framework`, `dateLibrary`).
    pub fn apply_option(&mut self, key: &str, value: &str) -> AppResult<()> {
        match key {
            "interfaceOnly" => {
                self.interface_only = value.trim().parse::<bool>().map_err(|_| {
                    AppError::Config(format!(
                        "interfaceOnly expects true or false, got `{}`",
                        value
                    ))
                })?;
            }
            "framework" | "library" => self.framework = value.parse()?,
            "dateLibrary" => self.date_library = value.parse()?,
            other => {
                return Err(AppError::Config(format!(
                    "unknown generator option `{}`",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Builds a configuration from defaults plus a list of options.
    pub fn from_options<K, V, I>(options: I) -> AppResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            config.apply_option(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }
}
