#![deny(missing_docs)]

//! # Build Script Integration
//!
//! Entry point for `build.rs`:
//!
//! ```no_run
//! tinyurl_core::build::Builder::new("contracts/openapi.yaml")
//!     .interface_only(true)
//!     .generate()
//!     .unwrap();
//! ```
//!
//! The crate then pulls the results in with
//! `include!(concat!(env!("OUT_DIR"), "/openapi/models.rs"))`.

use crate::config::{DateLibrary, Framework, GeneratorConfig};
use crate::error::{AppError, AppResult};
use crate::workflows::{self, GenerationReport};
use std::path::{Path, PathBuf};

/// Subdirectory of `$OUT_DIR` used when no output directory is given.
pub const DEFAULT_OUT_SUBDIR: &str = "openapi";

/// Configures and runs generation from a build script.
#[derive(Debug, Clone)]
pub struct Builder {
    contract: PathBuf,
    out_dir: Option<PathBuf>,
    config: GeneratorConfig,
    rerun_if_changed: bool,
}

impl Builder {
    /// Starts a builder for the contract at `contract` (relative to the crate root).
    pub fn new(contract: impl Into<PathBuf>) -> Self {
        Self {
            contract: contract.into(),
            out_dir: None,
            config: GeneratorConfig::default(),
            rerun_if_changed: true,
        }
    }

    /// Overrides the output directory (defaults to `$OUT_DIR/openapi`).
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Interfaces and models only, no default handler bodies.
    pub fn interface_only(mut self, enabled: bool) -> Self {
        self.config.interface_only = enabled;
        self
    }

    /// Selects the server binding.
    pub fn framework(mut self, framework: Framework) -> Self {
        self.config.framework = framework;
        self
    }

    /// Selects the date/time types used in models.
    pub fn date_library(mut self, library: DateLibrary) -> Self {
        self.config.date_library = library;
        self
    }

    /// Applies a `key=value` option by its contract-tooling name.
    pub fn config_option(mut self, key: &str, value: &str) -> AppResult<Self> {
        self.config.apply_option(key, value)?;
        Ok(self)
    }

    /// Whether to print `cargo:rerun-if-changed` for the contract (on by default).
    pub fn emit_rerun_if_changed(mut self, enabled: bool) -> Self {
        self.rerun_if_changed = enabled;
        self
    }

    /// The configuration that `generate` will use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs generation.
    pub fn generate(self) -> AppResult<GenerationReport> {
        if self.rerun_if_changed {
            println!("cargo:rerun-if-changed={}", self.contract.display());
        }
        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => default_out_dir()?,
        };
        workflows::generate_to_dir(&self.contract, &out_dir, &self.config)
    }
}

fn default_out_dir() -> AppResult<PathBuf> {
    let out = std::env::var_os("OUT_DIR").ok_or_else(|| {
        AppError::Config("OUT_DIR is not set; pass an explicit out_dir outside build.rs".into())
    })?;
    Ok(Path::new(&out).join(DEFAULT_OUT_SUBDIR))
}
