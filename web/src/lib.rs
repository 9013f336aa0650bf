#![deny(missing_docs)]

//! # tiny-url Web Library
//!
//! URL shortener whose HTTP surface is generated from `contracts/openapi.yaml`
//! at build time. The hand-written parts are the services and the controller
//! implementing the generated traits.

/// Service configuration.
pub mod config;

/// Storage records.
pub mod domain;

/// Service error type.
pub mod error;

/// Controller, health check and route registration.
pub mod http;

/// Tracing setup.
pub mod logging;

/// Storage traits and the in-memory store.
pub mod repository;

/// Business logic.
pub mod services;

/// Code generated from the OpenAPI contract by `build.rs`.
#[allow(missing_docs, dead_code, unused_imports, unused_variables, clippy::all)]
pub mod generated {
    /// Request and response bodies.
    pub mod models {
        include!(concat!(env!("OUT_DIR"), "/openapi/models.rs"));
    }

    /// Handler traits and response enums.
    pub mod api {
        include!(concat!(env!("OUT_DIR"), "/openapi/api.rs"));
    }

    /// actix-web bindings.
    pub mod server {
        include!(concat!(env!("OUT_DIR"), "/openapi/server.rs"));
    }
}

pub use config::AppConfig;
pub use http::{configure, health_check, ApiController};
