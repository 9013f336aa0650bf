//! Generates the HTTP interfaces from `contracts/openapi.yaml` before the crate compiles.

use tinyurl_core::build::Builder;
use tinyurl_core::config::{DateLibrary, Framework};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let result = Builder::new("contracts/openapi.yaml")
        .interface_only(true)
        .framework(Framework::ActixWeb)
        .date_library(DateLibrary::Chrono)
        .generate();

    if let Err(err) = result {
        println!("cargo:warning=openapi generation failed: {}", err);
        std::process::exit(1);
    }
}
