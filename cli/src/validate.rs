#![deny(missing_docs)]

//! # Validate Command

use std::fs;
use std::path::PathBuf;

use tinyurl_core::{parse_contract, AppError, AppResult};

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the OpenAPI contract.
    #[clap(long, short, default_value = "contracts/openapi.yaml")]
    pub input: PathBuf,
}

/// Validates and lowers the contract without writing anything.
pub fn execute(args: &ValidateArgs) -> AppResult<()> {
    let text = fs::read_to_string(&args.input).map_err(|e| {
        AppError::Contract(format!("Failed to read {}: {}", args.input.display(), e))
    })?;
    let contract = parse_contract(&text)?;
    println!(
        "{} {}: {} operations, {} models",
        contract.title,
        contract.version,
        contract.operations.len(),
        contract.models.len()
    );
    Ok(())
}
