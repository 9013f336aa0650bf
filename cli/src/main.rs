#![deny(missing_docs)]

//! # tinyurl-codegen
//!
//! Command line front end for the contract compiler.
//!
//! Supported Commands:
//! - `generate`: Renders models, handler traits and server glue into a directory.
//! - `validate`: Checks a contract and lists every problem found.
//! - `clean`: Removes a generated directory, refusing if it holds hand-written files.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tinyurl_core::AppResult;
use tracing_subscriber::EnvFilter;

mod clean;
mod generate;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Contract-first code generator for tiny-url")]
struct Cli {
    /// Log filter (e.g. `debug`, `tinyurl_core=trace`).
    #[clap(long, global = true, env = "TINYURL_CODEGEN_LOG", default_value = "warn")]
    log: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate Rust sources from an OpenAPI contract.
    Generate(generate::GenerateArgs),
    /// Validate an OpenAPI contract without writing anything.
    Validate(validate::ValidateArgs),
    /// Remove a generated output directory.
    Clean(clean::CleanArgs),
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> AppResult<()> {
    match &cli.command {
        Commands::Generate(args) => generate::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Clean(args) => clean::execute(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_command() {
        let cli = Cli::parse_from([
            "tinyurl-codegen",
            "generate",
            "--input",
            "api.yaml",
            "--output",
            "out",
            "--framework",
            "axum",
            "--config-option",
            "dateLibrary=time",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.input.to_string_lossy(), "api.yaml");
                assert_eq!(args.config_option, vec![("dateLibrary".to_string(), "time".to_string())]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
