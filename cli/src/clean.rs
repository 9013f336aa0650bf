#![deny(missing_docs)]

//! # Clean Command

use std::path::PathBuf;

use tinyurl_core::{clean, AppResult, CleanOutcome};

/// Arguments for the clean command.
#[derive(clap::Args, Debug, Clone)]
pub struct CleanArgs {
    /// Generated directory to remove.
    #[clap(long, short)]
    pub output: PathBuf,
}

/// Removes the directory if the generator owns every file in it.
pub fn execute(args: &CleanArgs) -> AppResult<()> {
    match clean(&args.output)? {
        CleanOutcome::Removed { files } => {
            println!("removed {} ({} generated files)", args.output.display(), files)
        }
        CleanOutcome::NothingToClean => println!("nothing to clean"),
    }
    Ok(())
}
