#![deny(missing_docs)]

//! # Workflows
//!
//! Filesystem side of generation: write a rendered contract to an output
//! directory, skip the write when nothing changed, and clean up safely.
//!
//! Outputs are staged in a sibling temporary directory and swapped in with a
//! rename, so a failed run never leaves a half-written output directory.

use crate::codegen::{self, GeneratedFile};
use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::manifest::{slash_path, Manifest};
use crate::oas;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Result of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationReport {
    /// The output directory was (re)written.
    Written {
        /// Number of source files written.
        files: usize,
    },
    /// The output directory already held exactly these files.
    Unchanged {
        /// Number of source files present.
        files: usize,
    },
}

/// Result of a clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    /// The directory was removed.
    Removed {
        /// Number of generated source files it held.
        files: usize,
    },
    /// There was nothing to remove.
    NothingToClean,
}

/// Reads, validates and renders a contract file, then writes the result to `out_dir`.
pub fn generate_to_dir(
    contract_path: &Path,
    out_dir: &Path,
    config: &GeneratorConfig,
) -> AppResult<GenerationReport> {
    let text = fs::read_to_string(contract_path).map_err(|e| {
        AppError::Contract(format!("Failed to read {}: {}", contract_path.display(), e))
    })?;
    let contract = oas::parse_contract(&text)?;
    let files = codegen::generate(&contract, config)?;
    let report = write_output(out_dir, &files)?;
    tracing::info!(
        contract = %contract_path.display(),
        out_dir = %out_dir.display(),
        ?report,
        "generation finished"
    );
    Ok(report)
}

/// Writes rendered files plus their manifest into `out_dir`.
///
/// An existing directory is only replaced when every file in it is listed in
/// its manifest; anything else is treated as hand-written and left alone.
pub fn write_output(out_dir: &Path, files: &[GeneratedFile]) -> AppResult<GenerationReport> {
    let manifest = Manifest::for_files(files);
    let mut outputs = files.to_vec();
    outputs.extend(manifest.entries());

    // 1. Nothing to do when the directory already matches byte for byte
    if out_dir.is_dir() {
        if matches_outputs(out_dir, &outputs)? {
            return Ok(GenerationReport::Unchanged { files: files.len() });
        }
        ensure_owned(out_dir, "regenerate")?;
    } else if out_dir.exists() {
        return Err(AppError::Refused(format!(
            "{} exists and is not a directory",
            out_dir.display()
        )));
    }

    // 2. Stage beside the target so the final rename stays on one filesystem
    let parent = match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&parent)?;
    let staging = tempfile::Builder::new()
        .prefix(".codegen-staging-")
        .tempdir_in(&parent)?;
    for file in &outputs {
        let target = staging.path().join(&file.path);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&target, &file.contents)?;
    }

    // 3. Swap in
    if out_dir.exists() {
        fs::remove_dir_all(out_dir)?;
    }
    fs::rename(staging.path(), out_dir)?;
    Ok(GenerationReport::Written { files: files.len() })
}

/// Removes a generated output directory.
///
/// Refuses when the directory has no manifest or holds files the manifest does not list.
pub fn clean(out_dir: &Path) -> AppResult<CleanOutcome> {
    if !out_dir.exists() {
        return Ok(CleanOutcome::NothingToClean);
    }
    if !out_dir.is_dir() {
        return Err(AppError::Refused(format!(
            "{} is not a directory",
            out_dir.display()
        )));
    }
    let manifest = ensure_owned(out_dir, "clean")?;
    fs::remove_dir_all(out_dir)?;
    tracing::info!(out_dir = %out_dir.display(), "removed generated output");
    Ok(CleanOutcome::Removed {
        files: manifest.files.len(),
    })
}

/// Relative paths of every non-directory entry under `dir`.
fn scan(dir: &Path) -> AppResult<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| AppError::General(format!("Failed to scan {}: {}", dir.display(), e)))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| AppError::General(e.to_string()))?;
        found.insert(slash_path(relative));
    }
    Ok(found)
}

/// Returns the directory's manifest if every file in it is generator-owned.
fn ensure_owned(dir: &Path, action: &str) -> AppResult<Manifest> {
    let present = scan(dir)?;
    let manifest = match Manifest::read(dir)? {
        Some(manifest) => manifest,
        None if present.is_empty() => Manifest::default(),
        None => {
            return Err(AppError::Refused(format!(
                "refusing to {} {}: it has no generator manifest",
                action,
                dir.display()
            )))
        }
    };
    let owned = manifest.owned_paths();
    let foreign: Vec<&str> = present
        .iter()
        .filter(|path| !owned.contains(*path))
        .map(String::as_str)
        .collect();
    if !foreign.is_empty() {
        return Err(AppError::Refused(format!(
            "refusing to {} {}: it contains files the generator did not write: {}",
            action,
            dir.display(),
            foreign.join(", ")
        )));
    }
    Ok(manifest)
}

fn matches_outputs(dir: &Path, outputs: &[GeneratedFile]) -> AppResult<bool> {
    let expected: BTreeSet<String> = outputs.iter().map(|f| slash_path(&f.path)).collect();
    if scan(dir)? != expected {
        return Ok(false);
    }
    for file in outputs {
        match fs::read(dir.join(&file.path)) {
            Ok(existing) if existing == file.contents.as_bytes() => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Vec<GeneratedFile> {
        vec![
            GeneratedFile {
                path: PathBuf::from("api.rs"),
                contents: "pub trait A {}\n".into(),
            },
            GeneratedFile {
                path: PathBuf::from("models.rs"),
                contents: "pub struct B;\n".into(),
            },
        ]
    }

    #[test]
    fn test_write_then_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");

        let first = write_output(&out, &sample()).unwrap();
        assert_eq!(first, GenerationReport::Written { files: 2 });
        assert!(out.join(".codegen/FILES").is_file());

        let second = write_output(&out, &sample()).unwrap();
        assert_eq!(second, GenerationReport::Unchanged { files: 2 });
    }

    #[test]
    fn test_stale_files_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let mut files = sample();
        files.push(GeneratedFile {
            path: PathBuf::from("server.rs"),
            contents: "fn s() {}\n".into(),
        });
        write_output(&out, &files).unwrap();

        write_output(&out, &sample()).unwrap();
        assert!(!out.join("server.rs").exists());
        assert_eq!(
            fs::read_to_string(out.join(".codegen/FILES")).unwrap(),
            "api.rs\nmodels.rs\n"
        );
    }

    #[test]
    fn test_clean_refuses_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        write_output(&out, &sample()).unwrap();
        fs::write(out.join("notes.md"), "mine").unwrap();

        let err = clean(&out).unwrap_err();
        assert!(matches!(err, AppError::Refused(_)));
        assert!(err.to_string().contains("notes.md"));
        assert!(out.join("notes.md").exists());

        let err = write_output(&out, &sample()).unwrap_err();
        assert!(matches!(err, AppError::Refused(_)));
    }

    #[test]
    fn test_clean_removes_generated_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        write_output(&out, &sample()).unwrap();

        assert_eq!(clean(&out).unwrap(), CleanOutcome::Removed { files: 2 });
        assert!(!out.exists());
        assert_eq!(clean(&out).unwrap(), CleanOutcome::NothingToClean);
    }

    #[test]
    fn test_clean_refuses_unmanifested_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        let err = clean(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no generator manifest"));
    }

    #[test]
    fn test_no_staging_dirs_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        write_output(&out, &sample()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".codegen-staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
