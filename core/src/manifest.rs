#![deny(missing_docs)]

//! # Output Manifest
//!
//! Every output directory carries `.codegen/FILES` (one relative path per line)
//! and `.codegen/VERSION`. The manifest is what lets `clean` and regeneration
//! tell generated files from hand-written ones.

use crate::codegen::GeneratedFile;
use crate::error::AppResult;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Directory holding manifest files, relative to the output directory.
pub const MANIFEST_DIR: &str = ".codegen";
/// List of generated files.
pub const FILES_ENTRY: &str = ".codegen/FILES";
/// Generator version that wrote the directory.
pub const VERSION_ENTRY: &str = ".codegen/VERSION";

/// The set of files a generator run wrote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    /// Relative, `/`-separated paths of generated source files.
    pub files: BTreeSet<String>,
}

impl Manifest {
    /// Manifest describing a set of rendered files.
    pub fn for_files(files: &[GeneratedFile]) -> Self {
        Self {
            files: files.iter().map(|f| slash_path(&f.path)).collect(),
        }
    }

    /// Reads the manifest of an output directory, if it has one.
    pub fn read(dir: &Path) -> AppResult<Option<Self>> {
        let path = dir.join(FILES_ENTRY);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(Self {
            files: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }))
    }

    /// Contents of `.codegen/FILES`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(file);
            out.push('\n');
        }
        out
    }

    /// Every path the generator owns, manifest entries included.
    pub fn owned_paths(&self) -> BTreeSet<String> {
        let mut owned = self.files.clone();
        owned.insert(FILES_ENTRY.to_string());
        owned.insert(VERSION_ENTRY.to_string());
        owned
    }

    /// The manifest files themselves, ready to be written beside the outputs.
    pub fn entries(&self) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile {
                path: FILES_ENTRY.into(),
                contents: self.render(),
            },
            GeneratedFile {
                path: VERSION_ENTRY.into(),
                contents: format!("{}\n", env!("CARGO_PKG_VERSION")),
            },
        ]
    }
}

/// `/`-separated form of a relative path.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            GeneratedFile {
                path: PathBuf::from("models.rs"),
                contents: String::new(),
            },
            GeneratedFile {
                path: PathBuf::from("api.rs"),
                contents: String::new(),
            },
        ];
        let manifest = Manifest::for_files(&files);
        assert_eq!(manifest.render(), "api.rs\nmodels.rs\n");

        fs::create_dir_all(dir.path().join(MANIFEST_DIR)).unwrap();
        fs::write(dir.path().join(FILES_ENTRY), manifest.render()).unwrap();
        assert_eq!(Manifest::read(dir.path()).unwrap(), Some(manifest));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Manifest::read(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_owned_paths_include_manifest() {
        let owned = Manifest::default().owned_paths();
        assert!(owned.contains(FILES_ENTRY));
        assert!(owned.contains(VERSION_ENTRY));
    }
}
