//! Source file discovery.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::Result;

/// Build-output directories that never hold checked-in test code.
const DEFAULT_EXCLUDES: &[&str] = &["**/bin/**", "**/obj/**", "**/.git/**"];

/// Walks a directory tree for C# sources, with glob include/exclude
/// filters. Build output directories are excluded by default.
#[derive(Default, Clone)]
pub struct SourceFinder {
    include_globs: Vec<String>,
    exclude_globs: Vec<String>,
}

impl SourceFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only visit files matching the glob pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_globs.push(pattern.into());
        self
    }

    /// Skip files matching the glob pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_globs.push(pattern.into());
        self
    }

    /// Collects every matching `.cs` file under `root`. A `root` that is
    /// itself a file is returned as-is, so single files can be checked
    /// without a directory walk.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let include_set = build_glob_set(&self.include_globs)?;
        let exclude_set = build_glob_set(&self.exclude_globs)?;
        let default_set = build_glob_set(
            &DEFAULT_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )?;

        let mut matched = Vec::new();

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !ext.eq_ignore_ascii_case("cs") {
                continue;
            }

            // Globs match against the path relative to the walk root.
            let rel_path = path.strip_prefix(root).unwrap_or(path);

            if default_set.is_match(rel_path) {
                continue;
            }
            if !self.include_globs.is_empty() && !include_set.is_match(rel_path) {
                continue;
            }
            if !self.exclude_globs.is_empty() && exclude_set.is_match(rel_path) {
                continue;
            }

            matched.push(path.to_path_buf());
        }

        matched.sort();
        Ok(matched)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
