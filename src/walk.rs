use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{ConnectorError, Result};

/// Compiles exclusion patterns; a plain directory name is a glob that matches only itself
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Find every `.md` file under `root`, pruning entries whose name matches an exclusion.
/// Returned paths are sorted.
pub fn discover(root: &Path, exclude: &[String], respect_gitignore: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ConnectorError::InvalidRoot(root.to_path_buf()));
    }

    let excluded = build_exclude_set(exclude)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .git_ignore(respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            entry.depth() == 0 || !excluded.is_match(entry.file_name())
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // an unreadable directory costs its own files, not the run
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let is_markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("md"));

        if is_markdown {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    tracing::debug!(count = files.len(), root = %root.display(), "discovered markdown files");
    Ok(files)
}
