use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::references::{extract_md_references, ReferenceSet};
use crate::scanner::{find_all_readmes, MarkdownDocument};

/// Documents split by whether the root README points at them
#[derive(Debug)]
pub struct Classification<'a> {
    pub linked: Vec<&'a MarkdownDocument>,
    pub isolated: Vec<&'a MarkdownDocument>,
    pub references: ReferenceSet,
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Strict classification: only a direct reference from the root README counts.
/// Nested READMEs are ordinary documents; the root README itself lands in neither list.
pub fn classify_files<'a>(
    docs: &'a [MarkdownDocument],
    root_readme: Option<&Path>,
    root: &Path,
) -> Classification<'a> {
    let references = root_readme
        .map(|readme| extract_md_references(readme, root))
        .unwrap_or_default();
    let root_readme = root_readme.map(canonical);

    let mut linked = Vec::new();
    let mut isolated = Vec::new();

    for doc in docs {
        let resolved = canonical(&doc.path);
        if root_readme.as_ref() == Some(&resolved) {
            continue;
        }
        if references.contains(&resolved) {
            linked.push(doc);
        } else {
            isolated.push(doc);
        }
    }

    Classification {
        linked,
        isolated,
        references,
    }
}

/// Everything the dashboard, report and CI sink need about one run
#[derive(Serialize, Debug)]
pub struct Summary<'a> {
    pub root: PathBuf,
    pub root_readme: Option<PathBuf>,
    pub total: usize,
    pub linked: Vec<&'a MarkdownDocument>,
    pub isolated: Vec<&'a MarkdownDocument>,
    pub coverage: f64,
    pub readmes: usize,
    pub references: usize,
}

/// Discovered files minus the root README
pub fn total_documents(discovered: usize, has_root_readme: bool) -> usize {
    discovered.saturating_sub(usize::from(has_root_readme))
}

pub fn coverage_percent(linked: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        linked as f64 / total as f64 * 100.0
    }
}

impl<'a> Summary<'a> {
    pub fn new(
        root: &Path,
        root_readme: Option<&Path>,
        docs: &'a [MarkdownDocument],
        classification: Classification<'a>,
    ) -> Self {
        let total = total_documents(docs.len(), root_readme.is_some());
        let coverage = coverage_percent(classification.linked.len(), total);

        Self {
            root: root.to_path_buf(),
            root_readme: root_readme.map(Path::to_path_buf),
            total,
            coverage,
            readmes: find_all_readmes(docs).len(),
            references: classification.references.len(),
            linked: classification.linked,
            isolated: classification.isolated,
        }
    }

    /// Path shown to users: relative to the root, forward slashes
    pub fn display_path(&self, path: &Path) -> String {
        relative_display(path, &self.root)
    }

    pub fn readme_display(&self) -> Option<String> {
        self.root_readme.as_deref().map(|p| self.display_path(p))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn relative_display(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}
