use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved, canonical paths of every Markdown file the root document points at
pub type ReferenceSet = BTreeSet<PathBuf>;

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[.*?\]\(([^)]+\.md[^)]*)\)").expect("link pattern")
});

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\s'"<>()\[\]]+"#).expect("token pattern")
});

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href=["']([^"']+\.md[^"']*)["']"#).expect("href pattern")
});

/// One reference syntax: raw text in, raw targets out
type Matcher = fn(&str) -> Vec<String>;

const MATCHERS: &[Matcher] = &[inline_links, bare_paths, html_hrefs];

/// `[text](target.md)`
fn inline_links(content: &str) -> Vec<String> {
    LINK_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Paths written out in prose, e.g. `see docs/setup.md`.
/// Anything sitting directly inside `( )` belongs to link syntax and is skipped.
fn bare_paths(content: &str) -> Vec<String> {
    let mut found = Vec::new();

    for token in TOKEN_RE.find_iter(content) {
        let text = token.as_str();
        let Some(idx) = text.to_ascii_lowercase().rfind(".md") else {
            continue;
        };
        if idx == 0 {
            continue;
        }
        let end = token.start() + idx + 3;

        let before = &content[..token.start()];
        let opens_paren = before.ends_with('(') && !before.ends_with("\\(");
        let closes_paren = content[end..].starts_with(')');
        if opens_paren || closes_paren {
            continue;
        }

        found.push(content[token.start()..end].to_string());
    }

    found
}

/// `href="target.md"` or `href='target.md'`
fn html_hrefs(content: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drops the fragment and surrounding whitespace
fn clean_candidate(raw: &str) -> &str {
    raw.split('#').next().unwrap_or_default().trim()
}

fn is_external(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Union of every matcher's output, one entry per distinct candidate string
pub fn extract_candidates(content: &str) -> BTreeSet<String> {
    MATCHERS
        .iter()
        .flat_map(|matcher| matcher(content))
        .map(|raw| clean_candidate(&raw).to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Try the document's directory first, then the project root.
/// Candidates that resolve nowhere, or outside the root, are dropped.
pub fn resolve_candidates<'a, I>(candidates: I, doc_dir: &Path, root: &Path) -> ReferenceSet
where
    I: IntoIterator<Item = &'a String>,
{
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut resolved = ReferenceSet::new();

    for candidate in candidates {
        if is_external(candidate) {
            continue;
        }

        let hit = [doc_dir, root.as_path()]
            .iter()
            .find_map(|base| fs::canonicalize(base.join(candidate)).ok());

        match hit {
            Some(path) if path.starts_with(&root) => {
                resolved.insert(path);
            }
            Some(path) => {
                tracing::debug!(candidate = %candidate, path = %path.display(), "reference leaves project root");
            }
            None => {
                tracing::debug!(candidate = %candidate, "reference did not resolve");
            }
        }
    }

    resolved
}

/// Every internal Markdown reference in `readme`, resolved on disk.
/// An unreadable document has no references.
pub fn extract_md_references(readme: &Path, root: &Path) -> ReferenceSet {
    let content = match fs::read(readme) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!(path = %readme.display(), error = %e, "could not read root document");
            return ReferenceSet::new();
        }
    };

    let doc_dir = readme.parent().unwrap_or(root);
    let candidates = extract_candidates(&content);
    resolve_candidates(&candidates, doc_dir, root)
}
