use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::classify::relative_display;
use crate::error::Result;
use crate::scanner::MarkdownDocument;

pub const OTHER_DOCS_LABEL: &str = "📎 Other Documentation";
pub const OTHER_DOCS_HEADING: &str = "## 📎 Other Documentation";

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.+)").expect("heading pattern"));

static DOCS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(docs?|documentation)\b").expect("docs pattern")
});

/// Result of one fix attempt against the root README
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub added: usize,
    /// Heading the links went under; empty when no suitable section exists
    pub section: String,
}

/// `- [Title](path/from/readme.md)` for each document
pub fn build_link_lines(isolated: &[&MarkdownDocument], readme: &Path) -> Vec<String> {
    let readme_dir = readme.parent().unwrap_or_else(|| Path::new(""));
    isolated
        .iter()
        .map(|doc| format!("- [{}]({})", doc.title, relative_display(&doc.path, readme_dir)))
        .collect()
}

fn heading(line: &str) -> Option<(usize, &str)> {
    HEADING_RE.captures(line).and_then(|caps| {
        let level = caps.get(1)?.as_str().len();
        let text = caps.get(2)?.as_str().trim();
        Some((level, text))
    })
}

/// Finds the first H1-H3 whose text names docs as a whole word
pub fn find_docs_heading(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(heading)
        .find(|(_, text)| DOCS_RE.is_match(text))
        .map(|(_, text)| text.to_string())
}

/// Splices `links` in front of `lines[at]`, one per line
fn splice(lines: &[&str], at: usize, links: &[&String]) -> String {
    let mut out: String = lines[..at].concat();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for link in links {
        out.push_str(link);
        out.push('\n');
    }
    out.push_str(&lines[at..].concat());
    out
}

/// Adds `links` under the dedicated "Other Documentation" section, creating it at the end
/// of the document when absent. Returns the rewritten text when anything changed.
pub fn apply_generic(content: &str, links: &[String]) -> (FixOutcome, Option<String>) {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let section_at = lines.iter().position(|l| l.trim() == OTHER_DOCS_HEADING);

    let Some(start) = section_at else {
        let updated = format!(
            "{}\n\n{}\n\n{}\n",
            content.trim_end(),
            OTHER_DOCS_HEADING,
            links.join("\n")
        );
        let outcome = FixOutcome {
            added: links.len(),
            section: OTHER_DOCS_LABEL.to_string(),
        };
        return (outcome, Some(updated));
    };

    let new_links: Vec<&String> = links.iter().filter(|l| !content.contains(l.as_str())).collect();
    let outcome = FixOutcome {
        added: new_links.len(),
        section: OTHER_DOCS_LABEL.to_string(),
    };
    if new_links.is_empty() {
        return (outcome, None);
    }

    let insert_at = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| l.starts_with("# ") || l.starts_with("## "))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    (outcome, Some(splice(&lines, insert_at, &new_links)))
}

/// Adds `links` at the end of the first existing docs section.
/// `section` comes back empty when the document has no such heading.
pub fn apply_docs(content: &str, links: &[String]) -> (FixOutcome, Option<String>) {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();

    let found = lines.iter().enumerate().find_map(|(i, l)| {
        heading(l)
            .filter(|(_, text)| DOCS_RE.is_match(text))
            .map(|(level, text)| (i, level, text))
    });

    let Some((start, level, title)) = found else {
        return (
            FixOutcome {
                added: 0,
                section: String::new(),
            },
            None,
        );
    };

    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| heading(l).is_some_and(|(lvl, _)| lvl <= level))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    let section_text = lines[start..end].concat();
    let new_links: Vec<&String> = links.iter().filter(|l| !section_text.contains(l.as_str())).collect();
    let outcome = FixOutcome {
        added: new_links.len(),
        section: title.to_string(),
    };
    if new_links.is_empty() {
        return (outcome, None);
    }

    // attach to the section's last content line, not its trailing blank lines
    let insert_at = (start + 1..end)
        .rev()
        .find(|&i| !lines[i].trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(end);

    (outcome, Some(splice(&lines, insert_at, &new_links)))
}

fn rewrite(
    readme: &Path,
    isolated: &[&MarkdownDocument],
    apply: fn(&str, &[String]) -> (FixOutcome, Option<String>),
) -> Result<FixOutcome> {
    let content = fs::read_to_string(readme)?;
    let links = build_link_lines(isolated, readme);
    let (outcome, updated) = apply(&content, &links);

    if let Some(updated) = updated {
        fs::write(readme, updated)?;
        tracing::info!(
            readme = %readme.display(),
            added = outcome.added,
            section = %outcome.section,
            "linked isolated files"
        );
    }

    Ok(outcome)
}

/// Writes missing links into the "Other Documentation" section of the root README
pub fn fix_generic(readme: &Path, isolated: &[&MarkdownDocument]) -> Result<FixOutcome> {
    rewrite(readme, isolated, apply_generic)
}

/// Writes missing links into the root README's existing docs section, if it has one
pub fn fix_docs(readme: &Path, isolated: &[&MarkdownDocument]) -> Result<FixOutcome> {
    rewrite(readme, isolated, apply_docs)
}
