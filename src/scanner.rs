use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_SECTIONS: usize = 6;
const MAX_DESCRIPTION: usize = 160;
const TRUNCATED_DESCRIPTION: usize = 157;
const SHORT_LINE: usize = 80;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern"));

/// Metadata for one discovered Markdown file
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MarkdownDocument {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub word_count: usize,
    pub sections: Vec<String>,  // H2 headings, first six
    pub is_readme: bool,
    pub is_root_readme: bool,
}

/// What the text alone tells us; the title falls back to the filename later
#[derive(Debug, Default, PartialEq)]
struct ParsedContent {
    title: Option<String>,
    description: String,
    word_count: usize,
    sections: Vec<String>,
}

fn is_code_fence(stripped: &str) -> bool {
    stripped.starts_with("```") || stripped.starts_with("~~~")
}

/// Badge images and raw HTML never start a description
fn is_noise_line(stripped: &str) -> bool {
    stripped.starts_with("[![") || stripped.starts_with('<')
}

/// A short plain-text line before any heading acts as the document's title line
fn looks_like_text(stripped: &str) -> bool {
    !stripped.is_empty()
        && stripped.chars().count() < SHORT_LINE
        && !stripped.starts_with('-')
        && !stripped.starts_with('*')
}

/// First H1 and the H2 list, ignoring anything inside fenced code
fn scan_structure(lines: &[&str]) -> (Option<String>, Vec<String>) {
    let mut title = None;
    let mut sections = Vec::new();
    let mut in_code = false;

    for line in lines {
        let stripped = line.trim();
        if is_code_fence(stripped) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        if title.is_none() && stripped.starts_with("# ") {
            title = Some(stripped[2..].trim().to_string());
        } else if let Some(rest) = stripped.strip_prefix("## ") {
            sections.push(rest.trim().to_string());
        }
    }

    (title, sections)
}

/// Trimmed lines with code blocks, badges and HTML removed
fn clean_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut in_code = false;

    for line in lines {
        let stripped = line.trim();
        if is_code_fence(stripped) {
            in_code = !in_code;
            continue;
        }
        if !in_code && !is_noise_line(stripped) {
            result.push(stripped);
        }
    }

    result
}

fn first_paragraph<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut past_heading = false;
    let mut para = Vec::new();

    for &line in lines {
        if line.starts_with('#') {
            past_heading = true;
            if !para.is_empty() {
                break;
            }
            continue;
        }
        if !past_heading {
            if looks_like_text(line) {
                past_heading = true;
            }
            continue;
        }
        if !line.is_empty() {
            para.push(line);
        } else if !para.is_empty() {
            break;
        }
    }

    para
}

fn scan_description(lines: &[&str]) -> String {
    let clean = clean_lines(lines);
    let joined = first_paragraph(&clean).join(" ");

    if joined.chars().count() > MAX_DESCRIPTION {
        let mut truncated: String = joined.chars().take(TRUNCATED_DESCRIPTION).collect();
        truncated.push_str("...");
        truncated
    } else {
        joined
    }
}

pub fn count_words(content: &str) -> usize {
    WORD_RE.find_iter(content).count()
}

fn parse_content(content: &str) -> ParsedContent {
    let lines: Vec<&str> = content.lines().collect();
    let (title, mut sections) = scan_structure(&lines);
    sections.truncate(MAX_SECTIONS);

    ParsedContent {
        title,
        description: scan_description(&lines),
        word_count: count_words(content),
        sections,
    }
}

/// `my-guide_notes` -> `My Guide Notes`
pub fn humanize_stem(stem: &str) -> String {
    let spaced = stem.replace(['-', '_'], " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;

    for c in spaced.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn is_readme_path(path: &Path) -> bool {
    file_stem(path).eq_ignore_ascii_case("readme")
}

/// Read and parse one file. Unreadable files degrade to a record titled by the bare stem.
pub fn scan_file(path: &Path, root: &Path) -> MarkdownDocument {
    let is_readme = is_readme_path(path);
    let is_root_readme = is_readme && path.parent() == Some(root);

    let parsed = match fs::read(path) {
        Ok(bytes) => {
            let content = String::from_utf8_lossy(&bytes);
            let mut parsed = parse_content(&content);
            parsed.title = Some(
                parsed
                    .title
                    .take()
                    .unwrap_or_else(|| humanize_stem(&file_stem(path))),
            );
            parsed
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read markdown file");
            ParsedContent {
                title: Some(file_stem(path)),
                ..ParsedContent::default()
            }
        }
    };

    tracing::debug!(
        path = %path.display(),
        words = parsed.word_count,
        sections = parsed.sections.len(),
        "scanned"
    );

    MarkdownDocument {
        path: path.to_path_buf(),
        title: parsed.title.unwrap_or_default(),
        description: parsed.description,
        word_count: parsed.word_count,
        sections: parsed.sections,
        is_readme,
        is_root_readme,
    }
}

pub fn scan_all(paths: &[PathBuf], root: &Path) -> Vec<MarkdownDocument> {
    paths.iter().map(|p| scan_file(p, root)).collect()
}

/// README paths, shallowest first
pub fn find_all_readmes(docs: &[MarkdownDocument]) -> Vec<PathBuf> {
    let mut readmes: Vec<PathBuf> = docs
        .iter()
        .filter(|d| d.is_readme)
        .map(|d| d.path.clone())
        .collect();
    readmes.sort_by_key(|p| p.components().count());
    readmes
}

pub fn find_root_readme(docs: &[MarkdownDocument]) -> Option<PathBuf> {
    docs.iter()
        .find(|d| d.is_root_readme)
        .map(|d| d.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_extracts_h1_title() {
        let parsed = parse_content("# My Title\n\nSome description here.\n");
        assert_eq!(parsed.title.as_deref(), Some("My Title"));
    }

    #[test]
    fn test_extracts_description() {
        let parsed = parse_content("# Title\n\nThis is the first paragraph.\n");
        assert_eq!(parsed.description, "This is the first paragraph.");
    }

    #[test]
    fn test_description_joins_paragraph_lines_and_stops_at_blank() {
        let parsed = parse_content("# Title\n\nLine one\nline two\n\nSecond paragraph.\n");
        assert_eq!(parsed.description, "Line one line two");
    }

    #[test]
    fn test_description_skips_badges_html_and_code() {
        let content = "# Title\n\n[![build](b.svg)](ci)\n<p align=\"center\">\n```\nlet x = 1;\n```\nReal text.\n";
        let parsed = parse_content(content);
        assert_eq!(parsed.description, "Real text.");
    }

    #[test]
    fn test_description_after_plain_title_line() {
        // no heading: the short first line plays the title
        let parsed = parse_content("Project Name\n\nThe body paragraph.\n");
        assert_eq!(parsed.description, "The body paragraph.");
    }

    #[test]
    fn test_description_closed_by_next_heading() {
        let parsed = parse_content("# Title\nIntro line\n## Next\nOther\n");
        assert_eq!(parsed.description, "Intro line");
    }

    #[test]
    fn test_long_line_before_heading_is_not_a_title_line() {
        let long = "x".repeat(80);
        let parsed = parse_content(&format!("{}\nShort title\n\nBody paragraph.\n", long));
        assert_eq!(parsed.description, "Body paragraph.");
    }

    #[test]
    fn test_list_items_before_heading_are_not_title_lines() {
        let parsed = parse_content("- item one\n* item two\nShort title\n\nBody paragraph.\n");
        assert_eq!(parsed.description, "Body paragraph.");
    }

    #[test]
    fn test_heading_only_has_empty_description() {
        let parsed = parse_content("# Only A Heading\n");
        assert_eq!(parsed.description, "");
    }

    #[test]
    fn test_extracts_h2_sections() {
        let parsed = parse_content("# Title\n\n## Installation\n\n## Usage\n");
        assert_eq!(parsed.sections, vec!["Installation", "Usage"]);
    }

    #[test]
    fn test_sections_capped_at_six() {
        let content: String = (1..=9).map(|i| format!("## S{}\n", i)).collect();
        let parsed = parse_content(&content);
        assert_eq!(parsed.sections, vec!["S1", "S2", "S3", "S4", "S5", "S6"]);
    }

    #[test]
    fn test_counts_words() {
        assert_eq!(parse_content("one two three four five").word_count, 5);
        assert_eq!(count_words("# Head_ing\n```\ncode block\n```"), 3);
    }

    #[test]
    fn test_skips_code_blocks() {
        let parsed = parse_content("# Title\n\n```\n## Not A Section\n```\n\n## Real Section\n");
        assert!(!parsed.sections.contains(&"Not A Section".to_string()));
        assert!(parsed.sections.contains(&"Real Section".to_string()));
    }

    #[test]
    fn test_tilde_fence_hides_title() {
        let parsed = parse_content("~~~\n# Fake\n~~~\n# Real\n");
        assert_eq!(parsed.title.as_deref(), Some("Real"));
    }

    #[test]
    fn test_truncates_long_description() {
        let long_para = "word ".repeat(50);
        let parsed = parse_content(&format!("# Title\n\n{}\n", long_para));
        assert_eq!(parsed.description.chars().count(), 160);
        assert!(parsed.description.ends_with("..."));
    }

    #[test]
    fn test_humanize_stem() {
        assert_eq!(humanize_stem("my-guide"), "My Guide");
        assert_eq!(humanize_stem("API_notes"), "Api Notes");
    }

    #[test]
    fn test_fallback_title_from_filename() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "my-guide.md", "No heading here, just plain text.\n");
        let doc = scan_file(&path, dir.path());
        assert_eq!(doc.title, "My Guide");
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "empty-notes.md", "");
        let doc = scan_file(&path, dir.path());
        assert_eq!(doc.title, "Empty Notes");
        assert_eq!(doc.word_count, 0);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.description, "");
    }

    #[test]
    fn test_missing_file_returns_safe_defaults() {
        let dir = tempdir().unwrap();
        let doc = scan_file(&dir.path().join("nonexistent.md"), dir.path());
        assert_eq!(doc.title, "nonexistent");
        assert_eq!(doc.word_count, 0);
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_root_readme_flags() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let root = write(dir.path(), "Readme.md", "# Root\n");
        let nested = write(&dir.path().join("docs"), "README.md", "# Docs\n");

        let docs = scan_all(&[root.clone(), nested.clone()], dir.path());
        assert!(docs[0].is_readme && docs[0].is_root_readme);
        assert!(docs[1].is_readme && !docs[1].is_root_readme);

        assert_eq!(find_all_readmes(&docs), vec![root.clone(), nested]);
        assert_eq!(find_root_readme(&docs), Some(root));
    }
}
