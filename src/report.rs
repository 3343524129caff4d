use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::classify::Summary;
use crate::error::Result;

const FOOTER: &str = "_Report generated by md-connector_";

fn linked_section(summary: &Summary, rows: &mut Vec<String>) {
    rows.push("## ✅ Linked Files\n".to_string());
    rows.push("| # | File | Title | Words | Sections |".to_string());
    rows.push("|---|------|-------|-------|----------|".to_string());

    for (i, doc) in summary.linked.iter().enumerate() {
        let sections = if doc.sections.is_empty() {
            "—".to_string()
        } else {
            doc.sections.iter().take(4).cloned().collect::<Vec<_>>().join(", ")
        };
        rows.push(format!(
            "| {} | `{}` | {} | {} | {} |",
            i + 1,
            summary.display_path(&doc.path),
            doc.title,
            doc.word_count,
            sections
        ));
    }
    rows.push(String::new());
}

fn isolated_section(summary: &Summary, rows: &mut Vec<String>) {
    rows.push("## ⚠️ Isolated Files\n".to_string());
    rows.push("> These files are **not referenced** by the root `README.md`.\n".to_string());
    rows.push("| # | File | Title | Words | Description |".to_string());
    rows.push("|---|------|-------|-------|-------------|".to_string());

    for (i, doc) in summary.isolated.iter().enumerate() {
        let description = if doc.description.is_empty() {
            "—".to_string()
        } else {
            doc.description.replace('|', "\\|")
        };
        rows.push(format!(
            "| {} | `{}` | {} | {} | {} |",
            i + 1,
            summary.display_path(&doc.path),
            doc.title,
            doc.word_count,
            description
        ));
    }

    rows.push(String::new());
    rows.push("### 💡 Suggested additions\n".to_string());
    rows.push("Add the following snippets to your root `README.md`:\n".to_string());
    rows.push("```markdown".to_string());
    for doc in &summary.isolated {
        rows.push(format!("- [{}]({})", doc.title, summary.display_path(&doc.path)));
        if !doc.description.is_empty() {
            rows.push(format!("  _{}_", doc.description));
        }
    }
    rows.push("```".to_string());
    rows.push(String::new());
}

/// Full Markdown report for one run
pub fn render_report(summary: &Summary, generated_at: DateTime<Utc>) -> String {
    let readme = summary
        .readme_display()
        .unwrap_or_else(|| "NOT FOUND".to_string());

    let mut rows = vec![
        "# 📋 MD Files Connector Report".to_string(),
        format!("\n_Generated: {}_\n", generated_at.format("%Y-%m-%d %H:%M UTC")),
        "## 📊 Summary\n".to_string(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| 📄 Root README | `{}` |", readme),
        format!("| 📁 Total MD files (excl. root README) | {} |", summary.total),
        format!("| ✅ Linked in root README | {} |", summary.linked.len()),
        format!("| ⚠️ Isolated (not in root README) | {} |", summary.isolated.len()),
        format!("| 📊 README coverage | **{:.1}%** |", summary.coverage),
        String::new(),
    ];

    if !summary.linked.is_empty() {
        linked_section(summary, &mut rows);
    }
    if summary.isolated.is_empty() {
        rows.push("## 🎉 All MD files are linked in the root README!\n".to_string());
    } else {
        isolated_section(summary, &mut rows);
    }

    rows.push("---".to_string());
    rows.push(FOOTER.to_string());
    rows.join("\n")
}

pub fn write_report(path: &Path, summary: &Summary) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_report(summary, Utc::now()))?;
    tracing::debug!(report = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::references::ReferenceSet;
    use crate::scanner::MarkdownDocument;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn doc(path: &str, title: &str, description: &str, sections: &[&str]) -> MarkdownDocument {
        MarkdownDocument {
            path: PathBuf::from(path),
            title: title.to_string(),
            description: description.to_string(),
            word_count: 42,
            sections: sections.iter().map(|s| s.to_string()).collect(),
            is_readme: path.ends_with("README.md"),
            is_root_readme: path == "/p/README.md",
        }
    }

    fn summary<'a>(docs: &'a [MarkdownDocument], linked: &[usize], isolated: &[usize]) -> Summary<'a> {
        let classification = Classification {
            linked: linked.iter().map(|&i| &docs[i]).collect(),
            isolated: isolated.iter().map(|&i| &docs[i]).collect(),
            references: ReferenceSet::new(),
        };
        Summary::new(
            Path::new("/p"),
            Some(Path::new("/p/README.md")),
            docs,
            classification,
        )
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_report_with_isolated_files() {
        let docs = vec![
            doc("/p/README.md", "Root", "", &[]),
            doc("/p/CONTRIBUTING.md", "Contributing", "", &["A", "B", "C", "D", "E"]),
            doc("/p/docs/API.md", "API", "Calls a|b", &[]),
        ];
        let report = render_report(&summary(&docs, &[1], &[2]), at());

        assert!(report.contains("_Generated: 2024-05-01 09:30 UTC_"));
        assert!(report.contains("| 📄 Root README | `README.md` |"));
        assert!(report.contains("| 📁 Total MD files (excl. root README) | 2 |"));
        assert!(report.contains("| 📊 README coverage | **50.0%** |"));
        assert!(report.contains("| 1 | `CONTRIBUTING.md` | Contributing | 42 | A, B, C, D |"));
        assert!(report.contains("| 1 | `docs/API.md` | API | 42 | Calls a\\|b |"));
        assert!(report.contains("- [API](docs/API.md)\n  _Calls a|b_"));
        assert!(!report.contains("All MD files are linked"));
        assert!(report.ends_with(FOOTER));
    }

    #[test]
    fn test_report_all_linked() {
        let docs = vec![
            doc("/p/README.md", "Root", "", &[]),
            doc("/p/guide.md", "Guide", "", &[]),
        ];
        let report = render_report(&summary(&docs, &[1], &[]), at());

        assert!(report.contains("## 🎉 All MD files are linked in the root README!"));
        assert!(report.contains("| 📊 README coverage | **100.0%** |"));
        assert!(!report.contains("Suggested additions"));
        assert!(report.contains("| 1 | `guide.md` | Guide | 42 | — |"));
    }

    #[test]
    fn test_write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![doc("/p/README.md", "Root", "", &[])];
        let path = dir.path().join("out/MD_REPORT.md");

        write_report(&path, &summary(&docs, &[], &[])).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("# 📋 MD Files Connector Report"));
    }
}
