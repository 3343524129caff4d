use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::classify::Summary;
use crate::error::Result;

/// Somewhere a finished run can be reported to besides the terminal
pub trait OutputSink {
    fn emit(&mut self, summary: &Summary) -> Result<()>;
}

/// Outside CI there is nothing to write
pub struct NoopSink;

impl OutputSink for NoopSink {
    fn emit(&mut self, _summary: &Summary) -> Result<()> {
        Ok(())
    }
}

/// `key=value` lines, shared by the GitHub sink and the `outputs` command
pub fn output_lines(summary: &Summary) -> Vec<String> {
    vec![
        format!("total={}", summary.total),
        format!("linked={}", summary.linked.len()),
        format!("isolated={}", summary.isolated.len()),
        format!("coverage={:.1}", summary.coverage),
        format!("readmes={}", summary.readmes),
    ]
}

pub fn step_summary(summary: &Summary) -> String {
    let mut lines = vec![
        "## 📋 MD Files Connector\n".to_string(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Total MD files | {} |", summary.total),
        format!("| ✅ Linked in root README | {} |", summary.linked.len()),
        format!("| ⚠️ Isolated | {} |", summary.isolated.len()),
        format!("| Coverage | **{:.1}%** |", summary.coverage),
        String::new(),
    ];

    if !summary.isolated.is_empty() {
        lines.push("### ⚠️ Isolated Files\n".to_string());
        for doc in &summary.isolated {
            lines.push(format!("- `{}` — {}", summary.display_path(&doc.path), doc.title));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Appends to the files GitHub Actions names in `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`
pub struct GithubActionsSink {
    pub output: Option<PathBuf>,
    pub step_summary: Option<PathBuf>,
}

fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

impl OutputSink for GithubActionsSink {
    fn emit(&mut self, summary: &Summary) -> Result<()> {
        if let Some(path) = &self.output {
            let mut text = output_lines(summary).join("\n");
            text.push('\n');
            append(path, &text)?;
        }
        if let Some(path) = &self.step_summary {
            append(path, &step_summary(summary))?;
        }
        Ok(())
    }
}

/// Picks the sink once, from the environment
pub fn sink_from_env() -> Box<dyn OutputSink> {
    let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let output = var("GITHUB_OUTPUT");
    let step_summary = var("GITHUB_STEP_SUMMARY");

    if output.is_none() && step_summary.is_none() {
        Box::new(NoopSink)
    } else {
        tracing::debug!(?output, ?step_summary, "writing GitHub Actions outputs");
        Box::new(GithubActionsSink {
            output,
            step_summary,
        })
    }
}
