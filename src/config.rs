use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConnectorError, Result};

pub const DEFAULT_CONFIG_FILE: &str = ".md-connector.toml";
pub const DEFAULT_REPORT_FILE: &str = "MD_REPORT.md";

/// Settings read from `.md-connector.toml`; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory-name patterns pruned from the walk (globs allowed)
    pub exclude: Vec<String>,

    /// Report location, relative to the project root unless absolute
    pub report: PathBuf,

    /// Skip writing the report
    pub no_report: bool,

    /// Exit non-zero when isolated files remain
    pub fail_on_isolated: bool,

    /// Honor `.gitignore` files while walking
    pub respect_gitignore: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
            report: PathBuf::from(DEFAULT_REPORT_FILE),
            no_report: false,
            fail_on_isolated: false,
            respect_gitignore: false,
        }
    }
}

pub fn default_excludes() -> Vec<String> {
    ["node_modules", ".git", "venv", ".venv", "__pycache__", "dist", "build"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConnectorError::Config(e.to_string()))
    }

    /// Load `path` (resolved against `root` when relative), or defaults when it is absent
    pub fn load_or_default(path: &Path, root: &Path) -> Result<Self> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };

        if path.is_file() {
            tracing::debug!(config = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Report path anchored at the project root
    pub fn report_path(&self, root: &Path) -> PathBuf {
        if self.report.is_absolute() {
            self.report.clone()
        } else {
            root.join(&self.report)
        }
    }
}
