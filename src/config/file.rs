//! TOML run file
//!
//! ```toml
//! table = "sales.orders"
//! nodes = ["impalad-01", "impalad-02"]
//! impala_shell = "/usr/bin/impala-shell"
//!
//! [run]
//! timeout_secs = 30
//! max_parallel = 4
//! ```
//!
//! Every key is optional; command-line flags take precedence.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::run::RunConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshFile {
    #[serde(default)]
    pub table: Option<String>,

    #[serde(default)]
    pub nodes: Vec<String>,

    /// Path or name of the impala-shell program
    #[serde(default)]
    pub impala_shell: Option<String>,

    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// 0 means unbounded
    #[serde(default)]
    pub max_parallel: Option<usize>,
}

impl RefreshFile {
    /// Load and validate a run file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: RefreshFile = toml::from_str(content)?;
        if file.run.timeout_secs == Some(0) {
            bail!("run.timeout_secs must be at least 1");
        }
        Ok(file)
    }

    /// Overlay this file's `[run]` settings on `base`
    pub fn apply_to(&self, base: RunConfig) -> RunConfig {
        let mut config = base;
        if let Some(secs) = self.run.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(limit) = self.run.max_parallel {
            config = config.with_concurrency_limit(limit);
        }
        config
    }
}
