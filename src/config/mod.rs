//! Configuration management for jarcompat
//!
//! The effective configuration is built in layers by [`ConfigLoader`] and
//! extracted into [`CompatConfig`], an immutable snapshot shared by every
//! comparison task.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reports::ReportFormat;
use crate::utils;

pub mod core;
mod lenient;
mod smart_load;

pub use self::core::{ConfigLoader, PROJECT_CONFIG_FILE};

/// Section keys recognised in `output_sections`
pub const SECTION_MISSING: &str = "missing";
pub const SECTION_NEW: &str = "new";
pub const SECTION_PROBLEM: &str = "problem";
pub const SECTION_COMPATIBLE: &str = "compatible";

/// Main configuration structure for jarcompat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// Number of comparisons run at once (0 = one per logical CPU)
    pub num_threads: usize,

    /// Only compare archives deployed to an Android image partition
    pub android_built_out_mode: bool,

    /// Working directory of the compliance checker; `compat_reports/` lands here
    #[serde(deserialize_with = "lenient::path")]
    pub output_dir: PathBuf,

    /// Scratch space for converted archives
    #[serde(deserialize_with = "lenient::path")]
    pub temp_dir: PathBuf,

    /// URL prefix used in place of `output_dir` when linking reports
    #[serde(deserialize_with = "lenient::optional_string")]
    pub report_base: Option<String>,

    /// Output format of the summary
    pub report_format: ReportFormat,

    /// Sections to print, matched by substring
    #[serde(deserialize_with = "lenient::string")]
    pub output_sections: String,

    /// Skip empty sections and the compatible list
    pub dont_report_if_no_issue: bool,

    /// Echo tool output and progress
    pub verbose: bool,

    /// Remove `temp_dir` when the run finishes
    pub cleanup_temporary: bool,

    /// External tool commands
    pub tools: ToolsConfig,
}

/// External tool commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// API compliance checker
    #[serde(deserialize_with = "lenient::string")]
    pub checker: String,

    #[serde(deserialize_with = "lenient::string")]
    pub unzip: String,

    #[serde(deserialize_with = "lenient::string")]
    pub zip: String,

    /// Dex to jar converter
    #[serde(deserialize_with = "lenient::string")]
    pub dex2jar: String,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            android_built_out_mode: false,
            output_dir: PathBuf::from("."),
            temp_dir: PathBuf::from("temp"),
            report_base: None,
            report_format: ReportFormat::default(),
            output_sections: format!(
                "{SECTION_MISSING}|{SECTION_NEW}|{SECTION_PROBLEM}|{SECTION_COMPATIBLE}"
            ),
            dont_report_if_no_issue: false,
            verbose: false,
            cleanup_temporary: true,
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            checker: "japi-compliance-checker".to_string(),
            unzip: "unzip".to_string(),
            zip: "zip".to_string(),
            dex2jar: "d2j-dex2jar.sh".to_string(),
        }
    }
}

impl CompatConfig {
    /// Fill in derived values and validate
    pub fn resolve(mut self) -> Result<Self> {
        if self.num_threads == 0 {
            self.num_threads = crate::parallel::default_parallelism();
        }

        // Converters run with their own working directory
        self.temp_dir = utils::absolute_path(&self.temp_dir)?;

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            bail!("Number of threads must be at least 1");
        }

        if self.tools.checker.trim().is_empty() {
            bail!("Compliance checker command cannot be empty");
        }

        Ok(())
    }

    /// Base used when building report links
    pub fn report_link_base(&self) -> String {
        match &self.report_base {
            Some(base) => base.clone(),
            None => self.output_dir.to_string_lossy().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fills_thread_count() {
        let config = CompatConfig::default().resolve().unwrap();
        assert!(config.num_threads >= 1);
        assert!(config.temp_dir.is_absolute());
    }

    #[test]
    fn test_report_base_falls_back_to_output_dir() {
        let mut config = CompatConfig::default();
        config.output_dir = PathBuf::from("/srv/reports");
        assert_eq!(config.report_link_base(), "/srv/reports");

        config.report_base = Some("http://ci.example.com/compat".to_string());
        assert_eq!(config.report_link_base(), "http://ci.example.com/compat");
    }

    #[test]
    fn test_validate_rejects_empty_checker() {
        let mut config = CompatConfig::default();
        config.num_threads = 1;
        config.tools.checker = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
