//! API compatibility checking
//!
//! One [`CompatibilityCheckTask`] runs per archive present in both builds. It
//! prepares both archives, runs the compliance checker, parses its summary
//! into a [`CompatibilityResult`] and hands that to the shared [`ResultSet`].

use indexmap::IndexMap;

use crate::reports::Row;

pub mod aggregator;
pub mod parser;
pub mod task;

pub use aggregator::{Classification, ResultSet, classify_results};
pub use task::{CompatibilityCheckTask, VersionLabels};

/// Compliance checker summary for one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityResult {
    pub jar_name: String,
    /// Binary compatibility percentage (0-100)
    pub bin_compatibility: u32,
    /// Source compatibility percentage (0-100)
    pub src_compatibility: u32,
    pub bin_problem: u32,
    pub bin_warning: u32,
    pub src_problem: u32,
    pub src_warning: u32,
    /// Link to the checker's HTML report
    pub report: String,
}

impl CompatibilityResult {
    /// Zeroed result for `jar_name`
    pub fn new(jar_name: impl Into<String>) -> Self {
        Self {
            jar_name: jar_name.into(),
            bin_compatibility: 0,
            src_compatibility: 0,
            bin_problem: 0,
            bin_warning: 0,
            src_problem: 0,
            src_warning: 0,
            report: String::new(),
        }
    }

    /// 100% binary and source compatible with no problems or warnings
    pub fn is_fully_compatible(&self) -> bool {
        self.bin_compatibility == 100
            && self.src_compatibility == 100
            && self.bin_problem == 0
            && self.bin_warning == 0
            && self.src_problem == 0
            && self.src_warning == 0
    }

    /// Report row, columns in output order
    pub fn to_row(&self) -> Row {
        let mut row = IndexMap::new();
        row.insert("jarName".to_string(), self.jar_name.clone());
        row.insert("binCompatibility".to_string(), self.bin_compatibility.to_string());
        row.insert("srcCompatibility".to_string(), self.src_compatibility.to_string());
        row.insert("binProblem".to_string(), self.bin_problem.to_string());
        row.insert("binWarning".to_string(), self.bin_warning.to_string());
        row.insert("srcProblem".to_string(), self.src_problem.to_string());
        row.insert("srcWarning".to_string(), self.src_warning.to_string());
        row.insert("report".to_string(), self.report.clone());
        Row::Keyed(row)
    }
}

/// Location of the checker's HTML report for one archive
pub fn report_location(base: &str, jar_name: &str, old_label: &str, new_label: &str) -> String {
    format!("{base}/compat_reports/{jar_name}/{old_label}_to_{new_label}/compat_report.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(name: &str) -> CompatibilityResult {
        CompatibilityResult {
            bin_compatibility: 100,
            src_compatibility: 100,
            ..CompatibilityResult::new(name)
        }
    }

    #[test]
    fn test_fully_compatible_threshold() {
        assert!(clean("a.jar").is_fully_compatible());

        let variants: Vec<fn(&mut CompatibilityResult)> = vec![
            |r| r.bin_compatibility = 99,
            |r| r.src_compatibility = 0,
            |r| r.bin_problem = 1,
            |r| r.bin_warning = 1,
            |r| r.src_problem = 2,
            |r| r.src_warning = 3,
        ];

        for change in variants {
            let mut result = clean("a.jar");
            change(&mut result);
            assert!(!result.is_fully_compatible(), "{result:?}");
        }
    }

    #[test]
    fn test_zeroed_result_is_not_compatible() {
        assert!(!CompatibilityResult::new("broken.jar").is_fully_compatible());
    }

    #[test]
    fn test_row_column_order() {
        let Row::Keyed(row) = clean("a.jar").to_row() else {
            panic!("expected keyed row");
        };
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "jarName",
                "binCompatibility",
                "srcCompatibility",
                "binProblem",
                "binWarning",
                "srcProblem",
                "srcWarning",
                "report"
            ]
        );
        assert_eq!(row["binCompatibility"], "100");
    }

    #[test]
    fn test_report_location() {
        assert_eq!(
            report_location("http://ci/compat", "core.jar", "r1/out", "r2/out"),
            "http://ci/compat/compat_reports/core.jar/r1/out_to_r2/out/compat_report.html"
        );
    }
}
