use std::io::{self, Write};

use super::{Reporter, Row, reporter_for, rows_from_names};
use crate::compat::CompatibilityResult;
use crate::config::{
    CompatConfig, SECTION_COMPATIBLE, SECTION_MISSING, SECTION_NEW, SECTION_PROBLEM,
};

const EMPTY_SECTION: &str = "nothing";
const NAME_KEY: &str = "jarName";

/// Report sections in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Missing,
    New,
    Problem,
    Compatible,
}

impl Section {
    /// Key matched against `output_sections`
    pub fn key(self) -> &'static str {
        match self {
            Section::Missing => SECTION_MISSING,
            Section::New => SECTION_NEW,
            Section::Problem => SECTION_PROBLEM,
            Section::Compatible => SECTION_COMPATIBLE,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Missing => "missing files",
            Section::New => "new files",
            Section::Problem => "Potential problematic Jars",
            Section::Compatible => "100% compatible Jars",
        }
    }
}

/// Writes report sections with the configured reporter and filters
pub struct SectionEmitter {
    reporter: Box<dyn Reporter>,
    output_sections: String,
    dont_report_if_no_issue: bool,
}

impl SectionEmitter {
    pub fn new(config: &CompatConfig) -> Self {
        Self {
            reporter: reporter_for(config.report_format),
            output_sections: config.output_sections.clone(),
            dont_report_if_no_issue: config.dont_report_if_no_issue,
        }
    }

    pub fn is_enabled(&self, section: Section) -> bool {
        self.output_sections.contains(section.key())
    }

    /// Write one section.
    ///
    /// Disabled sections write nothing. With `dont_report_if_no_issue` an
    /// empty section is skipped and the compatible section never appears;
    /// otherwise an empty section prints `nothing`. Every section except the
    /// compatible one ends with a blank line.
    pub fn emit(&self, out: &mut dyn Write, section: Section, rows: &[Row]) -> io::Result<()> {
        if !self.is_enabled(section) {
            return Ok(());
        }

        let shown = match section {
            Section::Compatible => !self.dont_report_if_no_issue,
            _ => !self.dont_report_if_no_issue || !rows.is_empty(),
        };
        if !shown {
            return Ok(());
        }

        self.reporter.title_out(out, section.title())?;
        if rows.is_empty() {
            writeln!(out, "{EMPTY_SECTION}")?;
        } else {
            self.reporter.report(out, rows)?;
        }

        if section != Section::Compatible {
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn emit_names(&self, out: &mut dyn Write, section: Section, names: &[String]) -> io::Result<()> {
        self.emit(out, section, &rows_from_names(names, NAME_KEY))
    }

    pub fn emit_results(
        &self,
        out: &mut dyn Write,
        section: Section,
        results: &[CompatibilityResult],
    ) -> io::Result<()> {
        let rows: Vec<Row> = results.iter().map(CompatibilityResult::to_row).collect();
        self.emit(out, section, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;

    fn emitter(format: ReportFormat, sections: &str, dont_report: bool) -> SectionEmitter {
        let mut config = CompatConfig::default();
        config.report_format = format;
        config.output_sections = sections.to_string();
        config.dont_report_if_no_issue = dont_report;
        SectionEmitter::new(&config)
    }

    fn render(emitter: &SectionEmitter, section: Section, names: &[&str]) -> String {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mut out = Vec::new();
        emitter.emit_names(&mut out, section, &names).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_markdown_missing_section() {
        let emitter = emitter(ReportFormat::Markdown, "missing|new|problem|compatible", false);
        assert_eq!(
            render(&emitter, Section::Missing, &["a.jar"]),
            "# missing files\n\n| jarName |\n| :--- |\n| a.jar |\n\n"
        );
    }

    #[test]
    fn test_empty_section_prints_nothing_marker() {
        let emitter = emitter(ReportFormat::Plain, "missing|new|problem|compatible", false);
        assert_eq!(render(&emitter, Section::New, &[]), "new files\nnothing\n\n");
        assert_eq!(
            render(&emitter, Section::Compatible, &[]),
            "100% compatible Jars\nnothing\n"
        );
    }

    #[test]
    fn test_dont_report_if_no_issue() {
        let emitter = emitter(ReportFormat::Plain, "missing|new|problem|compatible", true);
        assert_eq!(render(&emitter, Section::Missing, &[]), "");
        assert_eq!(render(&emitter, Section::Problem, &[]), "");
        assert_eq!(render(&emitter, Section::Compatible, &["a.jar"]), "");
        assert_eq!(
            render(&emitter, Section::New, &["c.jar"]),
            "new files\njarName\nc.jar\n\n"
        );
    }

    #[test]
    fn test_disabled_sections_are_silent() {
        let emitter = emitter(ReportFormat::Plain, "problem", false);
        assert!(emitter.is_enabled(Section::Problem));
        assert_eq!(render(&emitter, Section::Missing, &["a.jar"]), "");
        assert_eq!(render(&emitter, Section::Compatible, &["a.jar"]), "");
    }

    #[test]
    fn test_csv_sections() {
        let emitter = emitter(ReportFormat::Csv, "missing|new", false);
        assert_eq!(render(&emitter, Section::Missing, &["a.jar"]), "\njarName\na.jar\n\n");
    }

    #[test]
    fn test_result_sections() {
        let emitter = emitter(ReportFormat::Plain, "problem|compatible", false);
        let result = CompatibilityResult {
            bin_compatibility: 100,
            src_compatibility: 100,
            report: "./r.html".into(),
            ..CompatibilityResult::new("b.jar")
        };

        let mut out = Vec::new();
        emitter
            .emit_results(&mut out, Section::Compatible, &[result])
            .unwrap();
        let rendered = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "100% compatible Jars");
        assert!(lines[1].starts_with("jarName\tbinCompatibility"));
        assert_eq!(lines[2], "b.jar\t100\t100\t0\t0\t0\t0\t./r.html");
    }
}
