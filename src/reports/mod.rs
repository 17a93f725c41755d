//! Summary report rendering
//!
//! A [`Reporter`] turns titles and rows into one output format. The driver
//! picks one from the configured [`ReportFormat`] and hands it rows built from
//! file names or comparison results; [`sections`] decides which sections get
//! written at all.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub mod csv;
pub mod markdown;
pub mod plain;
pub mod sections;

pub use sections::{Section, SectionEmitter};

/// Output format of the summary report
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Csv,
    #[serde(alias = "ruby")]
    #[value(alias = "ruby")]
    Plain,
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Named columns; keys of the first row become the header
    Keyed(IndexMap<String, String>),
    List(Vec<String>),
    Scalar(String),
}

impl Row {
    /// Cells selected by `flags`, in column order. `None` for scalars.
    pub fn cells(&self, flags: RowFlags) -> Option<Vec<&str>> {
        match self {
            Row::Keyed(map) => {
                let mut cells = Vec::new();
                for (key, value) in map {
                    if flags.key_output {
                        cells.push(key.as_str());
                    }
                    if flags.val_output {
                        cells.push(value.as_str());
                    }
                }
                Some(cells)
            }
            Row::List(values) => Some(if flags.val_output {
                values.iter().map(String::as_str).collect()
            } else {
                Vec::new()
            }),
            Row::Scalar(_) => None,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        match self {
            Row::Keyed(map) => map.len(),
            Row::List(values) => values.len(),
            Row::Scalar(_) => 1,
        }
    }
}

/// What a row renderer should write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFlags {
    pub key_output: bool,
    pub val_output: bool,
    /// The row opens the table
    pub first_line: bool,
}

impl RowFlags {
    /// Column names of the first keyed row
    pub const HEADER: RowFlags = RowFlags {
        key_output: true,
        val_output: false,
        first_line: true,
    };

    pub const VALUES: RowFlags = RowFlags {
        key_output: false,
        val_output: true,
        first_line: false,
    };
}

/// Rendering strategy for one output format
pub trait Reporter: Send + Sync {
    fn title_out(&self, out: &mut dyn Write, title: &str) -> io::Result<()>;

    fn row_out(&self, out: &mut dyn Write, row: &Row, flags: RowFlags) -> io::Result<()>;

    /// Header from the keys of a keyed first row, then the values of every row
    fn report(&self, out: &mut dyn Write, rows: &[Row]) -> io::Result<()> {
        if let Some(first) = rows.first().filter(|row| matches!(row, Row::Keyed(_))) {
            self.row_out(out, first, RowFlags::HEADER)?;
        }

        for row in rows {
            self.row_out(out, row, RowFlags::VALUES)?;
        }
        Ok(())
    }
}

pub fn reporter_for(format: ReportFormat) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Markdown => Box::new(markdown::MarkdownReporter),
        ReportFormat::Csv => Box::new(csv::CsvReporter),
        ReportFormat::Plain => Box::new(plain::PlainReporter),
    }
}

/// Single-column keyed rows, one per name
pub fn rows_from_names(names: &[String], key: &str) -> Vec<Row> {
    names
        .iter()
        .map(|name| {
            let mut row = IndexMap::new();
            row.insert(key.to_string(), name.clone());
            Row::Keyed(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_names() {
        #[derive(Deserialize)]
        struct Holder {
            format: ReportFormat,
        }

        for (text, expected) in [
            ("markdown", ReportFormat::Markdown),
            ("csv", ReportFormat::Csv),
            ("plain", ReportFormat::Plain),
            ("ruby", ReportFormat::Plain),
        ] {
            let holder: Holder = figment::Figment::new()
                .merge(figment::providers::Serialized::default("format", text))
                .extract()
                .unwrap();
            assert_eq!(holder.format, expected, "{text}");
        }
    }

    #[test]
    fn test_clap_accepts_ruby_alias() {
        use clap::ValueEnum;
        assert_eq!(ReportFormat::from_str("ruby", false), Ok(ReportFormat::Plain));
        assert_eq!(ReportFormat::from_str("csv", false), Ok(ReportFormat::Csv));
    }

    #[test]
    fn test_rows_from_names() {
        let rows = rows_from_names(&["a.jar".to_string(), "b.jar".to_string()], "jarName");
        assert_eq!(rows.len(), 2);
        let Row::Keyed(first) = &rows[0] else {
            panic!("expected keyed row");
        };
        assert_eq!(first["jarName"], "a.jar");
    }

    #[test]
    fn test_cells_follow_flags() {
        let rows = rows_from_names(&["a.jar".to_string()], "jarName");
        assert_eq!(rows[0].cells(RowFlags::HEADER), Some(vec!["jarName"]));
        assert_eq!(rows[0].cells(RowFlags::VALUES), Some(vec!["a.jar"]));
        assert_eq!(Row::Scalar("x".into()).cells(RowFlags::VALUES), None);
    }

    #[test]
    fn test_list_rows_have_no_header() {
        let mut out = Vec::new();
        let rows = vec![Row::List(vec!["a".into(), "b".into()])];
        reporter_for(ReportFormat::Plain)
            .report(&mut out, &rows)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\tb\n");
    }
}
