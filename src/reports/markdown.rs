use std::io::{self, Write};

use super::{Reporter, Row, RowFlags};
use crate::utils;

const SEPARATOR: &str = "|";

/// Markdown headings and tables
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Turn URLs into links labelled with their last path segment
    fn filter_value(value: &str) -> String {
        if value.starts_with("http://") || value.starts_with("https://") {
            format!("[{}]({})", utils::filename_from_path(value), value)
        } else {
            value.to_string()
        }
    }
}

impl Reporter for MarkdownReporter {
    fn title_out(&self, out: &mut dyn Write, title: &str) -> io::Result<()> {
        writeln!(out, "# {title}")?;
        writeln!(out)
    }

    fn row_out(&self, out: &mut dyn Write, row: &Row, flags: RowFlags) -> io::Result<()> {
        let Some(cells) = row.cells(flags) else {
            if let Row::Scalar(value) = row {
                writeln!(out, "{SEPARATOR} {} {SEPARATOR}", Self::filter_value(value))?;
            }
            return Ok(());
        };

        let mut line = String::from(SEPARATOR);
        for cell in cells {
            // Header cells are column names
            let cell = if flags.key_output {
                cell.to_string()
            } else {
                Self::filter_value(cell)
            };
            line.push_str(&format!(" {cell} {SEPARATOR}"));
        }
        writeln!(out, "{line}")?;

        let width = row.width();
        if flags.first_line && width > 0 {
            writeln!(out, "{SEPARATOR}{}", " :--- |".repeat(width))?;
        }
        Ok(())
    }
}
