use std::io::{self, Write};

use super::{Reporter, Row, RowFlags};

/// Untitled text output, tab-separated fields
pub struct PlainReporter;

impl Reporter for PlainReporter {
    fn title_out(&self, out: &mut dyn Write, title: &str) -> io::Result<()> {
        writeln!(out, "{title}")
    }

    fn row_out(&self, out: &mut dyn Write, row: &Row, flags: RowFlags) -> io::Result<()> {
        match (row, row.cells(flags)) {
            (_, Some(cells)) => writeln!(out, "{}", cells.join("\t")),
            (Row::Scalar(value), None) => writeln!(out, "{value}"),
            _ => Ok(()),
        }
    }
}
