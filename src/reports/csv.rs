use std::io::{self, Write};

use super::{Reporter, Row, RowFlags};

/// Comma-separated rows; titles become blank lines
pub struct CsvReporter;

impl Reporter for CsvReporter {
    fn title_out(&self, out: &mut dyn Write, _title: &str) -> io::Result<()> {
        writeln!(out)
    }

    fn row_out(&self, out: &mut dyn Write, row: &Row, flags: RowFlags) -> io::Result<()> {
        let cells = match (row, row.cells(flags)) {
            (_, Some(cells)) => cells,
            (Row::Scalar(value), None) => vec![value.as_str()],
            _ => return Ok(()),
        };

        if cells.is_empty() {
            return writeln!(out);
        }

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        writer.write_record(&cells)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatibilityResult;
    use crate::reports::rows_from_names;

    fn render(rows: &[Row]) -> String {
        let mut out = Vec::new();
        CsvReporter.report(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_title_is_blank_line() {
        let mut out = Vec::new();
        CsvReporter.title_out(&mut out, "missing files").unwrap();
        assert_eq!(out, b"\n");
    }

    #[test]
    fn test_result_rows() {
        let result = CompatibilityResult {
            bin_compatibility: 100,
            src_compatibility: 100,
            report: "./compat_reports/a.jar/v1_to_v2/compat_report.html".into(),
            ..CompatibilityResult::new("a.jar")
        };

        assert_eq!(
            render(&[result.to_row()]),
            "jarName,binCompatibility,srcCompatibility,binProblem,binWarning,srcProblem,srcWarning,report\n\
             a.jar,100,100,0,0,0,0,./compat_reports/a.jar/v1_to_v2/compat_report.html\n"
        );
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let rendered = render(&rows_from_names(&["odd,name.jar".into()], "jarName"));
        assert_eq!(rendered, "jarName\n\"odd,name.jar\"\n");
    }
}
