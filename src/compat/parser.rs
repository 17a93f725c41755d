use super::CompatibilityResult;

const BIN_COMPAT: &str = "Binary compatibility: ";
const SRC_COMPAT: &str = "Source compatibility: ";
const BIN_TOTALS: &str = "Total binary compatibility problems: ";
const SRC_TOTALS: &str = "Total source compatibility problems: ";
const WARNINGS: &str = ", warnings: ";

/// Apply one line of compliance checker output to `result`.
///
/// Unrecognised lines leave the result untouched.
pub fn parse_line(result: &mut CompatibilityResult, line: &str) {
    if let Some(rest) = line.strip_prefix(BIN_COMPAT) {
        result.bin_compatibility = leading_number(rest);
    } else if let Some(rest) = line.strip_prefix(SRC_COMPAT) {
        result.src_compatibility = leading_number(rest);
    } else if let Some(rest) = line.strip_prefix(BIN_TOTALS) {
        if let Some((problems, warnings)) = parse_totals(rest) {
            result.bin_problem = problems;
            result.bin_warning = warnings;
        }
    } else if let Some(rest) = line.strip_prefix(SRC_TOTALS) {
        if let Some((problems, warnings)) = parse_totals(rest) {
            result.src_problem = problems;
            result.src_warning = warnings;
        }
    }
}

/// Leading decimal digits as a number; 0 when there are none
fn leading_number(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// `N, warnings: M` into `(N, M)`; `None` unless both separators are present
fn parse_totals(rest: &str) -> Option<(u32, u32)> {
    rest.find(',')?;
    let warnings_at = rest.find(WARNINGS)?;

    let problems = leading_number(rest);
    let warnings = leading_number(&rest[warnings_at + WARNINGS.len()..]);
    Some((problems, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(lines: &[&str]) -> CompatibilityResult {
        let mut result = CompatibilityResult::new("lib.jar");
        for line in lines {
            parse_line(&mut result, line);
        }
        result
    }

    #[test]
    fn test_parses_checker_summary() {
        let result = parse_all(&[
            "Binary compatibility: 97.5%",
            "Source compatibility: 100%",
            "Total binary compatibility problems: 3, warnings: 1",
            "Total source compatibility problems: 0, warnings: 0",
        ]);

        assert_eq!(result.bin_compatibility, 97);
        assert_eq!(result.src_compatibility, 100);
        assert_eq!(result.bin_problem, 3);
        assert_eq!(result.bin_warning, 1);
        assert_eq!(result.src_problem, 0);
        assert_eq!(result.src_warning, 0);
    }

    #[test]
    fn test_unrecognised_lines_are_ignored() {
        let result = parse_all(&[
            "Preparing, please wait ...",
            "Comparing APIs ...",
            "Report: compat_reports/lib.jar/v1_to_v2/compat_report.html",
            "",
        ]);
        assert_eq!(result, CompatibilityResult::new("lib.jar"));
    }

    #[test]
    fn test_totals_without_warnings_label_are_ignored() {
        let result = parse_all(&["Total binary compatibility problems: 4"]);
        assert_eq!(result.bin_problem, 0);
        assert_eq!(result.bin_warning, 0);
    }

    #[test]
    fn test_large_counts() {
        let result = parse_all(&["Total source compatibility problems: 1234, warnings: 56"]);
        assert_eq!(result.src_problem, 1234);
        assert_eq!(result.src_warning, 56);
    }

    #[test]
    fn test_non_numeric_percentage_is_zero() {
        let result = parse_all(&["Binary compatibility: n/a"]);
        assert_eq!(result.bin_compatibility, 0);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("42%"), 42);
        assert_eq!(leading_number("99.9%"), 99);
        assert_eq!(leading_number(""), 0);
        assert_eq!(leading_number("%"), 0);
    }
}
