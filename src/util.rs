// Parsing and formatting helpers.
//
// Spreadsheet exports mix `85,5%`, `NA` and blanks in the same numeric
// columns, so everything goes through here before it reaches the classifier.
use num_format::{Locale, ToFormattedString};

/// True for the literal `NA` sentinel, ignoring case and surrounding spaces.
pub fn is_na(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("na")
}

/// Parse a percentage or plain number written the way the source sheets do.
///
/// - Trims whitespace and strips a trailing `%`.
/// - Treats `,` as the decimal separator.
/// - Returns `None` for empty cells, `NA`, and anything unparseable.
pub fn parse_number(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || is_na(s) {
        return None;
    }
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    let s = s.replace(',', ".");
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Render a number without trailing zeros (`100`, `85.5`).
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
