use crate::indicators;

/// Normalize linearized PDF text into a canonical line-oriented form.
///
/// Steps:
/// 1. Convert CRLF, CR and form feeds to LF
/// 2. Collapse runs of horizontal whitespace (including NBSP) to one space
/// 3. Trim every line
/// 4. Collapse every run of blank lines to a single blank line
/// 5. Trim the whole document
///
/// Line boundaries are preserved; label and header detection depends on them.
/// The function is idempotent.
pub fn normalize_text(text: &str) -> String {
    let unified = text
        .replace("\r\n", "\n")
        .replace(['\r', '\x0c', '\u{2028}', '\u{2029}'], "\n");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;

    for raw_line in unified.split('\n') {
        let line = collapse_horizontal(raw_line);
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(&line);
    }

    out
}

/// Collapse horizontal whitespace to single spaces and trim.
fn collapse_horizontal(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }
    result
}

/// Normalize an indicator name as printed to its canonical code.
///
/// Dashes are unified, spacing around dashes removed, then the synonym table
/// is consulted. Unknown indicators pass through upper-cased.
pub fn normalize_indicator(raw: &str) -> String {
    let unified: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            _ => c,
        })
        .collect();
    let compact = collapse_horizontal(&unified)
        .replace(" - ", "-")
        .replace("- ", "-")
        .replace(" -", "-");

    match indicators::lookup(&compact) {
        Some(def) => def.code.to_string(),
        None => compact.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_endings_unified() {
        assert_eq!(normalize_text("a\r\nb\rc\x0cd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_horizontal_whitespace_collapsed() {
        assert_eq!(
            normalize_text("  GWP\t\tkg  CO2\u{a0}eq   1,0E+0  "),
            "GWP kg CO2 eq 1,0E+0"
        );
    }

    #[test]
    fn test_blank_runs_collapsed() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n   \n\t\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\nb"), "a\nb");
    }

    #[test]
    fn test_document_trimmed() {
        assert_eq!(normalize_text("\n\n  title \n\n"), "title");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_lines_not_joined() {
        let out = normalize_text("Productnaam:\nAsfalt AC 16");
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_normalize_indicator_synonyms() {
        assert_eq!(normalize_indicator("GWP-fossil"), "GWP-F");
        assert_eq!(normalize_indicator("GWP \u{2013} total"), "GWP-TOTAL");
        assert_eq!(normalize_indicator(" adp-mm "), "ADP-MM");
        assert_eq!(normalize_indicator("eci"), "ECI");
    }

    #[test]
    fn test_normalize_indicator_passthrough() {
        assert_eq!(normalize_indicator("Custom-X"), "CUSTOM-X");
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in "[ a-zA-Z0-9,.:\\-\t\r\n\u{a0}\x0c]{0,200}") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once);
        }
    }
}
