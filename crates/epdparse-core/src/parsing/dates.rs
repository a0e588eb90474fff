use chrono::{Months, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").expect("valid ISO date regex")
});

static DUTCH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b").expect("valid Dutch date regex")
});

/// "1 januari 2022", "3 March 2021".
static DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+([a-z]{3,10})\.?\s+(\d{4})\b").expect("valid day-month regex")
});

/// "March 3, 2021".
static MONTH_NAME_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,10})\.?\s+(\d{1,2}),?\s+(\d{4})\b").expect("valid month-day regex")
});

/// Find a date anywhere in `text` and return it as `YYYY-MM-DD`.
///
/// Recognizes `YYYY-MM-DD`, `YYYY/MM/DD`, `DD-MM-YYYY`, `DD/MM/YYYY` (also
/// with dots) and Dutch/English month names. The earliest match in the text
/// wins; impossible dates are skipped.
pub fn normalize_date(text: &str) -> Option<String> {
    find_date(text).map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn find_date(text: &str) -> Option<NaiveDate> {
    let mut candidates: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in ISO_DATE.captures_iter(text) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
        }
    }
    for caps in DUTCH_DATE.captures_iter(text) {
        if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
            candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
        }
    }
    for caps in DAY_MONTH_NAME.captures_iter(text) {
        if let Some(month) = month_number(&caps[2]) {
            if let Some(date) = ymd(&caps[3], &month.to_string(), &caps[1]) {
                candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
            }
        }
    }
    for caps in MONTH_NAME_DAY.captures_iter(text) {
        if let Some(month) = month_number(&caps[1]) {
            if let Some(date) = ymd(&caps[3], &month.to_string(), &caps[2]) {
                candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
            }
        }
    }

    candidates
        .into_iter()
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, date)| date)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.as_str() {
        "januari" | "january" | "jan" => 1,
        "februari" | "february" | "feb" => 2,
        "maart" | "march" | "mrt" | "mar" => 3,
        "april" | "apr" => 4,
        "mei" | "may" => 5,
        "juni" | "june" | "jun" => 6,
        "juli" | "july" | "jul" => 7,
        "augustus" | "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "oktober" | "october" | "okt" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Expiration date used when a document states only its publication date:
/// the same day `years` calendar years later. 29 February maps to 28 February.
pub fn default_expiration(issue_date: &str, years: u32) -> Option<String> {
    let issued = NaiveDate::parse_from_str(issue_date, "%Y-%m-%d").ok()?;
    issued
        .checked_add_months(Months::new(years.checked_mul(12)?))
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_forms() {
        assert_eq!(normalize_date("2022-01-05").as_deref(), Some("2022-01-05"));
        assert_eq!(normalize_date("2022/1/5").as_deref(), Some("2022-01-05"));
    }

    #[test]
    fn test_dutch_forms() {
        assert_eq!(normalize_date("05-01-2022").as_deref(), Some("2022-01-05"));
        assert_eq!(normalize_date("5/1/2022").as_deref(), Some("2022-01-05"));
        assert_eq!(normalize_date("31.12.2023").as_deref(), Some("2023-12-31"));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(
            normalize_date("Datum: 1 januari 2022").as_deref(),
            Some("2022-01-01")
        );
        assert_eq!(
            normalize_date("Issued March 3, 2021").as_deref(),
            Some("2021-03-03")
        );
    }

    #[test]
    fn test_impossible_date_skipped() {
        assert_eq!(normalize_date("31-02-2022"), None);
        assert_eq!(normalize_date("geen datum"), None);
    }

    #[test]
    fn test_earliest_match_wins() {
        assert_eq!(
            normalize_date("01-06-2021 t/m 2026-06-01").as_deref(),
            Some("2021-06-01")
        );
    }

    #[test]
    fn test_default_expiration_five_years() {
        assert_eq!(
            default_expiration("2022-01-01", 5).as_deref(),
            Some("2027-01-01")
        );
        assert_eq!(
            default_expiration("2024-02-29", 5).as_deref(),
            Some("2029-02-28")
        );
        assert_eq!(default_expiration("not a date", 5), None);
    }
}
