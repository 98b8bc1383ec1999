use chrono::{DateTime, NaiveDate};

/// Patterns tried in order when no explicit list is configured. ISO and the
/// common slash forms come first, then the dotted and dashed day-first
/// layouts some European exports use. chrono accepts 1–2 digit day/month
/// for `%d`/`%m`, so `5.1.2024` parses under `%d.%m.%Y`.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y",
];

/// Best-effort parse of a heterogeneous date cell into a calendar date.
/// Returns `None` when no attempt succeeds; the caller drops the row.
pub fn normalize(raw: &str) -> Option<NaiveDate> {
    normalize_with(raw, DEFAULT_PATTERNS.iter().copied())
}

/// Like [`normalize`] but with an explicit pattern list. A full RFC 3339
/// timestamp is always accepted first, independent of the list.
pub fn normalize_with<'a, I>(raw: &str, patterns: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    patterns
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn iso_date() {
        assert_eq!(normalize("2024-01-05"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn rfc3339_timestamp_keeps_calendar_date() {
        assert_eq!(normalize("2024-01-05T10:30:00Z"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn us_slash_date() {
        assert_eq!(normalize("01/15/2024"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn day_first_slash_when_month_impossible() {
        // 15 can't be a month, so the day-first pattern picks it up.
        assert_eq!(normalize("15/01/2024"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn dotted_day_first_without_zero_padding() {
        assert_eq!(normalize("5.1.2024"), Some(d(2024, 1, 5)));
        assert_eq!(normalize("31.12.2023"), Some(d(2023, 12, 31)));
    }

    #[test]
    fn dashed_day_first() {
        assert_eq!(normalize("5-1-2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(normalize("not-a-date"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("32.13.2024"), None);
    }

    #[test]
    fn custom_pattern_list_is_respected() {
        let got = normalize_with("2024|01|05", ["%Y|%m|%d"]);
        assert_eq!(got, Some(d(2024, 1, 5)));
        assert_eq!(normalize_with("2024-01-05", ["%Y|%m|%d"]), None);
    }
}
