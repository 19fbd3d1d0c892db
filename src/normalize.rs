use chrono::{DateTime, Utc};

/// Parse a source-provided timestamp into UTC.
///
/// Tries strict RFC 3339 first (a trailing `Z` is accepted as the zero UTC
/// offset), then the RFC 2822 mail-message format some mirrors emit. Returns
/// `None` for anything else; a bad timestamp must never abort a record.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Parse a locale-formatted monetary amount.
///
/// Strips the euro sign and interior spaces, then disambiguates separators:
/// with both `,` and `.` present the dot is a thousands separator and the
/// comma the decimal point; with only `,` the comma is the decimal point;
/// otherwise the string is parsed as-is. Returns `None` when unparseable.
pub fn parse_money(value: &str) -> Option<f64> {
    let raw: String = value
        .trim()
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .collect();
    if raw.is_empty() {
        return None;
    }

    let normalized = if raw.contains(',') && raw.contains('.') {
        raw.replace('.', "").replace(',', ".")
    } else if raw.contains(',') {
        raw.replace(',', ".")
    } else {
        raw
    };

    normalized.parse::<f64>().ok()
}
