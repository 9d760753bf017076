use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted in addition to RFC 3339. `%.f` also matches no fraction.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a ledger timestamp into UTC. Values without an offset are taken as UTC.
/// A bare `YYYY-MM-DD` is midnight of that day.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Exports often carry a " UTC" / "Z" suffix on otherwise naive values.
    let value = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix('Z'))
        .unwrap_or(value);

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accepts_common_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 24, 13, 5, 9).unwrap();
        assert_eq!(parse_timestamp("2024-06-24 13:05:09"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-24T13:05:09"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-24T13:05:09Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-24 13:05:09 UTC"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-24T15:05:09+02:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-06-24 13:05:09.000 "), Some(expected));
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-07-14"),
            Some(Utc.with_ymd_and_hms(2024, 7, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00:00"), None);
    }
}
