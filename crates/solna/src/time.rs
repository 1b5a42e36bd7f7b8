#![forbid(unsafe_code)]

//! `xs:dateTime` handling.

use chrono::{DateTime, NaiveDateTime, Utc};
use solna_core::Error;

/// Parse an `xs:dateTime` value into UTC.
///
/// SAML requires UTC (`Z`), but offsets are honoured and a value without
/// any zone designator is read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::InvalidTimestamp(format!("{value:?}: {e}")))
}

/// Format a timestamp the way SAML writes them.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn utc_and_offsets() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T14:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T12:00:00").unwrap(), expected);
    }

    #[test]
    fn fractional_seconds() {
        let t = parse_timestamp("2024-05-01T12:00:00.250Z").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        assert!(matches!(
            parse_timestamp("2024-13-01T12:00:00Z"),
            Err(Error::InvalidTimestamp(_))
        ));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn formats_without_fraction() {
        let t = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(t), "2030-01-02T03:04:05Z");
    }
}
