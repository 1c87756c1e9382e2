//! Date and time display helpers. All times are handled in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use shared::domain::Timeslot;

pub const APP_DATE_FORMAT: &str = "%d.%m.%y %H:%M";
/// Shape of a `datetime-local` form value.
pub const APP_LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn format_date_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.format(APP_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn to_local_input(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.format(APP_LOCAL_DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Accepts `YYYY-MM-DDTHH:MM`, with optional seconds, or a full RFC 3339 timestamp.
pub fn parse_local_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    [APP_LOCAL_DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Start of the current day, used to prefill new timeslots.
pub fn default_local_input(now: DateTime<Utc>) -> String {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.format(APP_LOCAL_DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// `28.02. 10:47 - 21:13`
pub fn timeslot_span(slot: &Timeslot) -> Option<String> {
    let start = slot.start?;
    let end = slot.end?;
    Some(format!(
        "{} {} - {}",
        start.format("%d.%m."),
        start.format("%H:%M"),
        end.format("%H:%M")
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 28, h, m, 35).single().expect("valid")
    }

    #[test]
    fn formats_for_tables_and_inputs() {
        assert_eq!(format_date_time(Some(at(10, 47))), "28.02.25 10:47");
        assert_eq!(to_local_input(Some(at(10, 47))), "2025-02-28T10:47");
        assert_eq!(format_date_time(None), "");
    }

    #[test]
    fn parses_local_input_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 2, 28, 2, 30, 0).single();
        assert_eq!(parse_local_input("2025-02-28T02:30"), expected);
        assert_eq!(parse_local_input("2025-02-28T02:30:00"), expected);
        assert_eq!(parse_local_input("2025-02-28T02:30:00Z"), expected);
        assert_eq!(parse_local_input("28.02.2025"), None);
    }

    #[test]
    fn default_input_is_start_of_day() {
        assert_eq!(default_local_input(at(21, 13)), "2025-02-28T00:00");
    }

    #[test]
    fn span_needs_both_ends() {
        let slot = Timeslot {
            id: None,
            start: Some(at(10, 47)),
            end: Some(at(21, 13)),
        };
        assert_eq!(timeslot_span(&slot).as_deref(), Some("28.02. 10:47 - 21:13"));
        assert_eq!(timeslot_span(&Timeslot::default()), None);
    }
}
