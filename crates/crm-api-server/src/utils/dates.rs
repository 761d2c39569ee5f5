use chrono::{Datelike, Duration, NaiveDate};

/// Monday–Sunday window containing `today`, used by the follow-up queue's
/// "this week" filter.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// Best-effort date normalization for imported cells. Accepts ISO dates,
/// `DD/MM/YYYY`, `DD-MM-YYYY` and `MM/DD/YYYY`; anything else is `None`.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}

/// Excel stores dates as serial day counts from 1899-12-30 (with the
/// historical leap-year bug already baked into that epoch choice).
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_bounds_runs_monday_through_sunday() {
        // 2025-06-18 is a Wednesday
        let (start, end) = week_bounds(d(2025, 6, 18));
        assert_eq!(start, d(2025, 6, 16));
        assert_eq!(end, d(2025, 6, 22));
    }

    #[test]
    fn week_bounds_on_monday_and_sunday_edges() {
        let (start, end) = week_bounds(d(2025, 6, 16)); // Monday
        assert_eq!((start, end), (d(2025, 6, 16), d(2025, 6, 22)));
        let (start, end) = week_bounds(d(2025, 6, 22)); // Sunday
        assert_eq!((start, end), (d(2025, 6, 16), d(2025, 6, 22)));
    }

    #[test]
    fn flexible_date_accepts_common_layouts() {
        assert_eq!(parse_flexible_date("2025-01-31"), Some(d(2025, 1, 31)));
        assert_eq!(parse_flexible_date("31/01/2025"), Some(d(2025, 1, 31)));
        assert_eq!(parse_flexible_date("31-01-2025"), Some(d(2025, 1, 31)));
        assert_eq!(parse_flexible_date("not a date"), None);
        assert_eq!(parse_flexible_date(""), None);
    }

    #[test]
    fn excel_serial_maps_known_dates() {
        // 45658 is 2025-01-01 in the 1900 date system
        assert_eq!(from_excel_serial(45658.0), Some(d(2025, 1, 1)));
        assert_eq!(from_excel_serial(0.0), None);
        assert_eq!(from_excel_serial(f64::NAN), None);
    }
}
