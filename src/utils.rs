use crate::error::{Result, TrackerError};
use chrono::{Days, NaiveDate, Utc};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.checked_sub_days(Days::new(1)))
        .ok_or_else(|| TrackerError::DateError(format!("No such month: {}-{:02}", year, month)))
}

/// Parses a date key in the format "YYYY-MM-DD"
pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).map_err(|_| {
        TrackerError::DateError(format!(
            "Invalid date format: {}. Expected YYYY-MM-DD",
            key
        ))
    })
}

/// Parses a month key in the format "YYYY-MM"
/// Returns the first day of that month
pub fn parse_month_key(key: &str) -> Result<NaiveDate> {
    let start_str = format!("{}-01", key.trim());
    NaiveDate::parse_from_str(&start_str, DATE_KEY_FORMAT).map_err(|_| {
        TrackerError::DateError(format!("Invalid month format: {}. Expected YYYY-MM", key))
    })
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn month_key(date: NaiveDate) -> String {
    date.format(MONTH_KEY_FORMAT).to_string()
}

/// Today's date in UTC, which is the date new entries are keyed under.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn current_month_key() -> String {
    month_key(today())
}

/// Formats an amount the way the dashboard cards show it: grouped thousands,
/// no trailing zeros for whole numbers and at most two decimals otherwise.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents > 0 {
        let fraction = format!("{:02}", cents);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 12).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert!(last_day_of_month(2023, 13).is_err());
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_date_key("2024-06-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
        assert_eq!(
            parse_month_key("2024-06").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(parse_date_key("2024-02-31").is_err());
        assert!(parse_month_key("June 2024").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(1850.0), "1,850");
        assert_eq!(format_amount(1234567.5), "1,234,567.5");
        assert_eq!(format_amount(-200.0), "-200");
        assert_eq!(format_amount(12.346), "12.35");
    }

    #[test]
    fn test_keys_round_trip_through_formatting() {
        let d = parse_date_key("2024-06-09").unwrap();
        assert_eq!(date_key(d), "2024-06-09");
        assert_eq!(month_key(d), "2024-06");
    }

    #[test]
    fn test_today_is_utc_date() {
        let before = Utc::now().date_naive();
        let day = today();
        let after = Utc::now().date_naive();
        assert!(day == before || day == after);
    }
}
