//! Excel serial dates.
//!
//! Workbooks store dates as numbers (days since an epoch) and only the cell's
//! number format says that a number is a date. Readers use
//! [`is_date_format`] to recognise those formats and [`serial_to_text`] to
//! render the value as ISO text.
//!
//! - 1900 system: serial 1 == 1900-01-01, and serial 60 is the non-existent
//!   1900-02-29 kept for Lotus 1-2-3 compatibility.
//! - 1904 system: serial 0 == 1904-01-01.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Built-in number format IDs that display dates or times
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
}

/// Check whether a custom number format code displays a date or time
///
/// Quoted literals, escaped characters and bracketed sections (colors,
/// conditions, locales) are ignored; elapsed-time brackets such as `[h]`
/// still count.
pub fn is_date_format_code(code: &str) -> bool {
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let inner = inner.to_ascii_lowercase();
                if !inner.is_empty() && inner.chars().all(|ch| matches!(ch, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }
    false
}

/// Check whether a format (built-in ID, optional custom code) is a date format
pub fn is_date_format(id: u32, custom_code: Option<&str>) -> bool {
    match custom_code {
        Some(code) => is_date_format_code(code),
        None => is_builtin_date_format(id),
    }
}

/// Convert a serial number to a date-time
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    let (base, days) = if date_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, days)
    } else if days <= 60 {
        // The phantom 1900-02-29 (serial 60) collapses onto 1900-02-28
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, days.min(59))
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, days)
    };

    base.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Render a serial number as ISO text
///
/// Whole days render as `YYYY-MM-DD`, pure times (serial below one day in
/// the 1900 system) as `HH:MM:SS`, anything else as `YYYY-MM-DD HH:MM:SS`.
pub fn serial_to_text(serial: f64, date_1904: bool) -> Option<String> {
    let dt = serial_to_datetime(serial, date_1904)?;
    let has_time = dt.time() != chrono::NaiveTime::MIN;

    if !date_1904 && serial < 1.0 {
        return Some(dt.format("%H:%M:%S").to_string());
    }
    if has_time {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    } else {
        Some(dt.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_date_ids() {
        assert!(is_builtin_date_format(14));
        assert!(is_builtin_date_format(22));
        assert!(!is_builtin_date_format(0));
        assert!(!is_builtin_date_format(49));
    }

    #[test]
    fn test_custom_date_codes() {
        assert!(is_date_format_code("yyyy-mm-dd"));
        assert!(is_date_format_code("dd/mm/yyyy;@"));
        assert!(is_date_format_code("[$-409]mmmm d, yyyy"));
        assert!(is_date_format_code("[h]:mm:ss"));
        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("#,##0 \"days\""));
        assert!(!is_date_format_code("[Red]#,##0"));
        assert!(!is_date_format_code("General"));
    }

    #[test]
    fn test_serial_1900() {
        assert_eq!(serial_to_text(1.0, false).unwrap(), "1900-01-01");
        assert_eq!(serial_to_text(59.0, false).unwrap(), "1900-02-28");
        assert_eq!(serial_to_text(61.0, false).unwrap(), "1900-03-01");
        assert_eq!(serial_to_text(45306.0, false).unwrap(), "2024-01-15");
    }

    #[test]
    fn test_serial_with_time() {
        assert_eq!(
            serial_to_text(45306.5, false).unwrap(),
            "2024-01-15 12:00:00"
        );
        assert_eq!(serial_to_text(0.75, false).unwrap(), "18:00:00");
    }

    #[test]
    fn test_serial_1904() {
        assert_eq!(serial_to_text(0.0, true).unwrap(), "1904-01-01");
        assert_eq!(serial_to_text(43844.0, true).unwrap(), "2024-01-15");
    }

    #[test]
    fn test_invalid_serial() {
        assert_eq!(serial_to_text(-1.0, false), None);
        assert_eq!(serial_to_text(f64::NAN, false), None);
    }
}
