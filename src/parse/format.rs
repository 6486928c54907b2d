//! Excel number-format handling.
//!
//! Three concerns live here: deciding whether a format code renders date/time
//! values, converting 1900-system serial dates to calendar timestamps, and
//! rendering a serial through a cell's own format code (the path taken when
//! date formatting is disabled and the cell's embedded format wins).

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Monday-first, matching Weekday::num_days_from_monday.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The format code of a built-in number-format id, per the OOXML table.
pub fn builtin_format_code(id: u16) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yyyy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yyyy h:mm",
        37 => "#,##0;(#,##0)",
        38 => "#,##0;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// Check whether a number-format code renders date/time values.
///
/// Date tokens (`y`, `d`) and time tokens (`h`, `s`) decide immediately; `m`
/// is ambiguous between month and minute and only counts when the code also
/// carries a day or year component. Quoted literals, `[..]` sections, and
/// escaped characters are ignored.
pub fn is_date_format(code: &str) -> bool {
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut escaped = false;
    let mut prev = '\0';

    for c in code.chars() {
        if escaped {
            escaped = false;
            prev = c;
            continue;
        }
        match c {
            '\\' if !in_quote && !in_bracket => escaped = true,
            '"' if !in_bracket => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if !in_quote && !in_bracket => match c.to_ascii_lowercase() {
                'y' | 'd' | 'h' | 's' => return true,
                'm' => {
                    let p = prev.to_ascii_lowercase();
                    if p == 'd' || p == 'y' {
                        return true;
                    }
                    let lower = code.to_lowercase();
                    if lower.contains('d') || lower.contains('y') {
                        return true;
                    }
                    // bare minute runs ("mm:ss", "h:mm") resolve on the
                    // h/s token instead
                }
                _ => {}
            },
            _ => {}
        }
        prev = c;
    }

    false
}

// Serial 2958465 is 9999-12-31, the last representable date.
const MAX_SERIAL: f64 = 2_958_466.0;

/// Convert an Excel serial (1900 date system) to a calendar timestamp.
///
/// The 1900 system counts 1900-02-29, a day that never existed (kept for
/// Lotus 1-2-3 compatibility), so serials from 60 up are shifted by one; the
/// phantom serial 60 itself collapses onto 1900-02-28. Returns `None` for
/// non-finite, negative, or out-of-range serials.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.trunc() as u64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    }?;
    let mut date = base.checked_add_days(Days::new(days))?;

    let mut secs = (serial.fract() * 86_400.0).round() as u32;
    if secs >= 86_400 {
        date = date.succ_opt()?;
        secs = 0;
    }
    date.and_hms_opt(secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Render a number for display, dropping the fraction when it is integral.
pub(crate) fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Render a date/time serial through a number-format code.
///
/// Codes that do not carry date/time tokens (including `General`) render the
/// serial as a plain number, matching how spreadsheet readers stringify
/// non-date formats. Returns `None` when the serial is out of range for a
/// date code.
pub fn format_serial(serial: f64, code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code.eq_ignore_ascii_case("general") || !is_date_format(code) {
        return Some(render_number(serial));
    }

    let timestamp = serial_to_datetime(serial)?;
    let parts = resolve_minutes(lex(code));
    let twelve_hour = parts.iter().any(|p| matches!(p, Part::AmPm));

    let mut out = String::with_capacity(code.len());
    for part in parts {
        render_part(&mut out, &part, timestamp, twelve_hour);
    }
    Some(out)
}

enum Tok {
    Lit(String),
    Run { ch: char, len: usize },
    AmPm,
}

enum Part {
    Lit(String),
    Year(usize),
    Month(usize),
    Day(usize),
    Hour(usize),
    Minute(usize),
    Second(usize),
    AmPm,
}

fn lex(code: &str) -> Vec<Tok> {
    let chars: Vec<char> = code.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                i += 1;
                let mut lit = String::new();
                while i < chars.len() && chars[i] != '"' {
                    lit.push(chars[i]);
                    i += 1;
                }
                i += 1;
                toks.push(Tok::Lit(lit));
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
            }
            '\\' => {
                i += 1;
                if i < chars.len() {
                    toks.push(Tok::Lit(chars[i].to_string()));
                    i += 1;
                }
            }
            // width-padding and fill markers take one argument character
            '_' | '*' => i += 2,
            // only the first format section applies
            ';' => break,
            'a' | 'A' => {
                let rest: String = chars[i..].iter().collect::<String>().to_ascii_uppercase();
                if rest.starts_with("AM/PM") {
                    toks.push(Tok::AmPm);
                    i += 5;
                } else if rest.starts_with("A/P") {
                    toks.push(Tok::AmPm);
                    i += 3;
                } else {
                    toks.push(Tok::Lit(c.to_string()));
                    i += 1;
                }
            }
            _ => {
                let lower = c.to_ascii_lowercase();
                if matches!(lower, 'y' | 'm' | 'd' | 'h' | 's') {
                    let mut len = 0;
                    while i < chars.len() && chars[i].to_ascii_lowercase() == lower {
                        len += 1;
                        i += 1;
                    }
                    toks.push(Tok::Run { ch: lower, len });
                } else {
                    toks.push(Tok::Lit(c.to_string()));
                    i += 1;
                }
            }
        }
    }

    toks
}

/// Disambiguate `m` runs: a run next to an hour run (before) or a second run
/// (after) means minutes, otherwise months.
fn resolve_minutes(toks: Vec<Tok>) -> Vec<Part> {
    let runs: Vec<Option<char>> = toks
        .iter()
        .map(|t| match t {
            Tok::Run { ch, .. } => Some(*ch),
            _ => None,
        })
        .collect();

    toks.iter()
        .enumerate()
        .map(|(i, tok)| match tok {
            Tok::Lit(lit) => Part::Lit(lit.clone()),
            Tok::AmPm => Part::AmPm,
            Tok::Run { ch, len } => match ch {
                'y' => Part::Year(*len),
                'd' => Part::Day(*len),
                'h' => Part::Hour(*len),
                's' => Part::Second(*len),
                _ => {
                    let prev = runs[..i].iter().rev().flatten().next();
                    let next = runs[i + 1..].iter().flatten().next();
                    if prev == Some(&'h') || next == Some(&'s') {
                        Part::Minute(*len)
                    } else {
                        Part::Month(*len)
                    }
                }
            },
        })
        .collect()
}

fn render_part(out: &mut String, part: &Part, timestamp: NaiveDateTime, twelve_hour: bool) {
    match part {
        Part::Lit(lit) => out.push_str(lit),
        Part::Year(len) => {
            if *len >= 3 {
                out.push_str(&format!("{:04}", timestamp.year()));
            } else {
                out.push_str(&format!("{:02}", timestamp.year().rem_euclid(100)));
            }
        }
        Part::Month(len) => {
            let month = timestamp.month() as usize;
            match len {
                1 => out.push_str(&month.to_string()),
                2 => out.push_str(&format!("{month:02}")),
                3 => out.push_str(&MONTHS[month - 1][..3]),
                4 => out.push_str(MONTHS[month - 1]),
                _ => out.push_str(&MONTHS[month - 1][..1]),
            }
        }
        Part::Day(len) => {
            let weekday = timestamp.weekday().num_days_from_monday() as usize;
            match len {
                1 => out.push_str(&timestamp.day().to_string()),
                2 => out.push_str(&format!("{:02}", timestamp.day())),
                3 => out.push_str(&WEEKDAYS[weekday][..3]),
                _ => out.push_str(WEEKDAYS[weekday]),
            }
        }
        Part::Hour(len) => {
            let mut hour = timestamp.hour();
            if twelve_hour {
                hour = (hour + 11) % 12 + 1;
            }
            if *len == 1 {
                out.push_str(&hour.to_string());
            } else {
                out.push_str(&format!("{hour:02}"));
            }
        }
        Part::Minute(len) => {
            if *len == 1 {
                out.push_str(&timestamp.minute().to_string());
            } else {
                out.push_str(&format!("{:02}", timestamp.minute()));
            }
        }
        Part::Second(len) => {
            if *len == 1 {
                out.push_str(&timestamp.second().to_string());
            } else {
                out.push_str(&format!("{:02}", timestamp.second()));
            }
        }
        Part::AmPm => out.push_str(if timestamp.hour() < 12 { "AM" } else { "PM" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_format_codes() {
        assert_eq!(builtin_format_code(0), Some("General"));
        assert_eq!(builtin_format_code(14), Some("m/d/yyyy"));
        assert_eq!(builtin_format_code(22), Some("m/d/yyyy h:mm"));
        assert_eq!(builtin_format_code(45), Some("mm:ss"));
        assert_eq!(builtin_format_code(5), None);
        assert_eq!(builtin_format_code(164), None);
    }

    #[test]
    fn test_is_date_format_detection() {
        assert!(is_date_format("yyyy-mm-dd"));
        assert!(is_date_format("d/m/yy"));
        assert!(is_date_format("mmmm\\ d\\,\\ yyyy"));
        assert!(is_date_format("[$-409]mmmm\\ d\\,\\ yyyy;@"));
        assert!(is_date_format("h:mm"));
        assert!(is_date_format("mm:ss"));

        assert!(!is_date_format("General"));
        assert!(!is_date_format("0.00"));
        assert!(!is_date_format("#,##0"));
        assert!(!is_date_format("\"$\"#,##0.00"));
        // date letters inside quotes or brackets do not count
        assert!(!is_date_format("\"today\" 0"));
        assert!(!is_date_format("[Red]0"));
    }

    #[test]
    fn test_serial_to_datetime_known_dates() {
        let ymd = |serial: f64| serial_to_datetime(serial).map(|dt| dt.date().to_string());
        assert_eq!(ymd(1.0), Some("1900-01-01".to_string()));
        assert_eq!(ymd(59.0), Some("1900-02-28".to_string()));
        // the phantom 1900-02-29
        assert_eq!(ymd(60.0), Some("1900-02-28".to_string()));
        assert_eq!(ymd(61.0), Some("1900-03-01".to_string()));
        assert_eq!(ymd(41000.0), Some("2012-04-01".to_string()));
        assert_eq!(ymd(44197.0), Some("2021-01-01".to_string()));
        assert_eq!(ymd(45658.0), Some("2025-01-01".to_string()));
    }

    #[test]
    fn test_serial_to_datetime_time_component() {
        let dt = serial_to_datetime(44197.5).unwrap();
        assert_eq!(dt.to_string(), "2021-01-01 12:00:00");

        let secs = (12 * 3600 + 34 * 60 + 56) as f64;
        let dt = serial_to_datetime(41000.0 + secs / 86_400.0).unwrap();
        assert_eq!(dt.to_string(), "2012-04-01 12:34:56");
    }

    #[test]
    fn test_serial_to_datetime_out_of_range() {
        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(f64::INFINITY).is_none());
        assert!(serial_to_datetime(3_000_000.0).is_none());
    }

    #[test]
    fn test_format_serial_date_codes() {
        assert_eq!(
            format_serial(41000.0, "yyyy-mm-dd"),
            Some("2012-04-01".to_string())
        );
        assert_eq!(
            format_serial(41000.0, "m/d/yyyy"),
            Some("4/1/2012".to_string())
        );
        assert_eq!(
            format_serial(41000.0, "d-mmm-yy"),
            Some("1-Apr-12".to_string())
        );
        assert_eq!(
            format_serial(41000.0, "dddd, d mmmm yyyy"),
            Some("Sunday, 1 April 2012".to_string())
        );
    }

    #[test]
    fn test_format_serial_time_codes() {
        let serial = 41000.0 + (12 * 3600 + 34 * 60 + 56) as f64 / 86_400.0;
        assert_eq!(format_serial(serial, "h:mm:ss"), Some("12:34:56".to_string()));
        assert_eq!(format_serial(serial, "mm:ss"), Some("34:56".to_string()));

        assert_eq!(
            format_serial(41000.75, "h:mm AM/PM"),
            Some("6:00 PM".to_string())
        );
        assert_eq!(
            format_serial(41000.25, "hh:mm AM/PM"),
            Some("06:00 AM".to_string())
        );
    }

    #[test]
    fn test_format_serial_literals_and_sections() {
        assert_eq!(
            format_serial(41000.0, "yyyy\" year\""),
            Some("2012 year".to_string())
        );
        // only the first section applies
        assert_eq!(
            format_serial(41000.0, "yyyy;[Red]0"),
            Some("2012".to_string())
        );
        assert_eq!(
            format_serial(41000.0, "mmmm\\ d"),
            Some("April 1".to_string())
        );
    }

    #[test]
    fn test_format_serial_non_date_codes_render_the_number() {
        assert_eq!(format_serial(41000.0, "General"), Some("41000".to_string()));
        assert_eq!(format_serial(41000.0, "0.00"), Some("41000".to_string()));
        assert_eq!(format_serial(41000.5, "General"), Some("41000.5".to_string()));
    }

    #[test]
    fn test_format_serial_out_of_range() {
        assert!(format_serial(-5.0, "yyyy-mm-dd").is_none());
    }
}
