//! Cell normalization
//!
//! Every function here is total: malformed input degrades to `None` (or a
//! default) instead of failing, so callers never guard individual cell reads.

use std::fmt;

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Base date a spreadsheet serial number is counted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Epoch {
    /// 1900 date system (serial 0 = 1899-12-30)
    #[default]
    Windows,
    /// 1904 date system (serial 0 = 1904-01-01)
    Mac,
}

impl Epoch {
    fn base_date(self) -> NaiveDate {
        let base = match self {
            Epoch::Windows => NaiveDate::from_ymd_opt(1899, 12, 30),
            Epoch::Mac => NaiveDate::from_ymd_opt(1904, 1, 1),
        };
        base.unwrap_or_default()
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epoch::Windows => write!(f, "windows"),
            Epoch::Mac => write!(f, "mac"),
        }
    }
}

/// True for empty cells and strings that are blank after trimming.
/// Everything else, `0` included, counts as content.
pub fn is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Plain text rendering of a cell, `None` for empty cells
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(value) if value.time() == NaiveTime::MIN => value.date().to_string(),
            Some(value) => value.to_string(),
            None => format_float(dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

/// Trimmed text of a non-empty cell. Stored text is only ever trimmed,
/// never case-folded.
pub fn trimmed_text(cell: &Data) -> Option<String> {
    if is_empty(cell) {
        return None;
    }
    cell_text(cell).map(|s| s.trim().to_string())
}

fn format_float(value: f64) -> String {
    // Whole numbers render without the trailing ".0"
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Normalize a cell for header matching
pub fn normalize_text(cell: &Data) -> String {
    cell_text(cell).map(|s| normalize_str(&s)).unwrap_or_default()
}

/// Lowercase, strip diacritics and collapse whitespace.
///
/// `"  Número   Act "` becomes `"numero act"`.
pub fn normalize_str(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Integer coercion: whole numbers, truncated floats, booleans and integer
/// strings. Anything else is `None`.
pub fn parse_integer(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Data::Bool(b) => Some(i64::from(*b)),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Sum an hours cell and a minutes cell into `HH:MM:SS`.
///
/// Invalid or missing inputs count as zero and minute overflow carries into
/// hours, so `(1, 75)` and `(2, 15)` both give `"02:15:00"`.
pub fn parse_duration(hours: &Data, minutes: &Data) -> String {
    let hours = parse_integer(hours).unwrap_or(0);
    let minutes = parse_integer(minutes).unwrap_or(0);
    let total = hours.saturating_mul(60).saturating_add(minutes);
    format!("{:02}:{:02}:00", total.div_euclid(60), total.rem_euclid(60))
}

/// Extract the activity number from a composite code such as `"1234-007.890"`.
pub fn parse_activity_number(cell: &Data) -> Option<i64> {
    cell_text(cell).and_then(|s| activity_number_from_str(&s))
}

/// Keeps the part after the last hyphen, drops every non-digit and parses
/// what is left: `"1234-007.890"` gives `7890`.
pub fn activity_number_from_str(text: &str) -> Option<i64> {
    let text = text.trim();
    let right = match text.rsplit_once('-') {
        Some((_, right)) => right.trim(),
        None => text,
    };
    let digits: String = right.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a calendar date from a native date cell, a serial number or a
/// string in `D/M/Y`, `Y-M-D` or `M/D/Y` form.
pub fn parse_date(cell: &Data, epoch: Epoch) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(|d| d.date()),
        Data::Float(f) => serial_to_datetime(*f, epoch).map(|d| d.date()),
        Data::Int(i) => serial_to_datetime(*i as f64, epoch).map(|d| d.date()),
        Data::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Like [`parse_date`] but keeps the time of day. Strings are tried as
/// `Y-M-D H:M:S`, `D/M/Y H:M` and `D/M/Y`.
pub fn parse_datetime(cell: &Data, epoch: Epoch) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => dt.as_datetime(),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        Data::Float(f) => serial_to_datetime(*f, epoch),
        Data::Int(i) => serial_to_datetime(*i as f64, epoch),
        Data::String(s) => parse_datetime_str(s),
        _ => None,
    }
}

pub fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ["%d/%m/%Y", "%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

pub fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%d/%m/%Y")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    text.parse::<NaiveDateTime>().ok().or_else(|| {
        text.parse::<NaiveDate>()
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    })
}

/// Convert a spreadsheet serial number to a datetime.
///
/// Values in `[0, 1)` are a bare time of day and have no date, so they give
/// `None`. Under the 1900 system serials below 60 are shifted by a day to
/// account for the phantom 1900-02-29.
pub fn serial_to_datetime(serial: f64, epoch: Epoch) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let mut day = serial.floor();
    let millis = ((serial - day) * MILLIS_PER_DAY).round() as i64;
    if (0.0..1.0).contains(&serial) && millis < MILLIS_PER_DAY as i64 {
        return None;
    }
    if epoch == Epoch::Windows && serial > 0.0 && serial < 60.0 {
        day += 1.0;
    }
    let days = Duration::try_days(day as i64)?;
    epoch
        .base_date()
        .and_time(NaiveTime::MIN)
        .checked_add_signed(days)?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Serial number of a datetime under the 1900 date system, the inverse of
/// [`serial_to_datetime`].
pub fn datetime_to_serial(value: NaiveDateTime) -> f64 {
    let base = Epoch::Windows.base_date().and_time(NaiveTime::MIN);
    let mut serial = (value - base).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let phantom_leap_day = NaiveDate::from_ymd_opt(1900, 3, 1);
    if serial > 1.0 && phantom_leap_day.is_some_and(|leap| value.date() < leap) {
        serial -= 1.0;
    }
    serial
}
