//! Text forms of date/time values
//!
//! DateTimes print as `YYYY-MM-DD hh:mm:ss[.fff]`. Durations print as
//! `[-][d.]hh:mm:ss[.fffffff]`, with the fraction in 100ns ticks.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_TICK: u32 = 100;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?(?:(\d+)\.)?(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,7}))?)?$")
        .expect("duration pattern is valid")
});

/// Format a datetime in the language's canonical form
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a datetime from text
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD hh:mm[:ss[.f]]` and the same with a `T`
/// separator. Surrounding whitespace is ignored.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Format a duration as `[-][d.]hh:mm:ss[.fffffff]`
pub fn format_duration(d: &TimeDelta) -> String {
    let negative = *d < TimeDelta::zero();
    let abs = if negative { -*d } else { *d };

    let total_secs = abs.num_seconds();
    let days = total_secs / SECONDS_PER_DAY;
    let hours = (total_secs % SECONDS_PER_DAY) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let ticks = abs.subsec_nanos().unsigned_abs() / NANOS_PER_TICK;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        let _ = write!(out, "{days}.");
    }
    let _ = write!(out, "{hours:02}:{minutes:02}:{seconds:02}");
    if ticks > 0 {
        let _ = write!(out, ".{ticks:07}");
    }
    out
}

/// Parse a duration from `[-][d.]hh:mm[:ss[.fffffff]]`
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let caps = DURATION_REGEX.captures(text.trim())?;
    let field = |i: usize| -> Option<i64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let days = field(2)?;
    let hours = field(3)?;
    let minutes = field(4)?;
    let seconds = field(5)?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let nanos = match caps.get(6) {
        Some(m) => {
            // right-pad to 7 digits of ticks
            let digits = format!("{:0<7}", m.as_str());
            digits.parse::<i64>().ok()? * i64::from(NANOS_PER_TICK)
        }
        None => 0,
    };

    let total_secs = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours * 3600 + minutes * 60 + seconds)?;
    let span = TimeDelta::try_seconds(total_secs)?.checked_add(&TimeDelta::nanoseconds(nanos))?;

    Some(if caps.get(1).is_some() { -span } else { span })
}
