//! Date/time and duration members

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use formula_value::temporal::format_datetime;
use formula_value::{Decimal, Value};
use rust_decimal::prelude::ToPrimitive;

use super::{ArgumentError, check_arg_count, check_arg_range, get_number_arg, get_text_arg};
use crate::host::HostResult;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

fn datetime(target: &Value) -> NaiveDateTime {
    target.as_datetime().unwrap_or_default()
}

fn duration(target: &Value) -> TimeDelta {
    target.as_duration().unwrap_or_default()
}

// ==================== DateTime properties ====================

/// Calendar year
pub fn year(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).year()))
}

/// Month, 1 to 12
pub fn month(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).month()))
}

/// Day of the month, 1 to 31
pub fn day(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).day()))
}

/// Hour, 0 to 23
pub fn hour(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).hour()))
}

/// Minute, 0 to 59
pub fn minute(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).minute()))
}

/// Second, 0 to 59
pub fn second(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).second()))
}

/// Day of the week, 0 = Sunday
pub fn day_of_week(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).weekday().num_days_from_sunday()))
}

/// Day of the year, 1 to 366
pub fn day_of_year(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(datetime(target).ordinal()))
}

/// The same day at midnight
pub fn date(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::datetime(datetime(target).date().and_time(NaiveTime::MIN)))
}

// ==================== DateTime methods ====================

fn add_scaled(member: &'static str, target: &Value, args: &[Value], unit_millis: i64) -> HostResult<Value> {
    check_arg_count(member, args, 1)?;
    let amount = get_number_arg(member, args, 0)?;

    let out_of_range = || ArgumentError::new(member, format!("adding {amount} is out of range"));

    let millis = amount
        .checked_mul(Decimal::from(unit_millis))
        .map(|ms| ms.round())
        .and_then(|ms| ms.to_i64())
        .ok_or_else(out_of_range)?;

    let result = TimeDelta::try_milliseconds(millis)
        .and_then(|delta| datetime(target).checked_add_signed(delta))
        .ok_or_else(out_of_range)?;

    Ok(Value::datetime(result))
}

/// Add a (possibly fractional) number of days
pub fn add_days(target: &Value, args: &[Value]) -> HostResult<Value> {
    add_scaled("AddDays", target, args, MILLIS_PER_DAY)
}

/// Add a (possibly fractional) number of hours
pub fn add_hours(target: &Value, args: &[Value]) -> HostResult<Value> {
    add_scaled("AddHours", target, args, MILLIS_PER_HOUR)
}

/// Add a (possibly fractional) number of minutes
pub fn add_minutes(target: &Value, args: &[Value]) -> HostResult<Value> {
    add_scaled("AddMinutes", target, args, MILLIS_PER_MINUTE)
}

/// Add a (possibly fractional) number of seconds
pub fn add_seconds(target: &Value, args: &[Value]) -> HostResult<Value> {
    add_scaled("AddSeconds", target, args, MILLIS_PER_SECOND)
}

/// `ToString()` in canonical form or `ToString(format)` with strftime syntax
pub fn format(target: &Value, args: &[Value]) -> HostResult<Value> {
    check_arg_range("ToString", args, 0, 1)?;
    let dt = datetime(target);

    if args.is_empty() {
        return Ok(Value::text(format_datetime(&dt)));
    }

    let pattern = get_text_arg("ToString", args, 0)?;
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(ArgumentError::new("ToString", format!("invalid format '{pattern}'")).into());
    }

    let mut out = String::new();
    write!(out, "{}", dt.format_with_items(items.into_iter()))
        .map_err(|_| ArgumentError::new("ToString", format!("cannot format with '{pattern}'")))?;
    Ok(Value::text(out))
}

// ==================== Duration properties ====================

/// Whole days
pub fn duration_days(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(duration(target).num_days()))
}

/// Hours component, -23 to 23
pub fn duration_hours(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(duration(target).num_hours() % 24))
}

/// Minutes component, -59 to 59
pub fn duration_minutes(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(duration(target).num_minutes() % 60))
}

/// Seconds component, -59 to 59
pub fn duration_seconds(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(Value::from(duration(target).num_seconds() % 60))
}

/// Exact length in seconds, including the fraction
fn total_in_seconds(d: TimeDelta) -> Decimal {
    Decimal::from(d.num_seconds()) + Decimal::new(i64::from(d.subsec_nanos()), 9)
}

fn total_in(target: &Value, seconds_per_unit: i64) -> Value {
    let seconds = total_in_seconds(duration(target));
    Value::number((seconds / Decimal::from(seconds_per_unit)).normalize())
}

/// Length in days
pub fn total_days(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(total_in(target, 86_400))
}

/// Length in hours
pub fn total_hours(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(total_in(target, 3_600))
}

/// Length in minutes
pub fn total_minutes(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(total_in(target, 60))
}

/// Length in seconds
pub fn total_seconds(target: &Value, _args: &[Value]) -> HostResult<Value> {
    Ok(total_in(target, 1))
}

/// Length in milliseconds
pub fn total_milliseconds(target: &Value, _args: &[Value]) -> HostResult<Value> {
    let seconds = total_in_seconds(duration(target));
    Ok(Value::number((seconds * Decimal::from(MILLIS_PER_SECOND)).normalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::str::FromStr;

    fn sample() -> Value {
        // a Friday
        Value::datetime(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(13, 45, 30)
                .unwrap(),
        )
    }

    fn dec(s: &str) -> Value {
        Value::number(Decimal::from_str(s).unwrap())
    }

    #[rstest]
    #[case(year, 2024)]
    #[case(month, 3)]
    #[case(day, 1)]
    #[case(hour, 13)]
    #[case(minute, 45)]
    #[case(second, 30)]
    #[case(day_of_week, 5)]
    #[case(day_of_year, 61)]
    fn test_components(#[case] member: crate::builtins::BuiltinMember, #[case] expected: i64) {
        assert_eq!(member(&sample(), &[]).unwrap(), Value::integer(expected));
    }

    #[test]
    fn test_date_and_add() {
        assert_eq!(date(&sample(), &[]).unwrap().to_string(), "2024-03-01 00:00:00");
        assert_eq!(
            add_days(&sample(), &[Value::integer(1)]).unwrap().to_string(),
            "2024-03-02 13:45:30"
        );
        assert_eq!(
            add_hours(&sample(), &[dec("-1.5")]).unwrap().to_string(),
            "2024-03-01 12:15:30"
        );
        assert_eq!(
            add_seconds(&sample(), &[Value::integer(30)]).unwrap().to_string(),
            "2024-03-01 13:46:00"
        );
        assert!(add_days(&sample(), &[dec("100000000000000000000")]).is_err());
        assert!(add_minutes(&sample(), &[Value::text("1")]).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format(&sample(), &[]).unwrap(), Value::text("2024-03-01 13:45:30"));
        assert_eq!(
            format(&sample(), &[Value::text("%d/%m/%Y")]).unwrap(),
            Value::text("01/03/2024")
        );
        assert!(format(&sample(), &[Value::text("%Q")]).is_err());
    }

    #[test]
    fn test_duration_members() {
        let d = Value::duration(TimeDelta::days(1) + TimeDelta::hours(2) + TimeDelta::minutes(30));
        assert_eq!(duration_days(&d, &[]).unwrap(), Value::integer(1));
        assert_eq!(duration_hours(&d, &[]).unwrap(), Value::integer(2));
        assert_eq!(duration_minutes(&d, &[]).unwrap(), Value::integer(30));
        assert_eq!(duration_seconds(&d, &[]).unwrap(), Value::integer(0));
        assert_eq!(total_hours(&d, &[]).unwrap(), dec("26.5"));
        assert_eq!(total_minutes(&d, &[]).unwrap(), Value::integer(1590));

        let ms = Value::duration(TimeDelta::milliseconds(1500));
        assert_eq!(total_seconds(&ms, &[]).unwrap(), dec("1.5"));
        assert_eq!(total_milliseconds(&ms, &[]).unwrap(), Value::integer(1500));

        let negative = Value::duration(-TimeDelta::minutes(90));
        assert_eq!(duration_hours(&negative, &[]).unwrap(), Value::integer(-1));
        assert_eq!(total_hours(&negative, &[]).unwrap(), dec("-1.5"));
    }
}
