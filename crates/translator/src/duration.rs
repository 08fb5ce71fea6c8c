// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Go-style duration strings
//!
//! CEL `duration("1h30m")` values accumulate into nanoseconds and render
//! as a SQL interval in the coarsest unit that divides the total exactly,
//! so `duration("90s")` becomes `90 SECOND` while `duration("60s")`
//! becomes `1 MINUTE`.

use crate::error::{TranslateError, TranslateResult};

const NANOS_PER_HOUR: i64 = 3_600_000_000_000;
const NANOS_PER_MINUTE: i64 = 60_000_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// SQL interval units, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl DurationUnit {
    pub fn as_sql(self) -> &'static str {
        match self {
            DurationUnit::Hour => "HOUR",
            DurationUnit::Minute => "MINUTE",
            DurationUnit::Second => "SECOND",
            DurationUnit::Millisecond => "MILLISECOND",
            DurationUnit::Microsecond => "MICROSECOND",
            DurationUnit::Nanosecond => "NANOSECOND",
        }
    }
}

/// Parse a Go-style duration string (`"1h"`, `"1h30m"`, `"500ms"`, ...)
/// into total nanoseconds.
pub fn parse_duration(input: &str) -> TranslateResult<i64> {
    let invalid = || TranslateError::TypeMismatch {
        detail: format!("cannot parse duration '{input}'"),
    };

    let mut total: i64 = 0;
    let mut chars = input.chars().peekable();
    let mut any = false;

    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            return Err(invalid());
        }
        let mut value: i64 = 0;
        while let Some(&d) = chars.peek() {
            if let Some(digit) = d.to_digit(10) {
                chars.next();
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit as i64))
                    .ok_or_else(invalid)?;
            } else {
                break;
            }
        }
        let mut unit = String::new();
        while let Some(&u) = chars.peek() {
            if u.is_ascii_alphabetic() || u == 'µ' {
                // 'm' could start either "m" or "ms"; the next digit ends
                // the unit token either way.
                chars.next();
                unit.push(u);
            } else {
                break;
            }
        }
        let nanos_per_unit = match unit.as_str() {
            "h" => NANOS_PER_HOUR,
            "m" => NANOS_PER_MINUTE,
            "s" => NANOS_PER_SECOND,
            "ms" => NANOS_PER_MILLI,
            "us" | "µs" => NANOS_PER_MICRO,
            "ns" => 1,
            _ => return Err(invalid()),
        };
        total = value
            .checked_mul(nanos_per_unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(invalid)?;
        any = true;
    }

    if !any || total == 0 {
        return Err(invalid());
    }
    Ok(total)
}

/// Reduce a nanosecond total to the coarsest exact unit.
pub fn coarsest_unit(nanos: i64) -> (i64, DurationUnit) {
    if nanos % NANOS_PER_HOUR == 0 {
        (nanos / NANOS_PER_HOUR, DurationUnit::Hour)
    } else if nanos % NANOS_PER_MINUTE == 0 {
        (nanos / NANOS_PER_MINUTE, DurationUnit::Minute)
    } else if nanos % NANOS_PER_SECOND == 0 {
        (nanos / NANOS_PER_SECOND, DurationUnit::Second)
    } else if nanos % NANOS_PER_MILLI == 0 {
        (nanos / NANOS_PER_MILLI, DurationUnit::Millisecond)
    } else if nanos % NANOS_PER_MICRO == 0 {
        (nanos / NANOS_PER_MICRO, DurationUnit::Microsecond)
    } else {
        (nanos, DurationUnit::Nanosecond)
    }
}
