//! Human-readable duration parsing for blockable steps.
//!
//! Recipes describe waits the way cooks write them: `"15分钟"`, `"40 minutes"`,
//! `"1h30m"`, `"1.5 hours"`. A bare number means minutes. Anything that cannot
//! be read fails with a [`DurationError`] instead of defaulting to zero.
//!
//! # Example
//!
//! ```rust
//! use cookflow::duration::parse_seconds;
//!
//! assert_eq!(parse_seconds("15分钟").unwrap(), 900);
//! assert_eq!(parse_seconds("1h 30m").unwrap(), 5400);
//! assert_eq!(parse_seconds("2").unwrap(), 120);
//! assert!(parse_seconds("a while").is_err());
//! ```

pub mod error;

pub use error::DurationError;

use std::time::Duration;

const SECOND: u64 = 1;
const MINUTE: u64 = 60;
const HOUR: u64 = 3600;

/// Parse a duration expression into whole seconds.
pub fn parse_seconds(expr: &str) -> Result<u64, DurationError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    // A bare number is a count of minutes.
    if trimmed.chars().all(is_number_char) {
        let minutes = parse_number(trimmed)?;
        return round_seconds(minutes * MINUTE as f64, trimmed);
    }

    let mut total = 0.0;
    for (number, unit) in components(trimmed)? {
        total += number * unit_seconds(unit)? as f64;
    }
    round_seconds(total, trimmed)
}

/// Parse a duration expression into a [`Duration`].
pub fn parse_duration(expr: &str) -> Result<Duration, DurationError> {
    parse_seconds(expr).map(Duration::from_secs)
}

fn components(expr: &str) -> Result<Vec<(f64, &str)>, DurationError> {
    let mut parsed = Vec::new();
    let mut rest = expr;

    loop {
        rest = rest.trim_start_matches(is_separator);
        if rest.is_empty() {
            break;
        }

        let number_len = rest
            .find(|c: char| !is_number_char(c))
            .unwrap_or(rest.len());
        if number_len == 0 {
            let fragment = rest.chars().take_while(|c| !is_separator(*c)).collect();
            return Err(DurationError::MissingNumber { fragment });
        }
        let number_text = &rest[..number_len];
        let number = parse_number(number_text)?;

        rest = rest[number_len..].trim_start();
        let unit_len = rest
            .find(|c: char| is_number_char(c) || is_separator(c))
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                number: number_text.to_string(),
            });
        }

        parsed.push((number, &rest[..unit_len]));
        rest = &rest[unit_len..];
    }

    Ok(parsed)
}

fn unit_seconds(unit: &str) -> Result<u64, DurationError> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" | "秒" | "秒钟" => SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" | "分" | "分钟" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" | "时" | "小时" | "个小时" | "钟头"
        | "个钟头" => HOUR,
        _ => {
            return Err(DurationError::UnknownUnit {
                unit: unit.to_string(),
            })
        }
    };
    Ok(seconds)
}

fn parse_number(text: &str) -> Result<f64, DurationError> {
    let invalid = || DurationError::InvalidNumber {
        text: text.to_string(),
    };
    let dots = text.chars().filter(|c| *c == '.').count();
    if dots > 1 || !text.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse::<f64>().map_err(|_| invalid())
}

fn round_seconds(total: f64, expr: &str) -> Result<u64, DurationError> {
    if !total.is_finite() || total >= u64::MAX as f64 {
        return Err(DurationError::Overflow);
    }
    let rounded = total.round();
    if rounded < 1.0 {
        return Err(DurationError::Zero {
            expr: expr.to_string(),
        });
    }
    Ok(rounded as u64)
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '，' | '、' | '+')
}
