//! Number-like cell text to exact decimals
//!
//! Lenient by design of the tool: percent signs, currency symbols and group
//! separators are dropped before parsing, so plenty of things that are not
//! really numbers can still come out as one.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;

/// The text could not be read as a number; callers keep it as text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0} is not numeric")]
pub struct NotNumeric(pub String);

/// Largest exponent (either sign) kept as a number
///
/// Written out in plain notation, `1e999999999` would be a gigabyte of
/// zeros; such cells stay text.
pub const MAX_EXPONENT: i64 = 4096;

/// Locale symbols used when reading number-like strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    /// Groups digits, e.g. the `,` in `1,000.00`
    pub group_symbol: String,
    /// Separates integer from fraction, e.g. the `.` in `1,000.00`
    pub decimal_symbol: String,
    /// Removed from either end before parsing
    pub currency_symbols: Vec<String>,
}

pub const DEFAULT_CURRENCY_SYMBOLS: [&str; 4] = ["$", "¥", "£", "€"];

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            group_symbol: ",".to_string(),
            decimal_symbol: ".".to_string(),
            currency_symbols: DEFAULT_CURRENCY_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NumberFormat {
    pub fn coerce(&self, text: &str) -> Result<BigDecimal, NotNumeric> {
        coerce(
            text,
            &self.group_symbol,
            &self.decimal_symbol,
            &self.currency_symbols,
        )
    }
}

/// Convert a number-like string to a decimal
///
/// Steps, in order: strip `%` from both ends (the value is not scaled),
/// take a leading `-` as the sign, strip each currency symbol once from
/// each end, drop every group symbol, turn the decimal symbol into `.`,
/// then parse.
pub fn coerce<S: AsRef<str>>(
    text: &str,
    group_symbol: &str,
    decimal_symbol: &str,
    currency_symbols: &[S],
) -> Result<BigDecimal, NotNumeric> {
    let mut number = text.trim_matches('%');

    let negative = match number.strip_prefix('-') {
        Some(rest) => {
            number = rest;
            true
        }
        None => false,
    };

    // At most once per end and per symbol: "$$5" is not numeric, and a
    // multi-character symbol is matched as a whole, not as a set of chars
    for symbol in currency_symbols {
        let symbol = symbol.as_ref();
        if symbol.is_empty() {
            continue;
        }
        number = number.strip_prefix(symbol).unwrap_or(number);
        number = number.strip_suffix(symbol).unwrap_or(number);
    }

    let mut number = number.to_string();
    if !group_symbol.is_empty() {
        number = number.replace(group_symbol, "");
    }
    if !decimal_symbol.is_empty() && decimal_symbol != "." {
        number = number.replace(decimal_symbol, ".");
    }

    let value = parse_decimal(number.trim()).ok_or_else(|| NotNumeric(text.to_string()))?;
    Ok(if negative { -value } else { value })
}

fn parse_decimal(number: &str) -> Option<BigDecimal> {
    // "." or "e" alone are not numbers
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = BigDecimal::from_str(number).ok()?;
    let (_, scale) = value.as_bigint_and_exponent();
    if scale.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
        return None;
    }
    Some(value)
}
