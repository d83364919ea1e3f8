use rust_decimal::Decimal;
use std::str::FromStr;

use crate::formatting::{format_grouped, FormatPolicy};

/// Lenient text-to-number conversion for live-updating input fields.
///
/// Every character other than an ASCII digit or `.` is dropped, then the
/// remainder is parsed. Anything that still isn't a number (empty text, a
/// lone `.`, two decimal points, more digits than a decimal can hold) yields
/// zero instead of an error.
///
/// ```
/// use repay_core::normalizer::parse_number;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_number("₩42,000,000"), dec!(42000000));
/// assert_eq!(parse_number("4.1%"), dec!(4.1));
/// assert_eq!(parse_number("abc"), dec!(0));
/// ```
pub fn parse_number(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    strict_parse(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse an already-stripped string. `"5."` and `".5"` are numbers; `"."` is not.
fn strict_parse(cleaned: &str) -> Option<Decimal> {
    let (int_part, frac_part) = match cleaned.split_once('.') {
        Some((_, frac)) if frac.contains('.') => return None,
        Some((int, frac)) => (int, frac),
        None => (cleaned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    Decimal::from_str(&normalized).ok()
}

/// Integer-rounded, comma-grouped display text for a field that isn't focused.
pub fn format_number(value: Decimal) -> String {
    format_number_with(value, &FormatPolicy::default())
}

/// [`format_number`] with the separators of an injected policy.
///
/// Fraction digits in the policy are ignored; field text is always whole.
pub fn format_number_with(value: Decimal, policy: &FormatPolicy) -> String {
    let whole = FormatPolicy {
        fraction_digits: 0,
        ..policy.clone()
    };
    format_grouped(value, &whole)
}
