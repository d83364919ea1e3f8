use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RepayError;

/// Display locales with a built-in number/currency layout.
///
/// The currency is always KRW; the locale only decides separators and where
/// the won sign goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    KoKr,
    EnUs,
    DeDe,
}

impl Locale {
    pub fn as_code(&self) -> &'static str {
        match self {
            Locale::KoKr => "ko-KR",
            Locale::EnUs => "en-US",
            Locale::DeDe => "de-DE",
        }
    }

    /// Formatting preset for this locale.
    pub fn policy(&self) -> FormatPolicy {
        match self {
            Locale::KoKr | Locale::EnUs => FormatPolicy {
                grouping_separator: ",".into(),
                decimal_separator: ".".into(),
                fraction_digits: 0,
                currency_symbol: "₩".into(),
                symbol_position: SymbolPosition::Prefix,
            },
            Locale::DeDe => FormatPolicy {
                grouping_separator: ".".into(),
                decimal_separator: ",".into(),
                fraction_digits: 0,
                currency_symbol: "₩".into(),
                symbol_position: SymbolPosition::Suffix,
            },
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for Locale {
    type Err = RepayError;

    /// Accepts `ko-KR`, `ko_KR`, `ko`, `ko_KR.UTF-8` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split('.').next().unwrap_or_default();
        let normalized = base.trim().replace('_', "-").to_lowercase();
        match normalized.as_str() {
            "ko-kr" | "ko" => Ok(Locale::KoKr),
            "en-us" | "en" => Ok(Locale::EnUs),
            "de-de" | "de" => Ok(Locale::DeDe),
            _ => Err(RepayError::InvalidInput {
                field: "locale".into(),
                reason: format!("Unsupported locale '{s}' (expected ko-KR, en-US or de-DE)"),
            }),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = RepayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.as_code().to_string()
    }
}

/// Where the currency symbol is placed relative to the digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// `₩1,000`
    Prefix,
    /// `1.000 ₩` (separated by a no-break space)
    Suffix,
}

/// Injected number/currency formatting policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPolicy {
    pub grouping_separator: String,
    pub decimal_separator: String,
    /// Digits after the decimal separator; amounts are rounded half away from zero.
    pub fraction_digits: u32,
    pub currency_symbol: String,
    pub symbol_position: SymbolPosition,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Locale::default().policy()
    }
}

const NO_BREAK_SPACE: char = '\u{a0}';

/// Render `value` with thousands grouping and no currency symbol.
pub fn format_grouped(value: Decimal, policy: &FormatPolicy) -> String {
    let (negative, body) = grouped_parts(value, policy);
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Render `value` as a localized KRW amount, e.g. `₩885,720` or `-885.720 ₩`.
pub fn format_currency(value: Decimal, policy: &FormatPolicy) -> String {
    let (negative, body) = grouped_parts(value, policy);
    let sign = if negative { "-" } else { "" };
    match policy.symbol_position {
        SymbolPosition::Prefix => format!("{sign}{}{body}", policy.currency_symbol),
        SymbolPosition::Suffix => {
            format!("{sign}{body}{NO_BREAK_SPACE}{}", policy.currency_symbol)
        }
    }
}

/// Round, split off the sign and group the integer digits.
fn grouped_parts(value: Decimal, policy: &FormatPolicy) -> (bool, String) {
    let mut rounded = value.round_dp_with_strategy(
        policy.fraction_digits,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);

    // Padded by hand: near Decimal::MAX there is no room to rescale.
    let digits = rounded.to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut body = group_digits(int_part, &policy.grouping_separator);
    let width = policy.fraction_digits as usize;
    if width > 0 {
        body.push_str(&policy.decimal_separator);
        body.push_str(&format!("{frac_part:0<width$}"));
    }
    (negative, body)
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ko_kr_currency() {
        let policy = Locale::KoKr.policy();
        assert_eq!(format_currency(dec!(885719.55), &policy), "₩885,720");
        assert_eq!(format_currency(dec!(42000000), &policy), "₩42,000,000");
        assert_eq!(format_currency(dec!(0), &policy), "₩0");
    }

    #[test]
    fn test_de_de_currency_suffix() {
        let policy = Locale::DeDe.policy();
        assert_eq!(
            format_currency(dec!(1885903.81), &policy),
            "1.885.904\u{a0}₩"
        );
    }

    #[test]
    fn test_negative_sign_precedes_symbol() {
        let policy = Locale::KoKr.policy();
        assert_eq!(format_currency(dec!(-1000), &policy), "-₩1,000");
        // Rounds to zero: no sign
        assert_eq!(format_currency(dec!(-0.4), &policy), "₩0");
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        let policy = FormatPolicy::default();
        assert_eq!(format_grouped(dec!(2.5), &policy), "3");
        assert_eq!(format_grouped(dec!(-2.5), &policy), "-3");
        assert_eq!(format_grouped(dec!(2.49), &policy), "2");
    }

    #[test]
    fn test_fraction_digits() {
        let policy = FormatPolicy {
            fraction_digits: 2,
            ..Locale::DeDe.policy()
        };
        assert_eq!(format_grouped(dec!(1234567.891), &policy), "1.234.567,89");
        assert_eq!(format_grouped(dec!(12), &policy), "12,00");
    }

    #[test]
    fn test_fraction_digits_kept_near_decimal_max() {
        let policy = FormatPolicy {
            fraction_digits: 2,
            ..Locale::EnUs.policy()
        };
        let formatted = format_grouped(Decimal::MAX, &policy);
        assert_eq!(formatted, "79,228,162,514,264,337,593,543,950,335.00");
    }

    #[test]
    fn test_group_digits_boundaries() {
        assert_eq!(group_digits("1", ","), "1");
        assert_eq!(group_digits("123", ","), "123");
        assert_eq!(group_digits("1234", ","), "1,234");
        assert_eq!(group_digits("123456", ","), "123,456");
        assert_eq!(group_digits("1234567", ","), "1,234,567");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("ko-KR".parse::<Locale>().unwrap(), Locale::KoKr);
        assert_eq!("ko_KR.UTF-8".parse::<Locale>().unwrap(), Locale::KoKr);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("DE-de".parse::<Locale>().unwrap(), Locale::DeDe);
        assert!("fr-FR".parse::<Locale>().is_err());
    }
}
