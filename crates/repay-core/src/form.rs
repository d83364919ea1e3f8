//! State of the calculator page: three raw fields, which one has focus, and
//! a memoized result.
//!
//! Typed text is parsed leniently and never clamped from above; slider input
//! is clamped to the slider's range and snapped to its step. The effective
//! clamping for computation happens in [`LoanTerms::from_input`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amortization::{Amortization, AmortizationCache, LoanInput, LoanTerms};
use crate::error::RepayError;
use crate::formatting::FormatPolicy;
use crate::normalizer::{format_number_with, parse_number};

/// One of the three input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    Rate,
    Months,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Amount => "amount",
            Field::Rate => "rate",
            Field::Months => "months",
        };
        f.write_str(name)
    }
}

impl FromStr for Field {
    type Err = RepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amount" | "principal" => Ok(Field::Amount),
            "rate" | "annual_rate" => Ok(Field::Rate),
            "months" | "term" => Ok(Field::Months),
            other => Err(RepayError::InvalidInput {
                field: "field".into(),
                reason: format!("Unknown field '{other}' (expected amount, rate or months)"),
            }),
        }
    }
}

/// Inclusive range with a step, as on an HTML range or number input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

impl Bounds {
    /// Clamp into `[min, max]` and snap to the nearest `min + k × step`.
    pub fn snap(&self, value: Decimal) -> Decimal {
        let clamped = value.max(self.min).min(self.max);
        if self.step <= Decimal::ZERO {
            return clamped;
        }
        // A step too fine for the range leaves the value unsnapped.
        clamped
            .checked_sub(self.min)
            .and_then(|offset| offset.checked_div(self.step))
            .map(|steps| steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|steps| steps.checked_mul(self.step))
            .and_then(|offset| self.min.checked_add(offset))
            .map_or(clamped, |snapped| snapped.min(self.max))
    }
}

/// Slider ranges for each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderBounds {
    pub amount: Bounds,
    pub rate: Bounds,
    pub months: Bounds,
}

impl SliderBounds {
    pub fn for_field(&self, field: Field) -> &Bounds {
        match field {
            Field::Amount => &self.amount,
            Field::Rate => &self.rate,
            Field::Months => &self.months,
        }
    }
}

impl Default for SliderBounds {
    fn default() -> Self {
        Self {
            amount: Bounds {
                min: dec!(1000000),
                max: dec!(200000000),
                step: dec!(500000),
            },
            rate: Bounds {
                min: dec!(0),
                max: dec!(12),
                step: dec!(0.1),
            },
            months: Bounds {
                min: dec!(12),
                max: dec!(360),
                step: dec!(6),
            },
        }
    }
}

/// The three live inputs of the calculator page.
#[derive(Debug, Clone)]
pub struct LoanForm {
    input: LoanInput,
    focused: Option<Field>,
    sliders: SliderBounds,
    policy: FormatPolicy,
    cache: AmortizationCache,
}

impl Default for LoanForm {
    fn default() -> Self {
        Self::new(
            LoanInput::default(),
            SliderBounds::default(),
            FormatPolicy::default(),
        )
    }
}

impl LoanForm {
    pub fn new(input: LoanInput, sliders: SliderBounds, policy: FormatPolicy) -> Self {
        Self {
            input,
            focused: None,
            sliders,
            policy,
            cache: AmortizationCache::new(),
        }
    }

    pub fn input(&self) -> &LoanInput {
        &self.input
    }

    pub fn policy(&self) -> &FormatPolicy {
        &self.policy
    }

    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub fn value(&self, field: Field) -> Decimal {
        match field {
            Field::Amount => self.input.amount,
            Field::Rate => self.input.annual_rate,
            Field::Months => self.input.months,
        }
    }

    fn set_value(&mut self, field: Field, value: Decimal) {
        match field {
            Field::Amount => self.input.amount = value,
            Field::Rate => self.input.annual_rate = value,
            Field::Months => self.input.months = value,
        }
    }

    /// Free-text entry into a field; unparseable text becomes zero.
    pub fn set_text(&mut self, field: Field, text: &str) -> Decimal {
        let value = parse_number(text);
        self.set_value(field, value);
        value
    }

    /// Slider movement; the value lands on the slider's grid.
    pub fn set_slider(&mut self, field: Field, value: Decimal) -> Decimal {
        let snapped = self.sliders.for_field(field).snap(value);
        self.set_value(field, snapped);
        snapped
    }

    pub fn focus(&mut self, field: Field) {
        self.focused = Some(field);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Text shown in a field.
    ///
    /// The amount is grouped (`42,000,000`) unless it is being edited, in
    /// which case it shows bare digits so typing isn't disturbed.
    pub fn display_text(&self, field: Field) -> String {
        let value = self.value(field);
        match field {
            Field::Amount if self.focused != Some(Field::Amount) => {
                format_number_with(value, &self.policy)
            }
            _ => value.normalize().to_string(),
        }
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms::from_input(&self.input)
    }

    /// Current result, recomputed only when the effective terms changed.
    pub fn result(&mut self) -> Amortization {
        let terms = self.terms();
        self.cache.get(&terms)
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_page() {
        let mut form = LoanForm::default();
        assert_eq!(form.display_text(Field::Amount), "42,000,000");
        assert_eq!(form.display_text(Field::Rate), "4.1");
        assert_eq!(form.display_text(Field::Months), "48");
        let result = form.result();
        assert!((result.monthly_payment - dec!(950200.89)).abs() < dec!(0.01));
    }

    #[test]
    fn test_focus_shows_raw_digits() {
        let mut form = LoanForm::default();
        form.focus(Field::Amount);
        assert_eq!(form.display_text(Field::Amount), "42000000");
        form.set_text(Field::Amount, "30,000,0");
        assert_eq!(form.display_text(Field::Amount), "300000");
        form.blur();
        assert_eq!(form.display_text(Field::Amount), "300,000");
    }

    #[test]
    fn test_cleared_field_degrades_to_zero() {
        let mut form = LoanForm::default();
        assert_eq!(form.set_text(Field::Amount, ""), Decimal::ZERO);
        assert_eq!(form.result(), Amortization::ZERO);
    }

    #[test]
    fn test_text_entry_has_no_upper_clamp() {
        let mut form = LoanForm::default();
        assert_eq!(form.set_text(Field::Rate, "35"), dec!(35));
        assert_eq!(form.terms().annual_rate, dec!(35));
    }

    #[test]
    fn test_slider_clamps_and_snaps() {
        let mut form = LoanForm::default();
        assert_eq!(form.set_slider(Field::Rate, dec!(15)), dec!(12));
        assert_eq!(form.set_slider(Field::Rate, dec!(3.64)), dec!(3.6));
        assert_eq!(form.set_slider(Field::Months, dec!(40)), dec!(42));
        assert_eq!(form.set_slider(Field::Months, dec!(1)), dec!(12));
        assert_eq!(form.set_slider(Field::Amount, dec!(1200000)), dec!(1000000));
        assert_eq!(form.set_slider(Field::Amount, dec!(999999999)), dec!(200000000));
    }

    #[test]
    fn test_snap_with_tiny_step_keeps_clamped_value() {
        let bounds = Bounds {
            min: dec!(1000000),
            max: dec!(200000000),
            step: dec!(0.0000000000000000000000000001),
        };
        assert_eq!(bounds.snap(dec!(200000000)), dec!(200000000));
        assert_eq!(bounds.snap(dec!(999999999)), dec!(200000000));
        assert_eq!(bounds.snap(dec!(1)), dec!(1000000));
    }

    #[test]
    fn test_slider_from_config_with_tiny_step() {
        let mut sliders = SliderBounds::default();
        sliders.amount.step = dec!(0.0000000000000000000000000001);
        let mut form = LoanForm::new(LoanInput::default(), sliders, FormatPolicy::default());
        assert_eq!(form.set_slider(Field::Amount, dec!(150000000)), dec!(150000000));
    }

    #[test]
    fn test_result_is_memoized() {
        let mut form = LoanForm::default();
        let first = form.result();
        form.set_text(Field::Months, "48.3");
        assert_eq!(form.result(), first);
        assert_eq!(form.cache_stats(), (1, 1));

        form.set_text(Field::Months, "36");
        assert_ne!(form.result(), first);
        assert_eq!(form.cache_stats(), (1, 2));
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("amount".parse::<Field>().unwrap(), Field::Amount);
        assert_eq!("Term".parse::<Field>().unwrap(), Field::Months);
        assert!("fee".parse::<Field>().is_err());
    }
}
