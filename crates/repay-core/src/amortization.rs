use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::formatting::{format_currency, FormatPolicy};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Upper bound of the rate field on the page. Not enforced, only warned about.
pub const RATE_INPUT_MAX: Percent = dec!(20);

/// Raw loan terms as entered: possibly negative, fractional or empty (zero).
///
/// Missing fields take the page's initial values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanInput {
    /// Principal in won
    pub amount: Money,
    /// Nominal annual interest rate in percent (4.1 = 4.1%)
    pub annual_rate: Percent,
    /// Repayment term in months
    pub months: Decimal,
}

impl Default for LoanInput {
    fn default() -> Self {
        Self {
            amount: dec!(42000000),
            annual_rate: dec!(4.1),
            months: dec!(48),
        }
    }
}

/// Effective terms after clamping; the only values the calculator ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Percent,
    pub months: u32,
}

impl LoanTerms {
    /// Clamp raw input: `max(0, amount)`, `max(0, rate)`, `max(1, round(months))`.
    pub fn from_input(input: &LoanInput) -> Self {
        let rounded = input
            .months
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let months = if rounded < Decimal::ONE {
            1
        } else {
            rounded.to_u32().unwrap_or(u32::MAX)
        };
        Self {
            principal: input.amount.max(Decimal::ZERO),
            annual_rate: input.annual_rate.max(Decimal::ZERO),
            months,
        }
    }
}

impl From<&LoanInput> for LoanTerms {
    fn from(input: &LoanInput) -> Self {
        LoanTerms::from_input(input)
    }
}

/// Fixed installment and totals of an equal-installment (annuity) loan.
///
/// Values are unrounded; rounding is a display concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amortization {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
}

impl Amortization {
    pub const ZERO: Amortization = Amortization {
        monthly_payment: Decimal::ZERO,
        total_payment: Decimal::ZERO,
        total_interest: Decimal::ZERO,
    };
}

/// Monthly periodic rate for an annual percentage: `percent / 12 / 100`.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// Equal-installment payment for already-clamped inputs.
///
/// With a periodic rate `r = rate / 12 / 100` and `f = (1 + r)^n`:
///
/// * `r == 0`: payment = principal / n, no interest
/// * `r > 0`: payment = principal × r × f / (f − 1)
///
/// Total over the term is payment × n and interest is that minus the
/// principal. The function is total: amounts beyond the decimal range
/// saturate, a factor too large to represent uses the limit payment
/// `principal × r`, and a rate below decimal resolution takes the
/// zero-rate branch.
pub fn compute_amortization(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> Amortization {
    let principal = principal.max(Decimal::ZERO);
    let n = term_months.max(1);
    let n_dec = Decimal::from(n);
    let r = monthly_rate(annual_rate_percent.max(Decimal::ZERO));

    if r.is_zero() {
        return level_principal(principal, n_dec);
    }

    let payment = match checked_pow(Decimal::ONE + r, n) {
        Some(factor) => {
            let growth = factor - Decimal::ONE;
            if growth <= Decimal::ZERO {
                return level_principal(principal, n_dec);
            }
            // r × f / (f − 1) lies in (r, 1 + r]; overflow only in r × f
            let ratio = r
                .checked_mul(factor)
                .and_then(|x| x.checked_div(growth))
                .unwrap_or(r);
            principal.saturating_mul(ratio)
        }
        None => principal.saturating_mul(r),
    };

    let total_payment = payment.saturating_mul(n_dec);
    Amortization {
        monthly_payment: payment,
        total_payment,
        total_interest: total_payment.saturating_sub(principal).max(Decimal::ZERO),
    }
}

/// `base^exp` by repeated squaring; None on overflow.
fn checked_pow(base: Decimal, mut exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}

fn level_principal(principal: Money, n: Decimal) -> Amortization {
    let payment = principal / n;
    Amortization {
        monthly_payment: payment,
        total_payment: payment.saturating_mul(n),
        total_interest: Decimal::ZERO,
    }
}

/// Single-entry memo keyed on the effective terms.
///
/// Recomputing is always correct; the cache only skips identical work when
/// a field changes without changing its effective value.
#[derive(Debug, Clone, Default)]
pub struct AmortizationCache {
    entry: Option<(LoanTerms, Amortization)>,
    hits: u64,
    misses: u64,
}

impl AmortizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, terms: &LoanTerms) -> Amortization {
        if let Some((key, value)) = &self.entry {
            if key == terms {
                self.hits += 1;
                return *value;
            }
        }
        let value = compute_amortization(terms.principal, terms.annual_rate, terms.months);
        debug!(
            principal = %terms.principal,
            annual_rate = %terms.annual_rate,
            months = terms.months,
            monthly_payment = %value.monthly_payment,
            "amortization recomputed"
        );
        self.misses += 1;
        self.entry = Some((*terms, value));
        value
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

/// Localized strings for the three results, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedAmounts {
    pub monthly_payment: String,
    pub total_payment: String,
    pub total_interest: String,
}

impl FormattedAmounts {
    pub fn new(amortization: &Amortization, policy: &FormatPolicy) -> Self {
        Self {
            monthly_payment: format_currency(amortization.monthly_payment, policy),
            total_payment: format_currency(amortization.total_payment, policy),
            total_interest: format_currency(amortization.total_interest, policy),
        }
    }
}

/// Output of a loan calculation from raw input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Terms actually used after clamping
    pub effective_terms: LoanTerms,
    /// Monthly periodic rate (decimal)
    pub monthly_rate: Rate,
    pub formatted: FormattedAmounts,
}

/// Clamp raw input, compute the installment and attach display strings.
///
/// Each clamp applied to the input is reported as a warning rather than an
/// error.
pub fn calculate_loan(input: &LoanInput, policy: &FormatPolicy) -> ComputationOutput<LoanOutput> {
    let start = Instant::now();
    let terms = LoanTerms::from_input(input);
    let warnings = clamp_warnings(input, &terms);
    for w in &warnings {
        debug!(warning = %w, "loan input clamped");
    }

    let amortization = compute_amortization(terms.principal, terms.annual_rate, terms.months);

    let output = LoanOutput {
        monthly_payment: amortization.monthly_payment,
        total_payment: amortization.total_payment,
        total_interest: amortization.total_interest,
        effective_terms: terms,
        monthly_rate: monthly_rate(terms.annual_rate),
        formatted: FormattedAmounts::new(&amortization, policy),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Equal-installment (annuity) amortization",
        input,
        warnings,
        elapsed,
        output,
    )
}

fn clamp_warnings(input: &LoanInput, terms: &LoanTerms) -> Vec<String> {
    let mut warnings = Vec::new();
    if input.amount < Decimal::ZERO {
        warnings.push(format!("Negative amount ({}) treated as 0", input.amount));
    }
    if input.annual_rate < Decimal::ZERO {
        warnings.push(format!(
            "Negative annual rate ({}%) treated as 0%",
            input.annual_rate
        ));
    }
    if input.annual_rate > RATE_INPUT_MAX {
        warnings.push(format!(
            "Annual rate {}% exceeds the {RATE_INPUT_MAX}% input range; computed as entered",
            input.annual_rate
        ));
    }
    if Decimal::from(terms.months) != input.months {
        warnings.push(format!(
            "Term of {} months adjusted to {} months",
            input.months, terms.months
        ));
    }
    warnings
}
