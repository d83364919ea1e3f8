use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_amortization, Amortization, LoanInput, LoanTerms};
use crate::error::RepayError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SensitivityVariable};
use crate::RepayResult;

/// Rate reduction the page suggests checking for refinancing.
pub const DEFAULT_RATE_CUT: Percent = dec!(0.5);

/// Cap on sweep rows so a tiny step can't allocate without bound.
const MAX_SWEEP_POINTS: usize = 2_000;

/// Baseline loan against the same loan at a lower annual rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCutComparison {
    pub baseline_rate: Percent,
    pub reduced_rate: Percent,
    pub baseline: Amortization,
    pub reduced: Amortization,
    pub monthly_savings: Money,
    pub interest_savings: Money,
}

/// Compare the loan at its rate with the rate lowered by `cut_pp`
/// percentage points. The lowered rate never goes below zero.
pub fn rate_cut_savings(
    input: &LoanInput,
    cut_pp: Percent,
) -> RepayResult<ComputationOutput<RateCutComparison>> {
    let start = Instant::now();
    if cut_pp < Decimal::ZERO {
        return Err(RepayError::InvalidInput {
            field: "cut".into(),
            reason: "Rate cut must be zero or positive".into(),
        });
    }

    let terms = LoanTerms::from_input(input);
    let reduced_rate = (terms.annual_rate - cut_pp).max(Decimal::ZERO);
    let mut warnings = Vec::new();
    if reduced_rate.is_zero() && cut_pp > terms.annual_rate {
        warnings.push(format!(
            "Cut of {cut_pp}pp exceeds the {}% rate; compared against 0%",
            terms.annual_rate
        ));
    }

    let baseline = compute_amortization(terms.principal, terms.annual_rate, terms.months);
    let reduced = compute_amortization(terms.principal, reduced_rate, terms.months);

    let output = RateCutComparison {
        baseline_rate: terms.annual_rate,
        reduced_rate,
        monthly_savings: baseline.monthly_payment - reduced.monthly_payment,
        interest_savings: baseline.total_interest - reduced.total_interest,
        baseline,
        reduced,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rate-cut comparison, equal-installment amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// One row of a rate sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub annual_rate: Percent,
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
}

/// Payment and interest across a range of annual rates, holding principal
/// and term fixed.
pub fn rate_sweep(
    input: &LoanInput,
    variable: &SensitivityVariable,
) -> RepayResult<ComputationOutput<Vec<SweepRow>>> {
    let start = Instant::now();
    let terms = LoanTerms::from_input(input);
    let rates = generate_sweep_values(variable)?;

    let mut warnings = Vec::new();
    if variable.min < Decimal::ZERO {
        warnings.push("Negative rates in the sweep are computed as 0%".to_string());
    }

    let rows = rates
        .into_iter()
        .map(|rate| {
            let a = compute_amortization(terms.principal, rate, terms.months);
            SweepRow {
                annual_rate: rate,
                monthly_payment: a.monthly_payment,
                total_payment: a.total_payment,
                total_interest: a.total_interest,
            }
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual-rate sweep, equal-installment amortization",
        &(input, variable),
        warnings,
        elapsed,
        rows,
    ))
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> RepayResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(RepayError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(RepayError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }
    let points = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .ok_or_else(|| RepayError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Range divided by step overflows".into(),
        })?;
    if points >= Decimal::from(MAX_SWEEP_POINTS) {
        return Err(RepayError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: format!("Sweep would produce more than {MAX_SWEEP_POINTS} points"),
        });
    }

    let mut values = Vec::new();
    let mut current = Some(var.min);
    while let Some(value) = current.filter(|v| *v <= var.max) {
        values.push(value);
        current = value.checked_add(var.step);
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate_variable(min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
        SensitivityVariable {
            name: "annual_rate".into(),
            min,
            max,
            step,
        }
    }

    #[test]
    fn test_half_point_cut_saves_interest() {
        let out = rate_cut_savings(&LoanInput::default(), DEFAULT_RATE_CUT).unwrap();
        let cmp = &out.result;
        assert_eq!(cmp.reduced_rate, dec!(3.6));
        // 42,000,000 over 48 months: 4.1% -> 3.6% saves about 450,232 of interest
        assert!((cmp.interest_savings - dec!(450232)).abs() < dec!(1));
        assert!(cmp.monthly_savings > Decimal::ZERO);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_cut_larger_than_rate_floors_at_zero() {
        let input = LoanInput {
            annual_rate: dec!(0.3),
            ..LoanInput::default()
        };
        let out = rate_cut_savings(&input, dec!(0.5)).unwrap();
        assert_eq!(out.result.reduced_rate, Decimal::ZERO);
        assert_eq!(out.result.reduced.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_sweep_step_too_small_is_rejected() {
        let variable = rate_variable(dec!(0), dec!(12), dec!(0.0000000000000000000000000001));
        let err = rate_sweep(&LoanInput::default(), &variable).unwrap_err();
        assert!(matches!(err, RepayError::InvalidInput { .. }));
    }

    #[test]
    fn test_sweep_span_overflow_is_rejected() {
        let variable = rate_variable(Decimal::MIN, Decimal::MAX, dec!(1));
        assert!(generate_sweep_values(&variable).is_err());
    }

    #[test]
    fn test_sweep_ending_at_decimal_max() {
        let values = generate_sweep_values(&rate_variable(Decimal::MAX, Decimal::MAX, dec!(1)))
            .unwrap();
        assert_eq!(values, vec![Decimal::MAX]);
    }

    #[test]
    fn test_negative_cut_rejected() {
        let err = rate_cut_savings(&LoanInput::default(), dec!(-0.5)).unwrap_err();
        assert!(matches!(err, RepayError::InvalidInput { .. }));
    }

    #[test]
    fn test_sweep_includes_max() {
        let out = rate_sweep(
            &LoanInput::default(),
            &rate_variable(dec!(3), dec!(4), dec!(0.3)),
        )
        .unwrap();
        let rates: Vec<Decimal> = out.result.iter().map(|r| r.annual_rate).collect();
        assert_eq!(rates, vec![dec!(3), dec!(3.3), dec!(3.6), dec!(3.9), dec!(4)]);
    }

    #[test]
    fn test_sweep_payment_rises_with_rate() {
        let out = rate_sweep(
            &LoanInput::default(),
            &rate_variable(dec!(0), dec!(12), dec!(1)),
        )
        .unwrap();
        assert_eq!(out.result.len(), 13);
        assert_eq!(out.result[0].total_interest, Decimal::ZERO);
        for pair in out.result.windows(2) {
            assert!(pair[1].monthly_payment > pair[0].monthly_payment);
        }
    }

    #[test]
    fn test_sweep_validation() {
        let input = LoanInput::default();
        assert!(rate_sweep(&input, &rate_variable(dec!(1), dec!(2), dec!(0))).is_err());
        assert!(rate_sweep(&input, &rate_variable(dec!(3), dec!(2), dec!(0.1))).is_err());
        assert!(rate_sweep(&input, &rate_variable(dec!(0), dec!(20), dec!(0.0001))).is_err());
    }
}
