use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use repay_core::amortization::{self, LoanInput, LoanTerms};
use repay_core::formatting::{self, FormatPolicy, Locale};
use repay_core::normalizer;
use repay_core::sensitivity;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, value: &str) -> NapiResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| to_napi_error(format!("Invalid {field} '{value}': {e}")))
}

fn policy_for(locale: Option<String>) -> NapiResult<FormatPolicy> {
    match locale {
        Some(code) => Ok(code.parse::<Locale>().map_err(to_napi_error)?.policy()),
        None => Ok(FormatPolicy::default()),
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// `{ amount, annual_rate, months }` in, `{ monthly_payment, total_payment,
/// total_interest }` out, after clamping. Amounts are decimal strings.
#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let terms = LoanTerms::from_input(&input);
    let output = amortization::compute_amortization(terms.principal, terms.annual_rate, terms.months);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Full computation envelope with localized display strings.
#[napi]
pub fn calculate_loan(input_json: String, locale: Option<String>) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let policy = policy_for(locale)?;
    let output = amortization::calculate_loan(&input, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rate_cut_savings(input_json: String, cut: Option<String>) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let cut = match cut {
        Some(c) => parse_decimal("cut", &c)?,
        None => sensitivity::DEFAULT_RATE_CUT,
    };
    let output = sensitivity::rate_cut_savings(&input, cut).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Input normalization and display
// ---------------------------------------------------------------------------

/// Lenient field parse; never fails, returns a decimal string.
#[napi]
pub fn parse_number(text: String) -> String {
    normalizer::parse_number(&text).to_string()
}

#[napi]
pub fn format_number(value: String) -> NapiResult<String> {
    let value = parse_decimal("value", &value)?;
    Ok(normalizer::format_number(value))
}

#[napi]
pub fn format_currency(value: String, locale: Option<String>) -> NapiResult<String> {
    let value = parse_decimal("value", &value)?;
    let policy = policy_for(locale)?;
    Ok(formatting::format_currency(value, &policy))
}
