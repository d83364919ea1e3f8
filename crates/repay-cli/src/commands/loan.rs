use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use repay_core::amortization::{calculate_loan, LoanInput};
use repay_core::normalizer::parse_number;
use repay_core::sensitivity::{self, DEFAULT_RATE_CUT};
use repay_core::SensitivityVariable;

use super::Context;
use crate::input;

/// Loan terms shared by the loan commands.
///
/// Values are free text and parsed leniently: `42,000,000원` and `4.1%` are
/// accepted, and anything unparseable counts as 0.
#[derive(Args)]
pub struct LoanArgs {
    /// Loan amount in won (e.g. 42,000,000)
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<String>,

    /// Annual interest rate in percent (e.g. 4.1)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<String>,

    /// Repayment term in months
    #[arg(long, allow_hyphen_values = true)]
    pub months: Option<String>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl LoanArgs {
    fn has_flags(&self) -> bool {
        self.amount.is_some() || self.rate.is_some() || self.months.is_some()
    }

    /// Flags over configured defaults.
    fn merge_flags(&self, defaults: &LoanInput) -> LoanInput {
        let field = |text: &Option<String>, default: Decimal| {
            text.as_deref().map(parse_number).unwrap_or(default)
        };
        LoanInput {
            amount: field(&self.amount, defaults.amount),
            annual_rate: field(&self.rate, defaults.annual_rate),
            months: field(&self.months, defaults.months),
        }
    }

    /// Input file, then flags, then piped JSON, then configured defaults.
    pub fn resolve(&self, ctx: &Context) -> Result<LoanInput, Box<dyn std::error::Error>> {
        let defaults = &ctx.config.defaults;
        if let Some(ref path) = self.input {
            return input::file::read_input(path);
        }
        if self.has_flags() {
            return Ok(self.merge_flags(defaults));
        }
        Ok(input::stdin::read_stdin::<LoanInput>()?.unwrap_or_else(|| defaults.clone()))
    }
}

#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

#[derive(Args)]
pub struct RateCutArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Rate reduction in percentage points
    #[arg(long, default_value_t = DEFAULT_RATE_CUT)]
    pub cut: Decimal,
}

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Lowest annual rate in percent
    #[arg(long, default_value = "0")]
    pub min: Decimal,

    /// Highest annual rate in percent
    #[arg(long, default_value = "12")]
    pub max: Decimal,

    /// Rate increment in percentage points
    #[arg(long, default_value = "0.5")]
    pub step: Decimal,
}

pub fn run_calculate(args: CalculateArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = args.loan.resolve(ctx)?;
    let result = calculate_loan(&loan_input, &ctx.policy);
    ctx.analytics.event("calculator", "calculate", None);
    Ok(serde_json::to_value(result)?)
}

pub fn run_rate_cut(args: RateCutArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = args.loan.resolve(ctx)?;
    let result = sensitivity::rate_cut_savings(&loan_input, args.cut)?;
    ctx.analytics
        .event("calculator", "rate_cut", Some(&args.cut.to_string()));
    Ok(serde_json::to_value(result)?)
}

pub fn run_sweep(args: SweepArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = args.loan.resolve(ctx)?;
    let variable = SensitivityVariable {
        name: "annual_rate".into(),
        min: args.min,
        max: args.max,
        step: args.step,
    };
    let result = sensitivity::rate_sweep(&loan_input, &variable)?;
    ctx.analytics.event("calculator", "sweep", None);
    Ok(serde_json::to_value(result)?)
}
