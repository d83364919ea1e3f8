use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use repay_core::formatting::format_currency;
use repay_core::normalizer::{format_number_with, parse_number};

use super::Context;

#[derive(Args)]
pub struct ParseArgs {
    /// Free text as typed into a field (e.g. "₩42,000,000")
    #[arg(allow_hyphen_values = true)]
    pub text: String,
}

#[derive(Args)]
pub struct FormatArgs {
    /// Number to format
    #[arg(allow_hyphen_values = true)]
    pub value: Decimal,
}

pub fn run_parse(args: ParseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let value = parse_number(&args.text);
    Ok(json!({
        "result": {
            "text": args.text,
            "value": value,
        }
    }))
}

pub fn run_format(args: FormatArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "result": {
            "value": args.value,
            "formatted": format_number_with(args.value, &ctx.policy),
            "currency": format_currency(args.value, &ctx.policy),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repay_core::config::RepayConfig;
    use repay_core::formatting::Locale;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_reports_zero_for_garbage() {
        let value = run_parse(ParseArgs { text: "₩--".into() }).unwrap();
        assert_eq!(value["result"]["value"], "0");
    }

    #[test]
    fn test_format_uses_locale_policy() {
        let mut config = RepayConfig::default();
        config.locale = Locale::DeDe;
        let ctx = Context::from_config(config);
        let value = run_format(FormatArgs { value: dec!(1234567.5) }, &ctx).unwrap();
        assert_eq!(value["result"]["formatted"], "1.234.568");
        assert_eq!(value["result"]["currency"], "1.234.568\u{a0}₩");
    }
}
