use serde_json::Value;

use super::scalar_to_string;

/// Key output fields in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "monthly_payment",
    "interest_savings",
    "formatted",
    "value",
    "total_interest",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

/// Look for well-known result fields in order of priority, then fall back to
/// the first field in the result object.
fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let found = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null() && !val.is_object());
        if let Some(val) = found {
            return scalar_to_string(val);
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_to_string(val));
        }
    }

    scalar_to_string(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_monthly_payment_wins() {
        let value = json!({
            "result": {
                "formatted": {"monthly_payment": "₩950,201"},
                "monthly_payment": "950200.89",
                "total_interest": "3609642.8"
            }
        });
        assert_eq!(minimal_answer(&value), "950200.89");
    }

    #[test]
    fn test_format_command_prints_grouped_text() {
        let value = json!({"result": {"value": "1234", "formatted": "1,234", "currency": "₩1,234"}});
        assert_eq!(minimal_answer(&value), "1,234");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let value = json!({"result": {"baseline_rate": "4.1"}});
        assert_eq!(minimal_answer(&value), "baseline_rate: 4.1");
    }
}
