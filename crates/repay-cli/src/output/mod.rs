pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys, one level per nesting.
///
/// `{"formatted": {"monthly_payment": "₩1"}}` becomes
/// `[("formatted.monthly_payment", "₩1")]`.
pub fn flatten_object(map: &serde_json::Map<String, Value>) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (sub_key, sub_val) in flatten_object(inner) {
                    rows.push((format!("{key}.{sub_key}"), sub_val));
                }
            }
            _ => rows.push((key.clone(), val.clone())),
        }
    }
    rows
}

/// Scalar rendering shared by the text formatters.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_result() {
        let value = json!({
            "monthly_payment": "950200.89",
            "effective_terms": {"months": 48, "principal": "42000000"},
            "formatted": {"monthly_payment": "₩950,201"}
        });
        let rows = flatten_object(value.as_object().unwrap());
        let mut keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "effective_terms.months",
                "effective_terms.principal",
                "formatted.monthly_payment",
                "monthly_payment",
            ]
        );
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("₩1")), "₩1");
        assert_eq!(scalar_to_string(&json!(36)), "36");
        assert_eq!(scalar_to_string(&json!(null)), "");
        assert_eq!(scalar_to_string(&json!([1, 2])), "[1,2]");
    }
}
