use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_object, scalar_to_string};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render_table(value));
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => render_envelope(result, map),
            None => render_object(map),
        },
        Value::Array(arr) => render_array(arr),
        _ => value.to_string(),
    }
}

fn render_envelope(result: &Value, envelope: &serde_json::Map<String, Value>) -> String {
    let mut out = match result {
        Value::Object(res_map) => render_object(res_map),
        Value::Array(rows) => render_array(rows),
        other => scalar_to_string(other),
    };

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\n\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("\n  - {w}"));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\n\nMethodology: {meth}"));
    }
    out
}

fn render_object(map: &serde_json::Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_object(map) {
        builder.push_record([key, format_cell(&val)]);
    }
    Table::from(builder).to_string()
}

/// One row per element; columns from the first element's (flattened) keys.
fn render_array(arr: &[Value]) -> String {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            return "(empty)".to_string();
        }
        return arr.iter().map(format_cell).collect::<Vec<_>>().join("\n");
    };

    let headers: Vec<String> = flatten_object(first).into_iter().map(|(k, _)| k).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for item in arr {
        if let Value::Object(map) = item {
            let flat = flatten_object(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_cell(v))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
    }
    Table::from(builder).to_string()
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        other => scalar_to_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_table_has_dotted_rows_and_warnings() {
        let value = json!({
            "result": {
                "monthly_payment": "885719.55",
                "formatted": {"monthly_payment": "₩885,720"}
            },
            "methodology": "Equal-installment (annuity) amortization",
            "warnings": ["Negative amount (-1) treated as 0"]
        });
        let rendered = render_table(&value);
        assert!(rendered.contains("formatted.monthly_payment"));
        assert!(rendered.contains("₩885,720"));
        assert!(rendered.contains("Warnings:\n  - Negative amount (-1) treated as 0"));
        assert!(rendered.ends_with("Methodology: Equal-installment (annuity) amortization"));
    }

    #[test]
    fn test_array_result_renders_one_row_per_rate() {
        let value = json!({
            "result": [
                {"annual_rate": "3", "monthly_payment": "100"},
                {"annual_rate": "4", "monthly_payment": "110"}
            ],
            "warnings": []
        });
        let rendered = render_table(&value);
        assert!(rendered.contains("annual_rate"));
        assert_eq!(rendered.lines().filter(|l| l.contains("110")).count(), 1);
        assert!(!rendered.contains("Warnings"));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(render_table(&json!([])), "(empty)");
    }
}
