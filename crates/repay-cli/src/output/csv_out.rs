use serde_json::Value;
use std::io::{self, Write};

use super::{flatten_object, scalar_to_string};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        tracing::error!(error = %e, "CSV output failed");
    }
}

fn write_csv<W: Write>(writer: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_pairs(&mut wtr, result)?,
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
            _ => write_pairs(&mut wtr, map)?,
        },
        Value::Array(arr) => write_rows(&mut wtr, arr)?,
        _ => wtr.write_record([scalar_to_string(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

/// Two-column CSV: field, value
fn write_pairs<W: Write>(
    wtr: &mut csv::Writer<W>,
    map: &serde_json::Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_object(map) {
        wtr.write_record([key, scalar_to_string(&val)])?;
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([scalar_to_string(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<String> = flatten_object(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;

    for item in arr {
        if let Value::Object(map) = item {
            let flat = flatten_object(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| scalar_to_string(v))
                        .unwrap_or_default()
                })
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}
