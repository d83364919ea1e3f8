use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise JSON piped on stdin.
///
/// Returns None when stdin is a TTY or the pipe is empty, so callers can
/// fall back to flags or defaults.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse JSON from stdin: {e}"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repay_core::LoanInput;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_pipe_is_none() {
        assert!(parse_piped::<LoanInput>("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_loan() {
        let input: LoanInput = parse_piped(r#" {"amount": "1000000", "annual_rate": 3} "#)
            .unwrap()
            .unwrap();
        assert_eq!(input.amount, dec!(1000000));
        assert_eq!(input.months, dec!(48));
    }

    #[test]
    fn test_malformed_pipe_is_error() {
        let err = parse_piped::<LoanInput>("{amount:").unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }
}
