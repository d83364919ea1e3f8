use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::amortization::LoanInput;
use crate::form::SliderBounds;
use crate::formatting::{FormatPolicy, Locale, SymbolPosition};
use crate::RepayResult;

/// Partial override of a locale's formatting preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOverride {
    pub grouping_separator: Option<String>,
    pub decimal_separator: Option<String>,
    pub fraction_digits: Option<u32>,
    pub currency_symbol: Option<String>,
    pub symbol_position: Option<SymbolPosition>,
}

impl FormatOverride {
    fn apply(&self, mut policy: FormatPolicy) -> FormatPolicy {
        if let Some(sep) = &self.grouping_separator {
            policy.grouping_separator = sep.clone();
        }
        if let Some(sep) = &self.decimal_separator {
            policy.decimal_separator = sep.clone();
        }
        if let Some(digits) = self.fraction_digits {
            policy.fraction_digits = digits;
        }
        if let Some(symbol) = &self.currency_symbol {
            policy.currency_symbol = symbol.clone();
        }
        if let Some(position) = self.symbol_position {
            policy.symbol_position = position;
        }
        policy
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Page-view/event logging is off when unset.
    pub measurement_id: Option<String>,
}

/// Contents of `repay.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepayConfig {
    pub locale: Locale,
    /// Initial field values
    pub defaults: LoanInput,
    pub sliders: SliderBounds,
    pub format: FormatOverride,
    pub analytics: AnalyticsConfig,
}

impl Default for RepayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            defaults: LoanInput::default(),
            sliders: SliderBounds::default(),
            format: FormatOverride::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl RepayConfig {
    pub fn from_toml_str(src: &str) -> RepayResult<Self> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> RepayResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> RepayResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Locale preset with any `[format]` overrides applied.
    pub fn format_policy(&self) -> FormatPolicy {
        self.format.apply(self.locale.policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_file_is_default() {
        let cfg = RepayConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, RepayConfig::default());
        assert_eq!(cfg.format_policy(), FormatPolicy::default());
    }

    #[test]
    fn test_full_file() {
        let src = r#"
            locale = "de-DE"

            [defaults]
            amount = 30000000
            annual_rate = 4.0
            months = 36

            [format]
            fraction_digits = 2

            [analytics]
            measurement_id = "G-TEST123"
        "#;
        let cfg = RepayConfig::from_toml_str(src).unwrap();
        assert_eq!(cfg.locale, Locale::DeDe);
        assert_eq!(cfg.defaults.amount, dec!(30000000));
        assert_eq!(cfg.defaults.annual_rate, dec!(4));
        assert_eq!(cfg.defaults.months, dec!(36));
        assert_eq!(cfg.analytics.measurement_id.as_deref(), Some("G-TEST123"));

        let policy = cfg.format_policy();
        assert_eq!(policy.grouping_separator, ".");
        assert_eq!(policy.fraction_digits, 2);
    }

    #[test]
    fn test_unknown_locale_is_config_error() {
        let err = RepayConfig::from_toml_str(r#"locale = "xx-XX""#).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg =
            RepayConfig::load_or_default(Path::new("/nonexistent/repay.toml")).unwrap();
        assert_eq!(cfg.locale, Locale::KoKr);
    }
}
