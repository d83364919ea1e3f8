pub mod interactive;
pub mod loan;
pub mod normalize;

use std::path::Path;

use repay_core::analytics::Analytics;
use repay_core::config::RepayConfig;
use repay_core::formatting::{FormatPolicy, Locale};
use repay_core::RepayResult;

/// Settings shared by every command.
pub struct Context {
    pub config: RepayConfig,
    pub policy: FormatPolicy,
    pub analytics: Analytics,
}

impl Context {
    pub fn load(config_path: &Path, locale: Option<Locale>) -> RepayResult<Self> {
        let mut config = RepayConfig::load_or_default(config_path)?;
        if let Some(locale) = locale {
            config.locale = locale;
        }
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: RepayConfig) -> Self {
        let policy = config.format_policy();
        let analytics = Analytics::new(config.analytics.measurement_id.clone());
        Self {
            config,
            policy,
            analytics,
        }
    }
}
