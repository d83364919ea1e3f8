//! Page-view and event hooks.
//!
//! Events are emitted as `tracing` records on the `repay::analytics` target;
//! whatever subscriber the host installs decides where they go. Nothing is
//! recorded unless a measurement id is configured.

use serde::Serialize;
use tracing::{info, warn};

pub const TARGET: &str = "repay::analytics";

/// Anything recorded through [`Analytics`], returned for callers that want to
/// forward it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "hit_type", rename_all = "snake_case")]
pub enum AnalyticsHit {
    Pageview {
        page: String,
    },
    Event {
        category: String,
        action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Analytics {
    measurement_id: Option<String>,
}

impl Analytics {
    pub fn new(measurement_id: Option<String>) -> Self {
        let measurement_id = measurement_id.filter(|id| !id.trim().is_empty());
        Self { measurement_id }
    }

    pub fn is_enabled(&self) -> bool {
        self.measurement_id.is_some()
    }

    pub fn init(&self) {
        match &self.measurement_id {
            Some(id) => info!(target: TARGET, measurement_id = %id, "analytics initialized"),
            None => warn!(
                target: TARGET,
                "measurement id is not defined; analytics will not be initialized"
            ),
        }
    }

    pub fn page_view(&self, path: &str) -> Option<AnalyticsHit> {
        let id = self.measurement_id.as_deref()?;
        info!(target: TARGET, measurement_id = id, page = path, "page view logged");
        Some(AnalyticsHit::Pageview {
            page: path.to_string(),
        })
    }

    pub fn event(&self, category: &str, action: &str, label: Option<&str>) -> Option<AnalyticsHit> {
        let id = self.measurement_id.as_deref()?;
        info!(
            target: TARGET,
            measurement_id = id,
            category,
            action,
            label = label.unwrap_or_default(),
            "event logged"
        );
        Some(AnalyticsHit::Event {
            category: category.to_string(),
            action: action.to_string(),
            label: label.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disabled_without_id() {
        let analytics = Analytics::new(None);
        assert!(!analytics.is_enabled());
        assert_eq!(analytics.page_view("/"), None);
        assert_eq!(analytics.event("calculator", "calculate", None), None);

        assert!(!Analytics::new(Some("  ".into())).is_enabled());
    }

    #[test]
    fn test_records_hits_when_enabled() {
        let analytics = Analytics::new(Some("G-TEST".into()));
        assert_eq!(
            analytics.page_view("/"),
            Some(AnalyticsHit::Pageview { page: "/".into() })
        );
        let hit = analytics
            .event("calculator", "rate_cut", Some("0.5"))
            .unwrap();
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["hit_type"], "event");
        assert_eq!(json["label"], "0.5");
    }
}
