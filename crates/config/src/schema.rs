//! Config schema types (inspector, coordinator, bus, logging).
use {
    picker_protocol::{MAX_MESSAGE_BYTES, OUTER_HTML_LIMIT, TEXT_CONTENT_LIMIT},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub inspector: InspectorConfig,
    pub coordinator: CoordinatorConfig,
    pub bus: BusConfig,
    pub logging: LoggingConfig,
}

/// Page inspector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Maximum characters kept from an element's text content.
    pub text_limit: usize,
    /// Maximum characters kept from an element's serialized markup.
    pub markup_limit: usize,
    /// Distance in pixels between the pointer and the floating label.
    pub label_offset: f64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            text_limit: TEXT_CONTENT_LIMIT,
            markup_limit: OUTER_HTML_LIMIT,
            label_offset: 10.0,
        }
    }
}

/// What happens to the session slot when a stop command cannot be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopFailurePolicy {
    /// Keep the recorded tab so a later stop can be retried by the user.
    #[default]
    Retain,
    /// Forget the recorded tab.
    Clear,
}

impl StopFailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Clear => "clear",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retain" => Some(Self::Retain),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Background coordinator settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub stop_failure_policy: StopFailurePolicy,
}

/// Runtime message bus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Largest serialized message accepted by the bus.
    pub max_message_bytes: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: MAX_MESSAGE_BYTES,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: PickerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, PickerConfig::default());
        assert_eq!(cfg.inspector.text_limit, 200);
        assert_eq!(cfg.inspector.markup_limit, 500);
        assert_eq!(cfg.coordinator.stop_failure_policy, StopFailurePolicy::Retain);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: PickerConfig = toml::from_str(
            r#"
            [coordinator]
            stop_failure_policy = "clear"

            [inspector]
            text_limit = 80
            "#,
        )
        .unwrap();
        assert_eq!(cfg.coordinator.stop_failure_policy, StopFailurePolicy::Clear);
        assert_eq!(cfg.inspector.text_limit, 80);
        assert_eq!(cfg.inspector.markup_limit, 500);
        assert_eq!(cfg.bus.max_message_bytes, 65_536);
    }

    #[test]
    fn policy_names() {
        assert_eq!(StopFailurePolicy::from_name(" Clear "), Some(StopFailurePolicy::Clear));
        assert_eq!(StopFailurePolicy::from_name("drop"), None);
        assert_eq!(StopFailurePolicy::Retain.as_str(), "retain");
    }
}
