//! Runtime message protocol shared by the popup, background and page contexts.
//!
//! All communication uses small JSON records tagged by a `type` field:
//! - [`RuntimeMessage`]: popup/page → background (coordinator)
//! - [`TabCommand`]: background → page inspector
//! - [`PopupEvent`]: background → popup broadcast
//!
//! Request/reply pairs answer with a [`Reply`] tagged by `status`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const MAX_MESSAGE_BYTES: usize = 65_536; // 64 KB
pub const HARD_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024; // 16 MB
pub const TEXT_CONTENT_LIMIT: usize = 200;
pub const OUTER_HTML_LIMIT: usize = 500;

/// Browser tab identifier.
pub type TabId = u64;

// ── Element details ──────────────────────────────────────────────────────────

/// Structured snapshot of a selected element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDetails {
    /// Lowercase tag name.
    pub tag_name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<Attribute>,
    /// Trimmed text content, truncated.
    pub text_content: String,
    /// Serialized markup, truncated.
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
    pub position: Position,
    pub computed_style: ComputedStyleSubset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Bounding box in viewport coordinates plus the document-space origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub absolute_left: f64,
    pub absolute_top: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyleSubset {
    pub display: String,
    pub position: String,
    pub width: String,
    pub height: String,
    pub background_color: String,
    pub color: String,
    pub font_size: String,
}

// ── Tabs ─────────────────────────────────────────────────────────────────────

/// The popup's view of a browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDescriptor {
    pub id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl TabDescriptor {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            url: None,
            title: None,
            active: true,
        }
    }
}

// ── Messages ─────────────────────────────────────────────────────────────────

/// Messages delivered to the background runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuntimeMessage {
    /// Popup asks to enter picking mode on `tab`.
    StartPickingMode { tab: TabDescriptor },
    /// Popup asks to leave picking mode.
    StopPickingMode { tab: TabDescriptor },
    /// Page inspector reports the clicked element.
    ElementSelected { info: Option<ElementDetails> },
}

impl RuntimeMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartPickingMode { .. } => "startPickingMode",
            Self::StopPickingMode { .. } => "stopPickingMode",
            Self::ElementSelected { .. } => "elementSelected",
        }
    }

    /// Whether the sender waits for a [`Reply`].
    pub fn expects_reply(&self) -> bool {
        !matches!(self, Self::ElementSelected { .. })
    }
}

impl fmt::Display for RuntimeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartPickingMode { tab } => write!(f, "startPickingMode(tab={})", tab.id),
            Self::StopPickingMode { tab } => write!(f, "stopPickingMode(tab={})", tab.id),
            Self::ElementSelected { info } => match info {
                Some(info) => write!(f, "elementSelected(<{}>)", info.tag_name),
                None => write!(f, "elementSelected(none)"),
            },
        }
    }
}

/// Commands delivered to a tab's page inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TabCommand {
    StartPicking,
    StopPicking,
}

impl fmt::Display for TabCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartPicking => write!(f, "startPicking"),
            Self::StopPicking => write!(f, "stopPicking"),
        }
    }
}

/// Events broadcast to every listening popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PopupEvent {
    DisplayElementInfo { info: Option<ElementDetails> },
}

// ── Replies ──────────────────────────────────────────────────────────────────

/// Reply to a start/stop request, at either hop of the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    PickingStarted,
    PickingStopped,
    NoPickingActive,
    Failed { error: String },
}

impl Reply {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::PickingStarted => "pickingStarted",
            Self::PickingStopped => "pickingStopped",
            Self::NoPickingActive => "noPickingActive",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { error } => write!(f, "failed({error})"),
            other => f.write_str(other.status()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    fn sample_details() -> ElementDetails {
        ElementDetails {
            tag_name: "button".into(),
            id: Some("go".into()),
            classes: vec!["btn".into(), "primary".into()],
            attributes: vec![Attribute {
                name: "id".into(),
                value: "go".into(),
            }],
            text_content: "Go".into(),
            outer_html: "<button id=\"go\">Go</button>".into(),
            position: Position {
                left: 10.0,
                top: 20.0,
                width: 80.0,
                height: 30.0,
                x: 10.0,
                y: 20.0,
                absolute_left: 10.0,
                absolute_top: 20.0,
            },
            computed_style: ComputedStyleSubset::default(),
        }
    }

    #[test]
    fn start_request_wire_shape() {
        let msg = RuntimeMessage::StartPickingMode {
            tab: TabDescriptor::new(7),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({ "type": "startPickingMode", "tab": { "id": 7, "active": true } })
        );
        assert_eq!(msg.kind(), "startPickingMode");
        assert!(msg.expects_reply());
    }

    #[test]
    fn tab_commands_carry_only_type() {
        assert_eq!(
            serde_json::to_value(TabCommand::StopPicking).unwrap(),
            json!({ "type": "stopPicking" })
        );
        let parsed: TabCommand = serde_json::from_value(json!({ "type": "startPicking" })).unwrap();
        assert_eq!(parsed, TabCommand::StartPicking);
    }

    #[test]
    fn replies_are_tagged_by_status() {
        assert_eq!(
            serde_json::to_value(Reply::NoPickingActive).unwrap(),
            json!({ "status": "noPickingActive" })
        );
        let failed: Reply = serde_json::from_value(json!({
            "status": "failed",
            "error": "Could not establish connection. Receiving end does not exist."
        }))
        .unwrap();
        assert_eq!(
            failed.error(),
            Some("Could not establish connection. Receiving end does not exist.")
        );
        assert_eq!(failed.status(), "failed");
    }

    #[test]
    fn element_details_use_camel_case_fields() {
        let value = serde_json::to_value(sample_details()).unwrap();
        assert_eq!(value["tagName"], "button");
        assert_eq!(value["outerHTML"], "<button id=\"go\">Go</button>");
        assert_eq!(value["position"]["absoluteLeft"], 10.0);
        assert!(value["computedStyle"].get("backgroundColor").is_some());
        assert_eq!(value["attributes"][0], json!({ "name": "id", "value": "go" }));
    }

    #[test]
    fn element_selected_is_fire_and_forget() {
        let msg = RuntimeMessage::ElementSelected {
            info: Some(sample_details()),
        };
        assert!(!msg.expects_reply());
        assert_eq!(msg.to_string(), "elementSelected(<button>)");
    }

    #[test]
    fn missing_id_serializes_as_null() {
        let mut details = sample_details();
        details.id = None;
        let value = serde_json::to_value(&details).unwrap();
        assert!(value["id"].is_null());
    }
}
