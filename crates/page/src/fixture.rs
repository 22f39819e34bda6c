//! Page fixtures: serialized documents loaded from JSON or TOML.
//!
//! A fixture captures what the host browser would have resolved for a page
//! (element boxes and resolved style values) so the inspector can be driven
//! without a live browser.

use std::{collections::BTreeMap, path::Path};

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{
    document::{Document, NodeId, Rect, ScrollOffset, Viewport},
    error::{Context, Error, Result},
    events::{EventKind, Phase},
};

/// Root of a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureDocument {
    pub title: String,
    pub viewport: Viewport,
    pub scroll: ScrollOffset,
    /// Page scripts listening on the document, registered in the bubble phase.
    pub listeners: Vec<FixtureListener>,
    /// Children of `<body>`.
    pub body: Vec<FixtureNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureListener {
    /// DOM event type (`click`, `mousemove`, `mouseleave`).
    pub event: String,
    pub owner: String,
}

/// One element. `text`, when present, becomes the first child text node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureNode {
    pub tag: String,
    /// `[name, value]` pairs in source order.
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub rect: Option<Rect>,
    /// Resolved style values keyed by CSS property name (`background-color`).
    pub style: BTreeMap<String, String>,
    /// Inline `style` declarations keyed by CSS property name.
    pub inline_style: BTreeMap<String, String>,
    pub children: Vec<FixtureNode>,
}

impl Document {
    /// Build a document from a parsed fixture.
    pub fn from_fixture(fixture: &FixtureDocument) -> Result<Self> {
        let viewport = if fixture.viewport == Viewport::default() {
            Viewport {
                width: 1280,
                height: 720,
            }
        } else {
            fixture.viewport
        };

        let mut doc = Document::new(fixture.title.clone(), viewport);
        doc.set_scroll(fixture.scroll.x, fixture.scroll.y);

        for listener in &fixture.listeners {
            let kind = EventKind::from_name(&listener.event).ok_or_else(|| {
                Error::message(format!("unknown event type '{}'", listener.event))
            })?;
            doc.add_event_listener(kind, Phase::Bubble, listener.owner.clone());
        }

        let body = doc.body();
        for node in &fixture.body {
            doc.build_fixture_node(body, node)?;
        }
        Ok(doc)
    }

    fn build_fixture_node(&mut self, parent: NodeId, node: &FixtureNode) -> Result<NodeId> {
        if node.tag.trim().is_empty() {
            return Err(Error::message("fixture element is missing a tag"));
        }

        let element = self.create_element(node.tag.trim());
        for (name, value) in &node.attributes {
            self.set_attribute(element, name, value.clone())?;
        }
        if let Some(rect) = node.rect {
            self.set_rect(element, rect)?;
        }
        for (property, value) in &node.style {
            self.set_resolved_style(element, property, value.clone())?;
        }
        for (property, value) in &node.inline_style {
            self.set_inline_style(element, property, Some(value.as_str()))?;
        }
        self.append_child(parent, element)?;

        if let Some(text) = &node.text {
            let text = self.create_text(text.clone());
            self.append_child(element, text)?;
        }
        for child in &node.children {
            self.build_fixture_node(element, child)?;
        }
        Ok(element)
    }
}

/// Load a fixture file. The format follows the extension (`.json` or `.toml`).
pub fn load_fixture(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;

    let fixture: FixtureDocument = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)?,
        Some("toml") => toml::from_str(&raw)?,
        other => {
            return Err(Error::message(format!(
                "unsupported fixture format: {}",
                other.unwrap_or("<none>")
            )));
        },
    };

    debug!(path = %path.display(), title = %fixture.title, "loaded page fixture");
    Document::from_fixture(&fixture)
}
