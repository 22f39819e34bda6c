//! Element detail extraction.

use {
    picker_config::InspectorConfig,
    picker_page::{Document, NodeId, truncate_chars},
    picker_protocol::{
        Attribute, ComputedStyleSubset, ElementDetails, OUTER_HTML_LIMIT, Position,
        TEXT_CONTENT_LIMIT,
    },
    tracing::debug,
};

/// Truncation limits, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub text_limit: usize,
    pub markup_limit: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            text_limit: TEXT_CONTENT_LIMIT,
            markup_limit: OUTER_HTML_LIMIT,
        }
    }
}

impl From<&InspectorConfig> for ExtractLimits {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            text_limit: config.text_limit,
            markup_limit: config.markup_limit,
        }
    }
}

/// Snapshot `node` into an [`ElementDetails`].
///
/// Returns `None` for an absent node, a text node, or an element that is no
/// longer attached to the page.
pub fn extract_details(
    doc: &Document,
    node: Option<NodeId>,
    limits: &ExtractLimits,
) -> Option<ElementDetails> {
    let node = node?;
    if !doc.is_connected(node) {
        debug!(%node, "skipping extraction of detached node");
        return None;
    }
    let tag_name = doc.tag_name(node)?.to_ascii_lowercase();

    let rect = doc.bounding_rect(node);
    let scroll = doc.scroll();
    let text = doc.text_content(node);
    let markup = doc.outer_html(node);

    let details = ElementDetails {
        tag_name,
        id: doc.id(node).map(str::to_string),
        classes: doc.class_list(node).into_iter().map(str::to_string).collect(),
        attributes: doc
            .attributes(node)
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: value.clone(),
            })
            .collect(),
        text_content: truncate_chars(text.trim(), limits.text_limit).to_string(),
        outer_html: truncate_chars(&markup, limits.markup_limit).to_string(),
        position: Position {
            left: rect.left(),
            top: rect.top(),
            width: rect.width,
            height: rect.height,
            x: rect.x,
            y: rect.y,
            absolute_left: rect.left() + scroll.x,
            absolute_top: rect.top() + scroll.y,
        },
        computed_style: ComputedStyleSubset {
            display: doc.computed_value(node, "display"),
            position: doc.computed_value(node, "position"),
            width: doc.computed_value(node, "width"),
            height: doc.computed_value(node, "height"),
            background_color: doc.computed_value(node, "background-color"),
            color: doc.computed_value(node, "color"),
            font_size: doc.computed_value(node, "font-size"),
        },
    };

    debug!(
        tag = %details.tag_name,
        id = details.id.as_deref().unwrap_or(""),
        "extracted element details"
    );
    Some(details)
}
