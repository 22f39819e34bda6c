//! Element tree with geometry, resolved style and inspector markers.

use std::{collections::BTreeMap, fmt};

use crate::{
    error::{Error, Result},
    events::{EventKind, Listener, ListenerId, Listeners, Phase},
};

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Border box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// Visual state painted by the inspector. Never part of attributes or markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Highlighted,
    Selected,
}

#[derive(Debug, Clone, Copy, Default)]
struct Markers {
    highlighted: bool,
    selected: bool,
}

impl Markers {
    fn slot(&mut self, marker: Marker) -> &mut bool {
        match marker {
            Marker::Highlighted => &mut self.highlighted,
            Marker::Selected => &mut self.selected,
        }
    }

    fn get(&self, marker: Marker) -> bool {
        match marker {
            Marker::Highlighted => self.highlighted,
            Marker::Selected => self.selected,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) local_name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) rect: Rect,
    pub(crate) resolved: BTreeMap<String, String>,
    pub(crate) inline: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    markers: Markers,
}

/// Elements whose default `display` resolves to `block`.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "html", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// An inspected page: one element tree rooted at `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    nodes: Vec<Node>,
    body: NodeId,
    viewport: Viewport,
    scroll: ScrollOffset,
    listeners: Listeners,
}

impl Document {
    pub fn new(title: impl Into<String>, viewport: Viewport) -> Self {
        let body = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(ElementData {
                local_name: "body".into(),
                attributes: Vec::new(),
                rect: Rect::new(0.0, 0.0, f64::from(viewport.width), f64::from(viewport.height)),
                resolved: BTreeMap::new(),
                inline: BTreeMap::new(),
            }),
            markers: Markers::default(),
        };

        Self {
            title: title.into(),
            nodes: vec![body],
            body: NodeId(0),
            viewport,
            scroll: ScrollOffset::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.scroll = ScrollOffset { x, y };
    }

    // ── Tree construction ───────────────────────────────────────────────────

    /// Create a detached element. Tag names are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            local_name: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            rect: Rect::default(),
            resolved: BTreeMap::new(),
            inline: BTreeMap::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
            markers: Markers::default(),
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.node(child)?;
        if child == self.body {
            return Err(Error::Hierarchy("the body cannot be re-parented".into()));
        }
        if self.contains(child, parent) {
            return Err(Error::Hierarchy(format!(
                "{child} is an ancestor of {parent}"
            )));
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detach `node` (and its subtree) from the tree. The body cannot be removed.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        if node == self.body {
            return Err(Error::Hierarchy("the body cannot be removed".into()));
        }
        self.detach(node);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    pub(crate) fn element(&self, id: NodeId) -> Result<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            NodeKind::Text(_) => Err(Error::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(NodeKind::Text(_)) => Err(Error::NotAnElement(id)),
            None => Err(Error::UnknownNode(id)),
        }
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Inclusive ancestry check: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether `node` is attached to the tree under the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some() && self.contains(self.body, node)
    }

    /// DOM-style `tagName`: uppercase for HTML elements.
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.element(id)
            .ok()
            .map(|e| e.local_name.to_ascii_uppercase())
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.local_name.as_str())
    }

    pub fn get_element_by_id(&self, wanted: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.id(*n) == Some(wanted))
    }

    /// Pre-order traversal including `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.nodes.get(node.0).is_none() {
                continue;
            }
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    // ── Attributes ──────────────────────────────────────────────────────────

    /// Set an attribute, keeping the original position when it already exists.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let element = self.element_mut(node)?;
        match element.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => element.attributes.push((name, value)),
        }
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .ok()?
            .attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in source order.
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        self.element(node)
            .map(|e| e.attributes.as_slice())
            .unwrap_or_default()
    }

    /// The `id` attribute, treating an empty value as absent.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "id").filter(|v| !v.is_empty())
    }

    /// Class tokens in source order with duplicates removed, as `classList` does.
    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for token in self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
        {
            if !out.contains(&token) {
                out.push(token);
            }
        }
        out
    }

    // ── Geometry and style ──────────────────────────────────────────────────

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) -> Result<()> {
        self.element_mut(node)?.rect = rect;
        Ok(())
    }

    /// `getBoundingClientRect()`; detached or non-element nodes have an empty box.
    pub fn bounding_rect(&self, node: NodeId) -> Rect {
        if !self.is_connected(node) {
            return Rect::default();
        }
        self.element(node).map(|e| e.rect).unwrap_or_default()
    }

    /// Record a value resolved by the host style engine (CSS property name).
    pub fn set_resolved_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.element_mut(node)?
            .resolved
            .insert(property.to_ascii_lowercase(), value.into());
        Ok(())
    }

    /// Set or clear an inline style property. Inline values win over resolved ones.
    pub fn set_inline_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let inline = &mut self.element_mut(node)?.inline;
        let property = property.to_ascii_lowercase();
        match value {
            Some(value) => inline.insert(property, value.to_string()),
            None => inline.remove(&property),
        };
        Ok(())
    }

    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)
            .ok()?
            .inline
            .get(&property.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `getComputedStyle(node)[property]`, falling back to initial values.
    pub fn computed_value(&self, node: NodeId, property: &str) -> String {
        let Ok(element) = self.element(node) else {
            return String::new();
        };
        let property = property.to_ascii_lowercase();
        if let Some(value) = element
            .inline
            .get(&property)
            .or_else(|| element.resolved.get(&property))
        {
            return value.clone();
        }

        match property.as_str() {
            "display" if BLOCK_ELEMENTS.contains(&element.local_name.as_str()) => "block".into(),
            "display" => "inline".into(),
            "position" => "static".into(),
            "width" => format_px(element.rect.width),
            "height" => format_px(element.rect.height),
            "background-color" => "rgba(0, 0, 0, 0)".into(),
            "color" => "rgb(0, 0, 0)".into(),
            "font-size" => "16px".into(),
            "pointer-events" | "cursor" => "auto".into(),
            _ => String::new(),
        }
    }

    // ── Markers ─────────────────────────────────────────────────────────────

    pub fn set_marker(&mut self, node: NodeId, marker: Marker, on: bool) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            *n.markers.slot(marker) = on;
        }
    }

    pub fn has_marker(&self, node: NodeId, marker: Marker) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.markers.get(marker))
    }

    /// Every node currently carrying `marker`.
    pub fn marked(&self, marker: Marker) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|n| self.has_marker(*n, marker))
            .collect()
    }

    // ── Hit testing ─────────────────────────────────────────────────────────

    /// Topmost connected element under the viewport point, in paint order.
    ///
    /// Elements with `pointer-events: none` are transparent to the pointer, and
    /// so is their subtree.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.hit_test_in(self.body, x, y)
    }

    fn hit_test_in(&self, node: NodeId, x: f64, y: f64) -> Option<NodeId> {
        let element = self.element(node).ok()?;
        if self.computed_value(node, "pointer-events") == "none" {
            return None;
        }
        let later_sibling_hit = self
            .children(node)
            .iter()
            .rev()
            .find_map(|child| self.hit_test_in(*child, x, y));
        later_sibling_hit.or_else(|| element.rect.contains(x, y).then_some(node))
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    pub fn add_event_listener(
        &mut self,
        kind: EventKind,
        phase: Phase,
        owner: impl Into<String>,
    ) -> ListenerId {
        self.listeners.add(kind, phase, owner.into())
    }

    /// Returns `false` when the listener was not registered.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listeners(&self) -> &[Listener] {
        self.listeners.all()
    }

    pub(crate) fn listeners_plan(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners.plan(kind)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    /// Number of registered listeners for `kind` owned by `owner`.
    pub fn listener_count(&self, kind: EventKind, owner: &str) -> usize {
        self.listeners
            .all()
            .iter()
            .filter(|l| l.kind == kind && l.owner == owner)
            .count()
    }
}

/// Format a pixel length the way resolved style values read (`80px`, `80.5px`).
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}px")
    } else {
        format!("{value}px")
    }
}
