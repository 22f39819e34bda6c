//! Floating label that follows the pointer while picking.

use picker_page::{Document, NodeId, Result, format_px};

/// The label's element lives in the page; it never receives pointer events.
#[derive(Debug, Clone)]
pub struct FloatingLabel {
    node: NodeId,
    offset: f64,
}

impl FloatingLabel {
    /// Create the (hidden) label element at the end of the body.
    pub fn attach(doc: &mut Document, offset: f64) -> Result<Self> {
        let node = doc.create_element("div");
        for (property, value) in [
            ("position", "fixed"),
            ("background", "rgba(0, 0, 0, 0.7)"),
            ("color", "white"),
            ("padding", "5px 10px"),
            ("font-size", "12px"),
            ("z-index", "999999"),
            ("pointer-events", "none"),
            ("border-radius", "3px"),
            ("display", "none"),
        ] {
            doc.set_inline_style(node, property, Some(value))?;
        }
        doc.append_child(doc.body(), node)?;
        Ok(Self { node, offset })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether `node` is the label or inside it.
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(self.node, node)
    }

    pub fn is_visible(&self, doc: &Document) -> bool {
        doc.is_connected(self.node) && doc.computed_value(self.node, "display") != "none"
    }

    /// Describe `target` next to the pointer at (`pointer_x`, `pointer_y`).
    pub fn show(
        &self,
        doc: &mut Document,
        target: NodeId,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Result<()> {
        let Some(tag) = doc.local_name(target).map(str::to_string) else {
            return self.hide(doc);
        };
        let id = doc
            .id(target)
            .map(|id| format!("#{id}"))
            .unwrap_or_default();
        let rect = doc.bounding_rect(target);

        let lines = [
            format!("<{tag}{id}>"),
            format!("W: {}px, H: {}px", rect.width.round(), rect.height.round()),
            format!("X: {}px, Y: {}px", rect.left().round(), rect.top().round()),
        ];
        self.set_lines(doc, &lines)?;

        let left = format_px(pointer_x + self.offset);
        let top = format_px(pointer_y + self.offset);
        doc.set_inline_style(self.node, "left", Some(left.as_str()))?;
        doc.set_inline_style(self.node, "top", Some(top.as_str()))?;
        doc.set_inline_style(self.node, "display", Some("block"))
    }

    pub fn hide(&self, doc: &mut Document) -> Result<()> {
        doc.set_inline_style(self.node, "display", Some("none"))
    }

    /// Current label text, one entry per line.
    pub fn lines(&self, doc: &Document) -> Vec<String> {
        doc.children(self.node)
            .iter()
            .filter(|child| !doc.is_element(**child))
            .map(|child| doc.text_content(*child))
            .collect()
    }

    fn set_lines(&self, doc: &mut Document, lines: &[String]) -> Result<()> {
        for child in doc.children(self.node).to_vec() {
            doc.remove(child)?;
        }
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                let br = doc.create_element("br");
                doc.append_child(self.node, br)?;
            }
            let text = doc.create_text(line.clone());
            doc.append_child(self.node, text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        picker_page::{Rect, Viewport},
    };

    #[test]
    fn shows_rounded_geometry_near_pointer() {
        let mut doc = Document::new("label", Viewport {
            width: 800,
            height: 600,
        });
        let button = doc.create_element("button");
        doc.set_attribute(button, "id", "go").unwrap();
        doc.set_rect(button, Rect::new(10.4, 19.6, 80.5, 29.4)).unwrap();
        doc.append_child(doc.body(), button).unwrap();

        let label = FloatingLabel::attach(&mut doc, 10.0).unwrap();
        assert!(!label.is_visible(&doc));

        label.show(&mut doc, button, 15.0, 25.0).unwrap();
        assert!(label.is_visible(&doc));
        assert_eq!(label.lines(&doc), [
            "<button#go>",
            "W: 81px, H: 29px",
            "X: 10px, Y: 20px"
        ]);
        assert_eq!(doc.inline_style(label.node(), "left"), Some("25px"));
        assert_eq!(doc.inline_style(label.node(), "top"), Some("35px"));

        label.hide(&mut doc).unwrap();
        assert!(!label.is_visible(&doc));
    }

    #[test]
    fn label_is_transparent_to_hit_testing() {
        let mut doc = Document::new("label", Viewport {
            width: 800,
            height: 600,
        });
        let label = FloatingLabel::attach(&mut doc, 10.0).unwrap();
        doc.set_rect(label.node(), Rect::new(0.0, 0.0, 100.0, 40.0))
            .unwrap();
        assert_eq!(doc.hit_test(5.0, 5.0), Some(doc.body()));
        assert!(label.contains(&doc, label.node()));
    }

    #[test]
    fn lines_replace_previous_content() {
        let mut doc = Document::new("label", Viewport {
            width: 800,
            height: 600,
        });
        let a = doc.create_element("a");
        doc.append_child(doc.body(), a).unwrap();
        let p = doc.create_element("p");
        doc.append_child(doc.body(), p).unwrap();

        let label = FloatingLabel::attach(&mut doc, 10.0).unwrap();
        label.show(&mut doc, a, 0.0, 0.0).unwrap();
        label.show(&mut doc, p, 0.0, 0.0).unwrap();
        assert_eq!(label.lines(&doc)[0], "<p>");
        assert_eq!(label.lines(&doc).len(), 3);
    }
}
