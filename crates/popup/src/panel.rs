//! Info panel markup.

use picker_protocol::ElementDetails;

pub const PICKING_PROMPT: &str = "Click an element on the page...";
pub const PICKING_STOPPED: &str = "Picking mode stopped.";
pub const START_FAILED: &str = "Failed to start picking mode.";
pub const STOP_FAILED: &str = "Failed to stop picking mode.";
pub const INFO_UNAVAILABLE: &str = "Element information unavailable.";

/// Escape the five XML-significant characters in one pass.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_message(message: &str) -> String {
    format!("<p>{}</p>", escape_html(message))
}

pub fn render_error(message: &str) -> String {
    format!("<p style=\"color: red;\">{}</p>", escape_html(message))
}

/// Whole pixels, as the panel shows them.
fn px(value: f64) -> i64 {
    value.round() as i64
}

/// Render the panel for a selection. Strings that come from the page are
/// escaped; computed style values and numbers are inserted as they are.
pub fn render_details(info: Option<&ElementDetails>) -> String {
    let Some(info) = info else {
        return render_message(INFO_UNAVAILABLE);
    };

    let mut html = String::new();
    html.push_str(&format!(
        "<p><strong>Tag:</strong> &lt;{}&gt;</p>\n",
        escape_html(&info.tag_name)
    ));
    if let Some(id) = info.id.as_deref().filter(|id| !id.is_empty()) {
        html.push_str(&format!("<p><strong>ID:</strong> {}</p>\n", escape_html(id)));
    }
    if !info.classes.is_empty() {
        html.push_str(&format!(
            "<p><strong>Classes:</strong> {}</p>\n",
            escape_html(&info.classes.join(", "))
        ));
    }

    let pos = &info.position;
    html.push_str(&format!(
        "<p><strong>Size:</strong> {}px x {}px</p>\n",
        px(pos.width),
        px(pos.height)
    ));
    html.push_str(&format!(
        "<p><strong>Position (viewport):</strong> X:{} Y:{}</p>\n",
        px(pos.left),
        px(pos.top)
    ));
    html.push_str(&format!(
        "<p><strong>Position (document):</strong> X:{} Y:{}</p>\n",
        px(pos.absolute_left),
        px(pos.absolute_top)
    ));
    html.push_str(&format!(
        "<p><strong>Text content (truncated):</strong> <pre>{}</pre></p>\n",
        escape_html(&info.text_content)
    ));
    html.push_str(&format!(
        "<p><strong>Partial HTML:</strong> <pre>{}</pre></p>\n",
        escape_html(&info.outer_html)
    ));

    let style = &info.computed_style;
    html.push_str("<p><strong>Computed style (partial):</strong></p>\n<ul>\n");
    for (name, value) in [
        ("Display", &style.display),
        ("Position", &style.position),
        ("Font Size", &style.font_size),
        ("Background", &style.background_color),
        ("Color", &style.color),
    ] {
        html.push_str(&format!("    <li>{name}: {value}</li>\n"));
    }
    html.push_str("</ul>\n");
    html
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        picker_protocol::{Attribute, ComputedStyleSubset, Position},
    };

    fn button() -> ElementDetails {
        ElementDetails {
            tag_name: "button".into(),
            id: Some("go".into()),
            classes: vec!["btn".into(), "primary".into()],
            attributes: vec![Attribute {
                name: "id".into(),
                value: "go".into(),
            }],
            text_content: "Go".into(),
            outer_html: "<button id=\"go\" class=\"btn primary\">Go</button>".into(),
            position: Position {
                left: 10.0,
                top: 20.0,
                width: 80.0,
                height: 30.0,
                x: 10.0,
                y: 20.0,
                absolute_left: 10.0,
                absolute_top: 120.4,
            },
            computed_style: ComputedStyleSubset {
                display: "inline-block".into(),
                position: "static".into(),
                width: "80px".into(),
                height: "30px".into(),
                background_color: "rgb(0, 0, 255)".into(),
                color: "rgb(255, 255, 255)".into(),
                font_size: "13.33px".into(),
            },
        }
    }

    #[test]
    fn escapes_the_five_characters() {
        assert_eq!(escape_html("<img src=x>"), "&lt;img src=x&gt;");
        assert_eq!(
            escape_html(r#"a & b "c" 'd'"#),
            "a &amp; b &quot;c&quot; &#039;d&#039;"
        );
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn renders_identity_size_and_style() {
        let html = render_details(Some(&button()));
        assert!(html.contains("&lt;button&gt;"));
        assert!(html.contains("<strong>ID:</strong> go"));
        assert!(html.contains("btn, primary"));
        assert!(html.contains("80px x 30px"));
        assert!(html.contains("X:10 Y:20"));
        assert!(html.contains("X:10 Y:120"));
        assert!(html.contains("<li>Font Size: 13.33px</li>"));
        assert!(html.contains("<li>Background: rgb(0, 0, 255)</li>"));
    }

    #[test]
    fn page_strings_are_escaped() {
        let mut info = button();
        info.id = Some("<b>".into());
        info.classes = vec!["a\"b".into()];
        info.text_content = "<script>alert('x')</script>".into();
        let html = render_details(Some(&info));

        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("a&quot;b"));
        assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
        assert!(html.contains("&lt;button id=&quot;go&quot;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn optional_lines_are_skipped() {
        let mut info = button();
        info.id = None;
        info.classes.clear();
        let html = render_details(Some(&info));
        assert!(!html.contains("ID:"));
        assert!(!html.contains("Classes:"));
    }

    #[test]
    fn absent_details_render_unavailable() {
        assert_eq!(
            render_details(None),
            "<p>Element information unavailable.</p>"
        );
    }

    #[test]
    fn errors_are_red_and_escaped() {
        assert_eq!(
            render_error("Communication error: <gone>"),
            "<p style=\"color: red;\">Communication error: &lt;gone&gt;</p>"
        );
    }
}
