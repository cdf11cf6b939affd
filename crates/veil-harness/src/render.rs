#![forbid(unsafe_code)]

//! Deterministic markup text for snapshots.
//!
//! Attributes print in name order, inline style as one sorted `style`
//! attribute, children indented by two spaces. The focused element is
//! flagged with a trailing `*`.

use std::fmt::Write as _;

use veil_core::{Document, NodeId};

/// Render `node` and its subtree.
pub fn render_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    render_into(doc, node, 0, &mut out);
    out
}

fn render_into(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
    let Some(tag) = doc.tag(node) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}<{tag}");
    if let Some(attributes) = doc.attributes(node) {
        for (name, value) in attributes {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{value}\"");
            }
        }
    }
    if let Some(style) = doc.inline_style(node).filter(|s| !s.is_empty()) {
        let text: Vec<String> = style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        let _ = write!(out, " style=\"{}\"", text.join("; "));
    }
    out.push('>');
    if doc.active_element() == Some(node) {
        out.push('*');
    }

    let children = doc.children(node);
    if children.is_empty() {
        let _ = writeln!(out, "</{tag}>");
        return;
    }
    out.push('\n');
    for &child in children {
        render_into(doc, child, depth + 1, out);
    }
    let _ = writeln!(out, "{indent}</{tag}>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_markup() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.set_attribute(div, "id", "x");
        doc.set_data(div, "prompt", "");
        let button = doc.create_element("button");
        doc.append_child(div, button).unwrap();
        doc.set_style_property(button, "opacity", "0");
        doc.focus(button);

        let text = render_markup(&doc, div);
        assert_eq!(
            text,
            "<div data-prompt id=\"x\">\n  <button style=\"opacity: 0\">*</button>\n</div>\n"
        );
    }
}
