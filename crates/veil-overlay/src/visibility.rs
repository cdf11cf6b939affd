#![forbid(unsafe_code)]

//! Rendered-visibility checks.

use veil_core::{Document, NodeId};
use veil_style::StyleSource;

/// Whether `node` generates a box: connected, and neither it nor any
/// ancestor has `display: none`.
pub fn is_displayed<S: StyleSource + ?Sized>(doc: &Document, styles: &S, node: NodeId) -> bool {
    doc.is_connected(node)
        && std::iter::once(node)
            .chain(doc.ancestors(node))
            .all(|n| !styles.computed_style(doc, n).is_display_none())
}

/// Whether `node` is visible to the user.
///
/// Displayed, not fully transparent, and with a non-empty box when layout
/// has reported a size.
pub fn is_visible<S: StyleSource + ?Sized>(doc: &Document, styles: &S, node: NodeId) -> bool {
    if !is_displayed(doc, styles, node) {
        return false;
    }
    if styles.computed_style(doc, node).opacity() == 0.0 {
        return false;
    }
    doc.size(node).is_none_or(|size| !size.is_empty())
}
