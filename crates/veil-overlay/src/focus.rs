#![forbid(unsafe_code)]

//! Focus placement on open and close.
//!
//! # Invariants
//!
//! - Candidates are ordered by effective tab index ascending, ties broken by
//!   document order (stable sort over a pre-order walk).
//! - `tabindex="-1"` elements are never candidates.
//! - Candidates are displayed and outside any `aria-hidden="true"` subtree of
//!   the content.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad `data-focusfirst` | Selector does not parse | `warn!`, falls through to the focus-first policy |
//! | No candidates | Content has nothing focusable | Content element itself is focused |
//! | Detached target | Element removed mid-transition | `Document::focus` refuses; focus unchanged |

use tracing::warn;
use veil_core::{Document, NodeId, Selector};
use veil_style::StyleSource;

use crate::resolve::OverlayElements;
use crate::visibility::is_displayed;

/// Which elements count as focusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focusability {
    /// Interactive elements and positive tab indices only.
    #[default]
    Strict,
    /// Also `tabindex="0"` elements, as menus use for their items.
    Relaxed,
}

impl Focusability {
    /// Mode for an overlay: relaxed for menus.
    pub fn for_overlay(elements: &OverlayElements) -> Self {
        if elements.is_menu() {
            Self::Relaxed
        } else {
            Self::Strict
        }
    }
}

/// Explicit `tabindex`, if present and numeric.
pub fn tab_index(doc: &Document, node: NodeId) -> Option<i32> {
    doc.attribute(node, "tabindex")?.trim().parse().ok()
}

fn is_aria_hidden(doc: &Document, node: NodeId) -> bool {
    doc.attribute(node, "aria-hidden") == Some("true")
}

/// Whether `node` itself can take focus under `mode`.
///
/// Rendering is not checked here; see [`focusable_candidates`].
pub fn is_focusable(doc: &Document, node: NodeId, mode: Focusability) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    let tabindex = tab_index(doc, node);
    if tabindex.is_some_and(|t| t < 0) {
        return false;
    }
    let interactive = match tag {
        "a" => doc.has_attribute(node, "href") && doc.attribute(node, "rel") != Some("ignore"),
        "area" => doc.has_attribute(node, "href"),
        "input" => {
            !doc.has_attribute(node, "disabled") && doc.attribute(node, "type") != Some("hidden")
        }
        "button" | "select" | "textarea" => !doc.has_attribute(node, "disabled"),
        "iframe" => true,
        _ => false,
    };
    interactive
        || tabindex.is_some_and(|t| t > 0)
        || (mode == Focusability::Relaxed && tabindex == Some(0) && !is_aria_hidden(doc, node))
}

/// Focusable elements inside `container`, in focus order.
pub fn focusable_candidates<S: StyleSource + ?Sized>(
    doc: &Document,
    styles: &S,
    container: NodeId,
    mode: Focusability,
) -> Vec<NodeId> {
    let mut candidates: Vec<(i32, NodeId)> = doc
        .descendants(container)
        .filter(|&node| is_focusable(doc, node, mode))
        .filter(|&node| {
            !std::iter::once(node)
                .chain(doc.ancestors(node).take_while(|&a| a != container))
                .any(|n| is_aria_hidden(doc, n))
        })
        .filter(|&node| is_displayed(doc, styles, node))
        .map(|node| (tab_index(doc, node).unwrap_or(0), node))
        .collect();
    // Positive tab indices first, ascending; then everything at 0.
    candidates.sort_by_key(|&(index, _)| if index > 0 { index } else { i32::MAX });
    candidates.into_iter().map(|(_, node)| node).collect()
}

/// First focusable element inside `container`.
pub fn first_focusable<S: StyleSource + ?Sized>(
    doc: &Document,
    styles: &S,
    container: NodeId,
    mode: Focusability,
) -> Option<NodeId> {
    focusable_candidates(doc, styles, container, mode)
        .into_iter()
        .next()
}

/// Place focus after an overlay finished opening.
///
/// Returns the element that received focus, if any.
pub fn apply_open_focus<S: StyleSource + ?Sized>(
    doc: &mut Document,
    styles: &S,
    elements: &OverlayElements,
) -> Option<NodeId> {
    if let Some(text) = &elements.focus_first_selector {
        match Selector::parse(text) {
            Ok(selector) => {
                if let Some(target) = doc.query_selector(elements.content, &selector)
                    && doc.focus(target)
                {
                    return Some(target);
                }
            }
            Err(err) => warn!(selector = %text, %err, "invalid data-focusfirst selector"),
        }
    }
    if !elements.is_focus_first() {
        return None;
    }
    focus_first_in(doc, styles, elements)
}

/// Focus the first focusable element of an overlay, else its content.
pub fn focus_first_in<S: StyleSource + ?Sized>(
    doc: &mut Document,
    styles: &S,
    elements: &OverlayElements,
) -> Option<NodeId> {
    let target = first_focusable(doc, styles, elements.content, Focusability::for_overlay(elements))
        .unwrap_or(elements.content);
    doc.focus(target).then_some(target)
}
