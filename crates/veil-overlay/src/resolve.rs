#![forbid(unsafe_code)]

//! Element resolution.
//!
//! Turns a [`Handle`] into the full set of elements and behavior traits that
//! make up one overlay. Resolution is a pure query over the document and is
//! repeated on every operation, so markup changes between calls are picked
//! up without any cache to invalidate.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid selector | Handle text does not parse | `ResolveError::InvalidSelector` |
//! | No root | Nothing matches, or the match has no enclosing root | `ResolveError::RootNotFound` |
//! | Unbound | `Handle::Bound` before the hook has an element | `ResolveError::Unbound` |
//! | No content | Root without a `[data-content]` descendant | `ResolveError::ContentNotFound` |

use std::fmt;

use bitflags::bitflags;
use veil_core::{Document, NodeId, Selector, SelectorError};

use crate::markup::{self, FOCUS_FIRST, IS_ESCAPABLE, IS_FOCUS_FIRST, IS_MODAL};

/// How an operation names its overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Handle {
    /// The element bound to the hook.
    #[default]
    Bound,
    /// First element matching a selector.
    Selector(String),
    /// A specific element.
    Node(NodeId),
}

impl From<&str> for Handle {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for Handle {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<NodeId> for Handle {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound => f.write_str("<bound>"),
            Self::Selector(s) => f.write_str(s),
            Self::Node(n) => write!(f, "{n}"),
        }
    }
}

bitflags! {
    /// Behavior traits read from the root's markup.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OverlayTraits: u8 {
        /// Outside clicks do not close.
        const MODAL = 0b0000_0001;
        /// Responds to Escape.
        const ESCAPABLE = 0b0000_0010;
        /// Focus the first focusable element on open.
        const FOCUS_FIRST = 0b0000_0100;
        /// Root is a `<details>` element.
        const DETAILS = 0b0000_1000;
        /// Content is a `<dialog>` element.
        const DIALOG = 0b0001_0000;
        /// Content has `role="menu"`; relaxed focusability applies.
        const MENU = 0b0010_0000;
    }
}

/// Everything one overlay is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayElements {
    pub root: NodeId,
    pub content: NodeId,
    pub touch_layer: Option<NodeId>,
    pub backdrop_layer: Option<NodeId>,
    pub toggle: Option<NodeId>,
    pub traits: OverlayTraits,
    pub focus_first_selector: Option<String>,
}

impl OverlayElements {
    #[inline]
    pub fn is_modal(&self) -> bool {
        self.traits.contains(OverlayTraits::MODAL)
    }

    #[inline]
    pub fn is_escapable(&self) -> bool {
        self.traits.contains(OverlayTraits::ESCAPABLE)
    }

    #[inline]
    pub fn is_focus_first(&self) -> bool {
        self.traits.contains(OverlayTraits::FOCUS_FIRST)
    }

    #[inline]
    pub fn is_details(&self) -> bool {
        self.traits.contains(OverlayTraits::DETAILS)
    }

    #[inline]
    pub fn is_dialog(&self) -> bool {
        self.traits.contains(OverlayTraits::DIALOG)
    }

    #[inline]
    pub fn is_menu(&self) -> bool {
        self.traits.contains(OverlayTraits::MENU)
    }
}

/// Why a handle could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The handle's selector text did not parse.
    InvalidSelector {
        selector: String,
        source: SelectorError,
    },
    /// No overlay root for the handle.
    RootNotFound { handle: String },
    /// `Handle::Bound` used before the hook was bound to an element.
    Unbound,
    /// The root has no content element.
    ContentNotFound { root: NodeId },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelector { selector, source } => {
                write!(f, "invalid overlay selector {selector:?}: {source}")
            }
            Self::RootNotFound { handle } => {
                write!(f, "no {} element for {handle}", markup::ROOT_SELECTOR)
            }
            Self::Unbound => f.write_str("hook is not bound to an element"),
            Self::ContentNotFound { root } => {
                write!(f, "overlay {root} has no {} element", markup::CONTENT_SELECTOR)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSelector { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolve a handle to its overlay elements.
///
/// `bound` is the hook's element, consulted only for [`Handle::Bound`].
pub fn resolve(
    doc: &Document,
    handle: &Handle,
    bound: Option<NodeId>,
) -> Result<OverlayElements, ResolveError> {
    let root = find_root(doc, handle, bound)?;
    elements_for_root(doc, root)
}

/// Find the overlay root a handle refers to.
pub fn find_root(
    doc: &Document,
    handle: &Handle,
    bound: Option<NodeId>,
) -> Result<NodeId, ResolveError> {
    let root_selector = &markup::selectors().root;
    let start = match handle {
        Handle::Bound => bound.ok_or(ResolveError::Unbound)?,
        Handle::Node(node) => *node,
        Handle::Selector(text) => {
            let selector = Selector::parse(text).map_err(|source| {
                ResolveError::InvalidSelector {
                    selector: text.clone(),
                    source,
                }
            })?;
            doc.query_selector(doc.body(), &selector)
                .ok_or_else(|| ResolveError::RootNotFound {
                    handle: text.clone(),
                })?
        }
    };
    doc.closest(start, root_selector)
        .ok_or_else(|| ResolveError::RootNotFound {
            handle: handle.to_string(),
        })
}

/// Collect the parts and traits of the overlay rooted at `root`.
pub fn elements_for_root(doc: &Document, root: NodeId) -> Result<OverlayElements, ResolveError> {
    let sel = markup::selectors();
    let content = doc
        .query_selector(root, &sel.content)
        .ok_or(ResolveError::ContentNotFound { root })?;

    let mut traits = OverlayTraits::empty();
    traits.set(OverlayTraits::MODAL, doc.has_data(root, IS_MODAL));
    traits.set(OverlayTraits::ESCAPABLE, is_escapable(doc, root));
    traits.set(OverlayTraits::FOCUS_FIRST, doc.has_data(root, IS_FOCUS_FIRST));
    traits.set(OverlayTraits::DETAILS, doc.is_tag(root, "details"));
    traits.set(OverlayTraits::DIALOG, doc.is_tag(content, "dialog"));
    traits.set(
        OverlayTraits::MENU,
        doc.attribute(content, "role") == Some("menu"),
    );

    let focus_first_selector = doc
        .data(root, FOCUS_FIRST)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    Ok(OverlayElements {
        root,
        content,
        touch_layer: doc.query_selector(root, &sel.touch),
        backdrop_layer: doc.query_selector(root, &sel.backdrop),
        toggle: doc
            .query_selector(root, &sel.toggle)
            .or_else(|| doc.query_selector(root, &sel.summary)),
        traits,
        focus_first_selector,
    })
}

/// Escape applies unless the root opts out with `data-isescapable="false"`.
pub fn is_escapable(doc: &Document, root: NodeId) -> bool {
    doc.data(root, IS_ESCAPABLE)
        .is_none_or(|v| !v.trim().eq_ignore_ascii_case("false"))
}
