#![forbid(unsafe_code)]

//! Escape-key stacking.
//!
//! There is one Escape listener per engine regardless of how many overlays
//! exist. Which overlay it closes is decided at key time from the document:
//! the stack is every open, escapable root in document order, and the last
//! one is on top. Nothing is stored, so the stack cannot drift from the
//! markup.

use veil_core::{Document, NodeId};

use crate::resolve::is_escapable;
use crate::state::{InstanceArena, InstanceId};

/// The engine's single Escape listener.
#[derive(Debug, Default)]
pub struct EscapeCoordinator {
    attached: bool,
}

impl EscapeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the listener. Returns `true` only on the first call.
    pub fn attach(&mut self) -> bool {
        !std::mem::replace(&mut self.attached, true)
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Open, escapable instances in document order; the last is top-most.
pub fn escape_stack(doc: &Document, instances: &InstanceArena) -> Vec<(InstanceId, NodeId)> {
    if instances.is_empty() {
        return Vec::new();
    }
    doc.descendants(doc.body())
        .filter_map(|node| {
            let id = instances.id_for(node)?;
            let state = instances.get(id)?;
            (state.is_open() && is_escapable(doc, node)).then_some((id, node))
        })
        .collect()
}

/// The instance Escape would close.
pub fn top_most(doc: &Document, instances: &InstanceArena) -> Option<(InstanceId, NodeId)> {
    escape_stack(doc, instances).pop()
}
