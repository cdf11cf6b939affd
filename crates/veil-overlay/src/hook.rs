#![forbid(unsafe_code)]

//! Framework-facing lifecycle hook.
//!
//! A host framework creates one `OverlayHook` per mounted overlay element and
//! forwards its component lifecycle:
//!
//! | Host event | Hook call | Effect |
//! |------------|-----------|--------|
//! | mount | [`OverlayHook::mounted`] | Initialize, register listeners, sync `<details open>` |
//! | before patch | [`OverlayHook::before_update`] | Snapshot the data attributes |
//! | after patch | [`OverlayHook::updated`] | Restore the snapshot, drop it, re-initialize, re-sync markers |
//! | unmount | [`OverlayHook::destroyed`] | Drop any snapshot and release the instance |
//!
//! Options given to the hook, and to each call, persist on the hook; later
//! calls override individual fields.

use veil_core::NodeId;
use veil_style::StyleSource;

use crate::engine::{Mode, Outcome, OverlayEngine};
use crate::options::OverlayOptions;
use crate::resolve::Handle;

/// Per-element binding between a host component and the engine.
#[derive(Debug, Clone, Default)]
pub struct OverlayHook {
    pub(crate) el: Option<NodeId>,
    pub(crate) options: OverlayOptions,
}

impl OverlayHook {
    /// Hook bound to `el`.
    pub fn new(el: NodeId) -> Self {
        Self {
            el: Some(el),
            options: OverlayOptions::default(),
        }
    }

    /// Set the hook's stored options.
    #[must_use]
    pub fn with_options(mut self, options: OverlayOptions) -> Self {
        self.options = options.persistent();
        self
    }

    /// Bound element, if any.
    #[inline]
    pub fn el(&self) -> Option<NodeId> {
        self.el
    }

    #[inline]
    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    // --- Host lifecycle ---

    pub fn mounted<S: StyleSource>(&mut self, engine: &mut OverlayEngine<S>) -> Outcome {
        engine.run(self, &Handle::Bound, &OverlayOptions::default(), None)
    }

    /// Returns whether a snapshot was stored.
    pub fn before_update<S: StyleSource>(&self, engine: &mut OverlayEngine<S>) -> bool {
        self.el.is_some_and(|el| engine.snapshot_dataset(el))
    }

    /// Returns whether a snapshot was restored.
    ///
    /// Re-initializes afterwards so patched-in toggle or touch nodes get
    /// their listeners.
    pub fn updated<S: StyleSource>(&mut self, engine: &mut OverlayEngine<S>) -> bool {
        let Some(el) = self.el else {
            return false;
        };
        let restored = engine.restore_dataset(el);
        engine.discard_dataset(el);
        engine.run(self, &Handle::Bound, &OverlayOptions::default(), None);
        engine.sync_markers(el);
        restored
    }

    pub fn destroyed<S: StyleSource>(&mut self, engine: &mut OverlayEngine<S>) {
        if let Some(el) = self.el {
            engine.discard_dataset(el);
            engine.release(el);
        }
    }

    // --- Commands ---

    /// Initialize without a transition.
    pub fn init<S: StyleSource>(
        &mut self,
        engine: &mut OverlayEngine<S>,
        handle: impl Into<Handle>,
        options: &OverlayOptions,
    ) -> Outcome {
        engine.run(self, &handle.into(), options, None)
    }

    pub fn show<S: StyleSource>(
        &mut self,
        engine: &mut OverlayEngine<S>,
        handle: impl Into<Handle>,
        options: &OverlayOptions,
    ) -> Outcome {
        engine.run(self, &handle.into(), options, Some(Mode::Show))
    }

    pub fn hide<S: StyleSource>(
        &mut self,
        engine: &mut OverlayEngine<S>,
        handle: impl Into<Handle>,
        options: &OverlayOptions,
    ) -> Outcome {
        engine.run(self, &handle.into(), options, Some(Mode::Hide))
    }

    pub fn toggle<S: StyleSource>(
        &mut self,
        engine: &mut OverlayEngine<S>,
        handle: impl Into<Handle>,
        options: &OverlayOptions,
    ) -> Outcome {
        engine.run(self, &handle.into(), options, Some(Mode::Toggle))
    }
}
