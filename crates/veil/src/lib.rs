#![forbid(unsafe_code)]

//! Veil: declarative overlays driven by `data-*` markup.
//!
//! This crate re-exports the workspace crates under one name:
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`core`] | `veil-core` | Document tree, selectors, input events |
//! | [`style`] | `veil-style` | Stylesheet cascade, computed style |
//! | [`overlay`] | `veil-overlay` | Lifecycle engine, hook, toggle commands |
//! | `harness` | `veil-harness` | Fixtures and snapshots (feature `harness`) |
//!
//! Most hosts only need the [`prelude`].

pub use veil_core as core;
#[cfg(feature = "harness")]
pub use veil_harness as harness;
pub use veil_overlay as overlay;
pub use veil_style as style;

pub use veil_core::{Document, Event, EventOutcome, Key, NodeId};
pub use veil_overlay::{
    Checkpoint, Handle, Outcome, OverlayConfig, OverlayEngine, OverlayHook, OverlayOptions,
    OverlayStatus, Phase, ToggleCommand,
};
pub use veil_style::Stylesheet;

pub mod prelude {
    pub use crate::{
        Checkpoint, Document, Event, EventOutcome, Handle, Key, NodeId, Outcome, OverlayConfig,
        OverlayEngine, OverlayHook, OverlayOptions, OverlayStatus, Phase, Stylesheet,
        ToggleCommand,
    };
}
