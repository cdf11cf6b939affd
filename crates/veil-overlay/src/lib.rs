#![forbid(unsafe_code)]

//! Overlay lifecycle engine for Veil.
//!
//! Modals, drawers, menus, and disclosure widgets are declared in markup
//! with `data-*` attributes; this crate drives them:
//!
//! - [`OverlayEngine`] sequences show and hide around CSS transitions,
//!   locks rapid repeats, stacks Escape handling, and places focus
//! - [`OverlayHook`] binds a host component's lifecycle to the engine and
//!   keeps state markers alive across re-renders
//! - [`ToggleCommand`] decodes relayed `prompt:toggle` requests
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_core::Document;
//! use veil_overlay::{Outcome, OverlayEngine, OverlayOptions};
//! use veil_style::Stylesheet;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let root = doc.create_element("div");
//! doc.append_child(body, root).unwrap();
//! doc.set_data(root, "prompt", "");
//! let content = doc.create_element("div");
//! doc.append_child(root, content).unwrap();
//! doc.set_data(content, "content", "");
//!
//! let css = "[data-content] { transition-duration: 200ms }";
//! let mut engine = OverlayEngine::new(doc, Stylesheet::parse(css).unwrap());
//! assert_eq!(engine.show(root, &OverlayOptions::new()), Outcome::Showing);
//! engine.advance(Duration::from_millis(200));
//! assert!(engine.is_open(root));
//! ```

pub mod cache;
pub mod command;
pub mod config;
pub mod engine;
pub mod escape;
pub mod focus;
pub mod hook;
pub mod markup;
pub mod options;
pub mod resolve;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod timing;
pub mod visibility;

pub use cache::{AttributeCache, Dataset};
pub use command::{Action, CommandError, TOGGLE_EVENT, ToggleCommand};
pub use config::{DEFAULT_LOCK_DURATION, OverlayConfig};
pub use engine::{Mode, Outcome, OverlayEngine};
pub use escape::EscapeCoordinator;
pub use focus::Focusability;
pub use hook::OverlayHook;
pub use options::{ElementsCallback, OverlayOptions, StatusCallback};
pub use resolve::{Handle, OverlayElements, OverlayTraits, ResolveError};
pub use scheduler::Scheduler;
pub use state::{InstanceArena, InstanceId, InstanceState, Phase, StateFlags};
pub use status::{Checkpoint, OverlayStatus};
