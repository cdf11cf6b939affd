#![forbid(unsafe_code)]

//! Core primitives for Veil: the document model, selectors, and input events.
//!
//! The overlay engine never talks to a browser. Everything it reads (markup,
//! attributes, focus, layout sizes) and everything it writes (state markers,
//! native `open` attributes, inline custom properties) goes through the
//! [`Document`] arena defined here.

pub mod document;
pub mod event;
pub mod geometry;
pub mod selector;

pub use document::{Ancestors, DATA_PREFIX, Descendants, Document, DomError, NodeId};
pub use event::{ClickEvent, Event, EventOutcome, Key, KeyEvent, Modifiers};
pub use geometry::Size;
pub use selector::{Selector, SelectorError, Specificity};
