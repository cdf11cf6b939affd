#![forbid(unsafe_code)]

//! Input events routed into the overlay engine.
//!
//! Only the events the engine reacts to are modeled: key presses (for Escape
//! dismissal) and clicks (for toggle controls and touch layers). Click events
//! carry their original target; bubbling is performed by the receiver.

use bitflags::bitflags;

use crate::document::NodeId;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Logical key identity (the DOM's `KeyboardEvent.key`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,
    Char(char),
}

impl Key {
    /// Parse a DOM `key` string. Unknown multi-character names yield `None`.
    pub fn from_dom(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(Self::Escape),
            "Enter" => Some(Self::Enter),
            "Tab" => Some(Self::Tab),
            " " | "Spacebar" => Some(Self::Space),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    /// Attach modifier state.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A primary-button click on `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: NodeId,
}

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Click(ClickEvent),
}

impl Event {
    /// Shorthand for an unmodified key press.
    pub const fn key(key: Key) -> Self {
        Self::Key(KeyEvent::new(key))
    }

    /// Shorthand for a click on `target`.
    pub const fn click(target: NodeId) -> Self {
        Self::Click(ClickEvent { target })
    }
}

/// What the receiver did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// A listener acted on the event.
    pub handled: bool,
    /// `preventDefault()` was called.
    pub default_prevented: bool,
    /// `stopPropagation()` was called.
    pub propagation_stopped: bool,
}

impl EventOutcome {
    /// Nothing listened.
    pub const IGNORED: Self = Self {
        handled: false,
        default_prevented: false,
        propagation_stopped: false,
    };

    /// A listener acted without touching default behavior.
    pub const HANDLED: Self = Self {
        handled: true,
        default_prevented: false,
        propagation_stopped: false,
    };
}
