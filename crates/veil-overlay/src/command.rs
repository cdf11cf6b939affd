#![forbid(unsafe_code)]

//! Relayed toggle commands.
//!
//! Server pushes and other out-of-band triggers arrive as a `prompt:toggle`
//! event whose detail is JSON: `{"action": "show" | "hide",
//! "transitionDuration": 250}`. A detail without an action is a no-op.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::Mode;
use crate::options::OverlayOptions;

/// Event name carrying a [`ToggleCommand`].
pub const TOGGLE_EVENT: &str = "prompt:toggle";

/// Requested direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Show,
    Hide,
}

/// Decoded `prompt:toggle` detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCommand {
    #[serde(default)]
    pub action: Option<Action>,
    /// Milliseconds.
    #[serde(default)]
    pub transition_duration: Option<u64>,
}

impl ToggleCommand {
    pub const fn show() -> Self {
        Self {
            action: Some(Action::Show),
            transition_duration: None,
        }
    }

    pub const fn hide() -> Self {
        Self {
            action: Some(Action::Hide),
            transition_duration: None,
        }
    }

    #[must_use]
    pub const fn with_transition_ms(mut self, ms: u64) -> Self {
        self.transition_duration = Some(ms);
        self
    }

    /// Decode an event detail.
    pub fn from_json(json: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn mode(&self) -> Option<Mode> {
        self.action.map(|action| match action {
            Action::Show => Mode::Show,
            Action::Hide => Mode::Hide,
        })
    }

    pub fn options(&self) -> OverlayOptions {
        OverlayOptions {
            transition_duration: self.transition_duration.map(Duration::from_millis),
            ..OverlayOptions::default()
        }
    }
}

/// A toggle command payload could not be decoded.
#[derive(Debug)]
pub enum CommandError {
    Json(serde_json::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed {TOGGLE_EVENT} detail: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
