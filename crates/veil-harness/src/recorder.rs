#![forbid(unsafe_code)]

//! Callback recording.

use std::cell::RefCell;
use std::rc::Rc;

use veil_overlay::{Checkpoint, OverlayElements, OverlayOptions, OverlayStatus};

/// Shared, ordered log of lifecycle callbacks.
///
/// Entries look like `"dlg:will_show"` and `"dlg:status(will_show)"`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options whose every callback appends to this log under `label`.
    pub fn options(&self, label: &str) -> OverlayOptions {
        let hook = |name: &'static str| {
            let events = Rc::clone(&self.events);
            let label = label.to_owned();
            move |_: &OverlayElements| {
                events.borrow_mut().push(format!("{label}:{name}"));
            }
        };
        let events = Rc::clone(&self.events);
        let status_label = label.to_owned();
        OverlayOptions::new()
            .on_will_show(hook("will_show"))
            .on_did_show(hook("did_show"))
            .on_will_hide(hook("will_hide"))
            .on_did_hide(hook("did_hide"))
            .on_status(move |status| {
                events
                    .borrow_mut()
                    .push(format!("{status_label}:status({})", describe(status)));
            })
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    /// Number of entries equal to `event`.
    pub fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

fn describe(status: &OverlayStatus) -> &'static str {
    match status.checkpoint() {
        Some(Checkpoint::WillShow) => "will_show",
        Some(Checkpoint::DidShow) => "did_show",
        Some(Checkpoint::WillHide) => "will_hide",
        Some(Checkpoint::DidHide) => "did_hide",
        None => "initial",
    }
}
