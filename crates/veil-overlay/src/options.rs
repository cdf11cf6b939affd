#![forbid(unsafe_code)]

//! Per-call and per-hook overlay options.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::resolve::OverlayElements;
use crate::status::{Checkpoint, OverlayStatus};

/// Callback run at a lifecycle checkpoint.
pub type ElementsCallback = Rc<dyn Fn(&OverlayElements)>;

/// Callback receiving every status report.
pub type StatusCallback = Rc<dyn Fn(&OverlayStatus)>;

/// Options for a show, hide, or toggle.
///
/// Hooks persist their options across calls; each call's options override
/// the stored ones field by field. `ignore_lock` is never persisted.
#[derive(Clone, Default)]
pub struct OverlayOptions {
    pub will_show: Option<ElementsCallback>,
    pub did_show: Option<ElementsCallback>,
    pub will_hide: Option<ElementsCallback>,
    pub did_hide: Option<ElementsCallback>,
    pub get_status: Option<StatusCallback>,
    /// Written to the transition custom properties on init.
    pub transition_duration: Option<Duration>,
    /// Proceed with a hide even while the instance is locked.
    pub ignore_lock: bool,
}

impl fmt::Debug for OverlayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayOptions")
            .field("will_show", &self.will_show.is_some())
            .field("did_show", &self.did_show.is_some())
            .field("will_hide", &self.will_hide.is_some())
            .field("did_hide", &self.did_hide.is_some())
            .field("get_status", &self.get_status.is_some())
            .field("transition_duration", &self.transition_duration)
            .field("ignore_lock", &self.ignore_lock)
            .finish()
    }
}

impl OverlayOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_will_show(mut self, f: impl Fn(&OverlayElements) + 'static) -> Self {
        self.will_show = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_did_show(mut self, f: impl Fn(&OverlayElements) + 'static) -> Self {
        self.did_show = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_will_hide(mut self, f: impl Fn(&OverlayElements) + 'static) -> Self {
        self.will_hide = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_did_hide(mut self, f: impl Fn(&OverlayElements) + 'static) -> Self {
        self.did_hide = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_status(mut self, f: impl Fn(&OverlayStatus) + 'static) -> Self {
        self.get_status = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = Some(duration);
        self
    }

    #[must_use]
    pub fn ignore_lock(mut self, ignore: bool) -> Self {
        self.ignore_lock = ignore;
        self
    }

    /// `self` overridden by every field `newer` sets.
    ///
    /// `ignore_lock` comes from `newer` alone.
    pub fn merged(&self, newer: &Self) -> Self {
        Self {
            will_show: newer.will_show.clone().or_else(|| self.will_show.clone()),
            did_show: newer.did_show.clone().or_else(|| self.did_show.clone()),
            will_hide: newer.will_hide.clone().or_else(|| self.will_hide.clone()),
            did_hide: newer.did_hide.clone().or_else(|| self.did_hide.clone()),
            get_status: newer.get_status.clone().or_else(|| self.get_status.clone()),
            transition_duration: newer.transition_duration.or(self.transition_duration),
            ignore_lock: newer.ignore_lock,
        }
    }

    /// Copy suitable for storing on a hook or instance.
    pub(crate) fn persistent(&self) -> Self {
        Self {
            ignore_lock: false,
            ..self.clone()
        }
    }

    fn callback(&self, checkpoint: Checkpoint) -> Option<&ElementsCallback> {
        match checkpoint {
            Checkpoint::WillShow => self.will_show.as_ref(),
            Checkpoint::DidShow => self.did_show.as_ref(),
            Checkpoint::WillHide => self.will_hide.as_ref(),
            Checkpoint::DidHide => self.did_hide.as_ref(),
        }
    }

    /// Run the checkpoint callback, then report `status`.
    pub(crate) fn notify(
        &self,
        checkpoint: Checkpoint,
        elements: &OverlayElements,
        status: &OverlayStatus,
    ) {
        if let Some(f) = self.callback(checkpoint) {
            f(elements);
        }
        if let Some(f) = &self.get_status {
            f(status);
        }
    }
}
