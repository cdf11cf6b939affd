#![forbid(unsafe_code)]

//! Overlay lifecycle engine.
//!
//! `OverlayEngine` owns the document, the style source, every overlay
//! instance, and the timer queue. All lifecycle operations go through it:
//! hook calls, relayed commands, and dispatched input events.
//!
//! # State Machine
//!
//! ```text
//!            show                     duration
//!  Closed ─────────▶ Opening ─────────────────▶ Open
//!    ▲                  │ hide (lock bypass)     │ hide
//!    │    duration      ▼                        ▼
//!    └──────────────── Closing ◀─────────────────┘
//! ```
//!
//! # Invariants
//!
//! - A show or hide takes the instance lock for `lock_duration`; the lock is
//!   always released by its timer unless a newer lock replaced it.
//! - Every accepted transition takes a fresh, engine-wide generation; a
//!   completion carrying any other generation is discarded.
//! - Root markers equal the instance flags whenever control returns to the
//!   caller.
//! - Callbacks receive plain references and cannot re-enter the engine.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unresolvable handle | Bad selector, no root, no content | `warn!`, `Outcome::Unresolved` |
//! | Call inside lock window | Rapid repeat | `trace!`, `Outcome::Locked` |
//! | Redundant call | Show while open, hide while closed | `Outcome::Unchanged` |
//! | Root detached mid-transition | Host removed the markup | Completion still runs; focus is refused |

use std::time::Duration;

use ahash::AHashMap;
use tracing::{debug, trace, warn};
use veil_core::{Document, Event, EventOutcome, Key, NodeId};
use veil_style::{StyleSource, Stylesheet};

use crate::cache::AttributeCache;
use crate::command::ToggleCommand;
use crate::config::OverlayConfig;
use crate::escape::{self, EscapeCoordinator};
use crate::focus;
use crate::hook::OverlayHook;
use crate::markup::{BACKDROP_DURATION_PROPERTIES, CONTENT_DURATION_PROPERTIES, NATIVE_OPEN, REGISTERED};
use crate::options::OverlayOptions;
use crate::resolve::{self, Handle, OverlayElements};
use crate::scheduler::Scheduler;
use crate::state::{InstanceArena, InstanceId, InstanceState, Phase, StateFlags};
use crate::status::{Checkpoint, OverlayStatus};
use crate::timing;
use crate::visibility;

/// What a lifecycle call should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Show,
    Hide,
    /// Hide when the content is visible, else show.
    Toggle,
}

/// Result of a lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Initialized; no transition requested.
    Ready,
    /// Show started; completes after the measured duration.
    Showing,
    /// Show completed synchronously (zero duration).
    Shown,
    /// Hide started; completes after the measured duration.
    Hiding,
    /// Hide completed synchronously (zero duration).
    Hidden,
    /// Rejected inside the lock window.
    Locked,
    /// Already in the requested state.
    Unchanged,
    /// The handle did not resolve to an overlay.
    Unresolved,
}

impl Outcome {
    /// Whether a transition was started.
    pub const fn is_started(self) -> bool {
        matches!(
            self,
            Self::Showing | Self::Shown | Self::Hiding | Self::Hidden
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listener {
    Toggle,
    Touch,
}

/// Pending end of a show or hide.
#[derive(Debug)]
struct Completion {
    instance: InstanceId,
    generation: u64,
    elements: OverlayElements,
    options: OverlayOptions,
}

#[derive(Debug)]
enum Task {
    ReleaseLock {
        instance: InstanceId,
        lock_generation: u64,
    },
    FinishShow(Completion),
    FinishHide(Completion),
}

/// Owner of a document's overlays.
pub struct OverlayEngine<S = Stylesheet> {
    document: Document,
    styles: S,
    config: OverlayConfig,
    instances: InstanceArena,
    scheduler: Scheduler<Task>,
    escape: EscapeCoordinator,
    listeners: AHashMap<NodeId, (Listener, InstanceId)>,
    cache: AttributeCache,
    /// Source of generations and lock generations.
    tickets: u64,
}

impl<S: StyleSource> OverlayEngine<S> {
    /// Engine with the default configuration.
    pub fn new(document: Document, styles: S) -> Self {
        Self::with_config(document, styles, OverlayConfig::default())
    }

    pub fn with_config(document: Document, styles: S, config: OverlayConfig) -> Self {
        Self {
            document,
            styles,
            config,
            instances: InstanceArena::new(),
            scheduler: Scheduler::new(),
            escape: EscapeCoordinator::new(),
            listeners: AHashMap::new(),
            cache: AttributeCache::new(),
            tickets: 0,
        }
    }

    // --- Accessors ---

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document access for host patches. Call
    /// [`sync_markers`](Self::sync_markers) afterwards if root markers may
    /// have been overwritten.
    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    pub fn styles(&self) -> &S {
        &self.styles
    }

    #[inline]
    pub fn styles_mut(&mut self) -> &mut S {
        &mut self.styles
    }

    #[inline]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> &AttributeCache {
        &self.cache
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    // --- Instance Queries ---

    /// State of the overlay rooted at `root`, if initialized.
    pub fn instance(&self, root: NodeId) -> Option<&InstanceState> {
        self.instances.by_root(root)
    }

    /// Number of initialized overlays.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn phase(&self, root: NodeId) -> Phase {
        self.instance(root).map_or(Phase::Closed, InstanceState::phase)
    }

    pub fn is_open(&self, root: NodeId) -> bool {
        self.instance(root).is_some_and(InstanceState::is_open)
    }

    pub fn is_locked(&self, root: NodeId) -> bool {
        self.instance(root).is_some_and(InstanceState::is_locked)
    }

    /// Latest status reported for `root`.
    pub fn status(&self, root: NodeId) -> Option<OverlayStatus> {
        self.instance(root).map(InstanceState::status)
    }

    /// Roots Escape would close, bottom to top.
    pub fn escape_stack(&self) -> Vec<NodeId> {
        escape::escape_stack(&self.document, &self.instances)
            .into_iter()
            .map(|(_, root)| root)
            .collect()
    }

    /// Root Escape would close next.
    pub fn top_most(&self) -> Option<NodeId> {
        escape::top_most(&self.document, &self.instances).map(|(_, root)| root)
    }

    pub fn is_escape_attached(&self) -> bool {
        self.escape.is_attached()
    }

    // --- Commands ---

    /// Show the overlay named by `handle`.
    pub fn show(&mut self, handle: impl Into<Handle>, options: &OverlayOptions) -> Outcome {
        self.run(&mut OverlayHook::default(), &handle.into(), options, Some(Mode::Show))
    }

    /// Hide the overlay named by `handle`.
    pub fn hide(&mut self, handle: impl Into<Handle>, options: &OverlayOptions) -> Outcome {
        self.run(&mut OverlayHook::default(), &handle.into(), options, Some(Mode::Hide))
    }

    /// Toggle the overlay named by `handle`.
    pub fn toggle(&mut self, handle: impl Into<Handle>, options: &OverlayOptions) -> Outcome {
        self.run(&mut OverlayHook::default(), &handle.into(), options, Some(Mode::Toggle))
    }

    /// Run a relayed toggle command against the overlay enclosing `target`.
    pub fn dispatch_command(&mut self, target: NodeId, command: &ToggleCommand) -> Outcome {
        let Some(mode) = command.mode() else {
            trace!(%target, "toggle command without action");
            return Outcome::Unchanged;
        };
        self.run(
            &mut OverlayHook::default(),
            &Handle::Node(target),
            &command.options(),
            Some(mode),
        )
    }

    /// Resolve, initialize, and optionally transition one overlay.
    ///
    /// Options layer instance, then hook, then call; each layer overrides
    /// the fields it sets. The instance and the hook keep the result minus
    /// `ignore_lock`.
    pub(crate) fn run(
        &mut self,
        hook: &mut OverlayHook,
        handle: &Handle,
        options: &OverlayOptions,
        mode: Option<Mode>,
    ) -> Outcome {
        hook.options = hook.options.merged(options).persistent();

        let elements = match resolve::resolve(&self.document, handle, hook.el) {
            Ok(elements) => elements,
            Err(err) => {
                warn!(%handle, %err, "overlay not resolved");
                return Outcome::Unresolved;
            }
        };
        if hook.el.is_none() {
            hook.el = Some(elements.root);
        }

        let id = self.instances.ensure(elements.root);
        let stored = self
            .instances
            .get(id)
            .map(|state| state.options.merged(&hook.options))
            .unwrap_or_else(|| hook.options.clone());
        let call = stored.merged(options);
        self.update(id, |state| state.options = stored);

        if let Some(duration) = options.transition_duration {
            self.apply_transition_duration(&elements, duration);
        }
        self.register_listeners(id, &elements);

        if elements.is_details()
            && self.document.has_attribute(elements.root, NATIVE_OPEN)
            && mode != Some(Mode::Hide)
            && self.phase(elements.root) == Phase::Closed
        {
            debug!(root = %elements.root, "details rendered open; syncing");
            self.begin_show(id, &elements, &call);
        }

        match mode {
            None => Outcome::Ready,
            Some(Mode::Show) => self.begin_show(id, &elements, &call),
            Some(Mode::Hide) => self.begin_hide(id, &elements, &call),
            Some(Mode::Toggle) => self.toggle_instance(id, &elements, &call),
        }
    }

    // --- Lifecycle ---

    fn begin_show(
        &mut self,
        id: InstanceId,
        elements: &OverlayElements,
        options: &OverlayOptions,
    ) -> Outcome {
        let Some(state) = self.instances.get(id) else {
            return Outcome::Unresolved;
        };
        if state.is_locked() {
            trace!(root = %elements.root, "show ignored while locked");
            return Outcome::Locked;
        }
        if state.phase().is_shown() {
            return Outcome::Unchanged;
        }

        self.lock(id);
        if elements.is_escapable() && self.escape.attach() {
            debug!("escape listener attached");
        }
        if elements.is_details() {
            self.document.toggle_attribute(elements.root, NATIVE_OPEN, true);
        }
        if elements.is_dialog() {
            self.document
                .toggle_attribute(elements.content, NATIVE_OPEN, true);
        }

        let generation = self.next_ticket();
        let status = OverlayStatus::at(Checkpoint::WillShow);
        self.update(id, |state| {
            state.phase = Phase::Opening;
            state.flags.insert(StateFlags::OPEN | StateFlags::SHOWING);
            state.flags.remove(StateFlags::HIDING);
            state.generation = generation;
            state.status = status;
        });
        options.notify(Checkpoint::WillShow, elements, &status);

        let duration = self.measure(elements.content);
        debug!(root = %elements.root, ?duration, "overlay showing");
        let completion = Completion {
            instance: id,
            generation,
            elements: elements.clone(),
            options: options.clone(),
        };
        if duration.is_zero() {
            self.finish_show(completion);
            Outcome::Shown
        } else {
            self.scheduler
                .schedule(duration, Task::FinishShow(completion));
            Outcome::Showing
        }
    }

    fn finish_show(&mut self, completion: Completion) {
        if !self.is_current(&completion) {
            trace!(root = %completion.elements.root, "stale show completion dropped");
            return;
        }
        let Completion {
            instance,
            elements,
            options,
            ..
        } = completion;

        if let Some(focused) = focus::apply_open_focus(&mut self.document, &self.styles, &elements)
        {
            trace!(root = %elements.root, %focused, "open focus");
        }
        let status = OverlayStatus::at(Checkpoint::DidShow);
        self.update(instance, |state| {
            state.phase = Phase::Open;
            state.flags.remove(StateFlags::SHOWING);
            state.status = status;
        });
        debug!(root = %elements.root, "overlay shown");
        options.notify(Checkpoint::DidShow, &elements, &status);
    }

    fn begin_hide(
        &mut self,
        id: InstanceId,
        elements: &OverlayElements,
        options: &OverlayOptions,
    ) -> Outcome {
        let Some(state) = self.instances.get(id) else {
            return Outcome::Unresolved;
        };
        if state.is_locked() && !options.ignore_lock {
            trace!(root = %elements.root, "hide ignored while locked");
            return Outcome::Locked;
        }
        if !state.phase().is_shown() {
            return Outcome::Unchanged;
        }

        self.lock(id);
        let generation = self.next_ticket();
        let status = OverlayStatus::at(Checkpoint::WillHide);
        self.update(id, |state| {
            state.phase = Phase::Closing;
            state.flags.insert(StateFlags::HIDING);
            state.flags.remove(StateFlags::SHOWING);
            state.generation = generation;
            state.status = status;
        });
        options.notify(Checkpoint::WillHide, elements, &status);
        // Dropping the open marker is what starts the closing transition.
        self.update(id, |state| state.flags.remove(StateFlags::OPEN));

        let duration = self.measure(elements.content);
        debug!(root = %elements.root, ?duration, "overlay hiding");
        let completion = Completion {
            instance: id,
            generation,
            elements: elements.clone(),
            options: options.clone(),
        };
        if duration.is_zero() {
            self.finish_hide(completion);
            Outcome::Hidden
        } else {
            self.scheduler
                .schedule(duration, Task::FinishHide(completion));
            Outcome::Hiding
        }
    }

    fn finish_hide(&mut self, completion: Completion) {
        if !self.is_current(&completion) {
            trace!(root = %completion.elements.root, "stale hide completion dropped");
            return;
        }
        let Completion {
            instance,
            elements,
            options,
            ..
        } = completion;

        if elements.is_details() {
            self.document
                .toggle_attribute(elements.root, NATIVE_OPEN, false);
        }
        if elements.is_dialog() {
            self.document
                .toggle_attribute(elements.content, NATIVE_OPEN, false);
        }
        let status = OverlayStatus::at(Checkpoint::DidHide);
        self.update(instance, |state| {
            state.phase = Phase::Closed;
            state.flags.remove(StateFlags::HIDING | StateFlags::OPEN);
            state.status = status;
        });
        debug!(root = %elements.root, "overlay hidden");
        options.notify(Checkpoint::DidHide, &elements, &status);
        self.apply_close_focus();
    }

    fn toggle_instance(
        &mut self,
        id: InstanceId,
        elements: &OverlayElements,
        options: &OverlayOptions,
    ) -> Outcome {
        if visibility::is_visible(&self.document, &self.styles, elements.content) {
            self.begin_hide(id, elements, options)
        } else {
            self.begin_show(id, elements, options)
        }
    }

    /// Move focus into the overlay left on top, if any.
    fn apply_close_focus(&mut self) {
        let Some((_, root)) = escape::top_most(&self.document, &self.instances) else {
            return;
        };
        match resolve::elements_for_root(&self.document, root) {
            Ok(elements) => {
                focus::focus_first_in(&mut self.document, &self.styles, &elements);
            }
            Err(err) => warn!(%root, %err, "close focus target not resolved"),
        }
    }

    fn is_current(&self, completion: &Completion) -> bool {
        self.instances.get(completion.instance).is_some_and(|state| {
            state.root() == completion.elements.root
                && state.generation() == completion.generation
        })
    }

    // --- Locking ---

    fn lock(&mut self, id: InstanceId) {
        let window = self.config.lock_duration;
        if window.is_zero() {
            return;
        }
        let lock_generation = self.next_ticket();
        self.update(id, |state| {
            state.flags.insert(StateFlags::LOCKED);
            state.lock_generation = lock_generation;
        });
        self.scheduler.schedule(
            window,
            Task::ReleaseLock {
                instance: id,
                lock_generation,
            },
        );
    }

    fn release_lock(&mut self, id: InstanceId, lock_generation: u64) {
        let released = self.update(id, |state| {
            let current = state.lock_generation == lock_generation;
            if current {
                state.flags.remove(StateFlags::LOCKED);
            }
            current
        });
        if released == Some(true) {
            trace!(instance = %id, "lock released");
        }
    }

    // --- Time ---

    /// Advance virtual time by `by`, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.now().saturating_add(by));
    }

    /// Advance virtual time to `until`, firing every timer that falls due.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.set_now(until);
    }

    /// Fire every pending timer, advancing time as far as needed.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.advance_to(due);
        }
    }

    /// Catch virtual time up with the wall clock.
    pub fn pump(&mut self) {
        let elapsed = self.scheduler.real_elapsed();
        self.advance_to(elapsed);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ReleaseLock {
                instance,
                lock_generation,
            } => self.release_lock(instance, lock_generation),
            Task::FinishShow(completion) => self.finish_show(completion),
            Task::FinishHide(completion) => self.finish_hide(completion),
        }
    }

    // --- Events ---

    /// Deliver an input event to the engine's listeners.
    pub fn dispatch(&mut self, event: &Event) -> EventOutcome {
        match *event {
            Event::Key(key) => match key.key {
                Key::Escape => self.handle_escape(),
                _ => EventOutcome::IGNORED,
            },
            Event::Click(click) => self.handle_click(click.target),
        }
    }

    fn handle_escape(&mut self) -> EventOutcome {
        if !self.escape.is_attached() {
            return EventOutcome::IGNORED;
        }
        let Some((id, root)) = escape::top_most(&self.document, &self.instances) else {
            return EventOutcome::IGNORED;
        };
        let Some((elements, options)) = self.listener_context(id, root) else {
            return EventOutcome::IGNORED;
        };
        let outcome = self.begin_hide(id, &elements, &options.ignore_lock(true));
        debug!(%root, ?outcome, "escape");
        if outcome.is_started() {
            EventOutcome::HANDLED
        } else {
            EventOutcome::IGNORED
        }
    }

    fn handle_click(&mut self, target: NodeId) -> EventOutcome {
        let path: Vec<NodeId> = std::iter::once(target)
            .chain(self.document.ancestors(target))
            .collect();
        let mut outcome = EventOutcome::IGNORED;
        for node in path {
            let Some(&(listener, id)) = self.listeners.get(&node) else {
                continue;
            };
            let Some(root) = self.instances.get(id).map(InstanceState::root) else {
                continue;
            };
            match listener {
                Listener::Touch => {
                    if node != target {
                        continue;
                    }
                    let Some((elements, options)) = self.listener_context(id, root) else {
                        continue;
                    };
                    if elements.is_modal() {
                        trace!(%root, "outside click ignored for modal");
                        continue;
                    }
                    if self.begin_hide(id, &elements, &options).is_started() {
                        outcome.handled = true;
                    }
                }
                Listener::Toggle => {
                    outcome.handled = true;
                    outcome.default_prevented = true;
                    outcome.propagation_stopped = true;
                    if let Some((elements, options)) = self.listener_context(id, root) {
                        self.toggle_instance(id, &elements, &options);
                    }
                    break;
                }
            }
        }
        outcome
    }

    /// Fresh elements and the stored options for a listener-driven call.
    fn listener_context(
        &self,
        id: InstanceId,
        root: NodeId,
    ) -> Option<(OverlayElements, OverlayOptions)> {
        let options = self.instances.get(id)?.options.clone();
        match resolve::elements_for_root(&self.document, root) {
            Ok(elements) => Some((elements, options)),
            Err(err) => {
                warn!(%root, %err, "listener target not resolved");
                None
            }
        }
    }

    fn register_listeners(&mut self, id: InstanceId, elements: &OverlayElements) {
        // Nodes replaced by a host patch drop out; their successors register below.
        self.listeners
            .retain(|node, (_, owner)| *owner != id || self.document.is_connected(*node));
        let targets = [
            (elements.toggle, Listener::Toggle),
            (elements.touch_layer, Listener::Touch),
        ];
        for (node, listener) in targets {
            let Some(node) = node else {
                continue;
            };
            if self.document.has_data(node, REGISTERED) {
                continue;
            }
            self.listeners.insert(node, (listener, id));
            self.document.set_data(node, REGISTERED, "");
            trace!(%node, ?listener, "listener registered");
        }
    }

    // --- Markup ---

    fn apply_transition_duration(&mut self, elements: &OverlayElements, duration: Duration) {
        let value = format!("{}ms", duration.as_millis());
        for property in CONTENT_DURATION_PROPERTIES {
            self.document
                .set_style_property(elements.content, property, value.clone());
        }
        if let Some(backdrop) = elements.backdrop_layer {
            for property in BACKDROP_DURATION_PROPERTIES {
                self.document
                    .set_style_property(backdrop, property, value.clone());
            }
        }
    }

    fn measure(&self, node: NodeId) -> Duration {
        timing::measure(&self.styles.computed_style(&self.document, node))
    }

    /// Rewrite the state markers of `root` from its instance.
    pub fn sync_markers(&mut self, root: NodeId) {
        if let Some(state) = self.instances.by_root(root) {
            state.flags().sync_to(&mut self.document, root);
        }
    }

    /// Drop the instance for `root` and detach its listeners.
    pub fn release(&mut self, root: NodeId) -> bool {
        let Some((id, _)) = self.instances.release(root) else {
            return false;
        };
        let nodes: Vec<NodeId> = self
            .listeners
            .iter()
            .filter(|(_, (_, owner))| *owner == id)
            .map(|(node, _)| *node)
            .collect();
        for node in nodes {
            self.listeners.remove(&node);
            self.document.remove_data(node, REGISTERED);
        }
        debug!(%root, "overlay released");
        true
    }

    // --- Attribute Cache ---

    /// Snapshot the data attributes of `el`, keyed by its `id`.
    pub fn snapshot_dataset(&mut self, el: NodeId) -> bool {
        let Some(key) = self.document.attribute(el, "id") else {
            return false;
        };
        let dataset = self.document.dataset(el);
        self.cache.snapshot(key, &dataset)
    }

    /// Re-apply the snapshot of `el`, leaving the entry in place.
    pub fn restore_dataset(&mut self, el: NodeId) -> bool {
        let Some(key) = self.document.attribute(el, "id") else {
            return false;
        };
        let Some(dataset) = self.cache.restore(key) else {
            return false;
        };
        self.document.apply_dataset(el, &dataset);
        true
    }

    /// Drop the snapshot of `el`.
    pub fn discard_dataset(&mut self, el: NodeId) -> bool {
        match self.document.attribute(el, "id") {
            Some(key) => self.cache.discard(key),
            None => false,
        }
    }

    // --- Internals ---

    fn next_ticket(&mut self) -> u64 {
        self.tickets += 1;
        self.tickets
    }

    /// Mutate one instance and mirror its flags to the root.
    fn update<R>(&mut self, id: InstanceId, f: impl FnOnce(&mut InstanceState) -> R) -> Option<R> {
        let state = self.instances.get_mut(id)?;
        let result = f(state);
        state.flags().sync_to(&mut self.document, state.root());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_test::traced_test;

    const CSS: &str = "
        [data-prompt]:not([data-isopen]):not([data-ishiding]) [data-content] { display: none; }
        [data-content] { transition-duration: var(--prompt-transition-duration-content, 0s); }
    ";

    struct Fixture {
        engine: OverlayEngine,
        root: NodeId,
        toggle: NodeId,
        touch: NodeId,
        content: NodeId,
        button: NodeId,
    }

    fn el(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.append_child(parent, node).unwrap();
        node
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div");
        doc.set_data(root, "prompt", "");
        doc.set_attribute(root, "id", "dlg");
        let toggle = el(&mut doc, root, "button");
        doc.set_data(toggle, "toggle", "");
        let touch = el(&mut doc, root, "div");
        doc.set_data(touch, "touch", "");
        let content = el(&mut doc, touch, "div");
        doc.set_data(content, "content", "");
        let button = el(&mut doc, content, "button");
        let engine = OverlayEngine::new(doc, Stylesheet::parse(CSS).unwrap());
        Fixture {
            engine,
            root,
            toggle,
            touch,
            content,
            button,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, OverlayOptions) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = |name: &'static str| {
            let log = Rc::clone(&log);
            move |_: &OverlayElements| log.borrow_mut().push(name)
        };
        let status_log = Rc::clone(&log);
        let options = OverlayOptions::new()
            .on_will_show(push("will_show"))
            .on_did_show(push("did_show"))
            .on_will_hide(push("will_hide"))
            .on_did_hide(push("did_hide"))
            .on_status(move |_| status_log.borrow_mut().push("status"));
        (log, options)
    }

    #[test]
    fn zero_duration_show_completes_synchronously() {
        let mut f = fixture();
        let (log, options) = recorder();
        assert_eq!(f.engine.show("#dlg", &options), Outcome::Shown);
        assert_eq!(f.engine.phase(f.root), Phase::Open);
        assert!(f.engine.is_open(f.root));
        assert!(f.engine.is_locked(f.root));
        assert_eq!(
            *log.borrow(),
            vec!["will_show", "status", "did_show", "status"]
        );
        assert_eq!(
            f.engine.status(f.root),
            Some(OverlayStatus::at(Checkpoint::DidShow))
        );

        f.engine.advance(ms(299));
        assert!(f.engine.is_locked(f.root));
        f.engine.advance(ms(1));
        assert!(!f.engine.is_locked(f.root));
        assert!(!f.engine.document().has_data(f.root, "islocked"));
    }

    #[test]
    fn timed_show_waits_for_transition() {
        let mut f = fixture();
        let options = OverlayOptions::new().transition_duration(ms(200));
        assert_eq!(f.engine.show("#dlg", &options), Outcome::Showing);
        let doc = f.engine.document();
        assert_eq!(
            doc.style_property(f.content, "--prompt-transition-duration-content"),
            Some("200ms")
        );
        assert!(doc.has_data(f.root, "isopen"));
        assert!(doc.has_data(f.root, "isshowing"));
        assert_eq!(f.engine.phase(f.root), Phase::Opening);

        f.engine.advance(ms(199));
        assert_eq!(f.engine.phase(f.root), Phase::Opening);
        f.engine.advance(ms(1));
        assert_eq!(f.engine.phase(f.root), Phase::Open);
        assert!(!f.engine.document().has_data(f.root, "isshowing"));
    }

    #[test]
    fn repeat_show_inside_lock_is_ignored() {
        let mut f = fixture();
        let (log, options) = recorder();
        f.engine.show("#dlg", &options);
        assert_eq!(f.engine.show("#dlg", &options), Outcome::Locked);
        f.engine.advance(ms(300));
        assert_eq!(f.engine.show("#dlg", &options), Outcome::Unchanged);
        let shows = log.borrow().iter().filter(|e| **e == "will_show").count();
        assert_eq!(shows, 1);
    }

    #[test]
    fn hide_marks_then_completes() {
        let mut f = fixture();
        f.engine
            .show("#dlg", &OverlayOptions::new().transition_duration(ms(100)));
        f.engine.run_until_idle();
        assert_eq!(f.engine.hide("#dlg", &OverlayOptions::new()), Outcome::Hiding);
        let doc = f.engine.document();
        assert!(!doc.has_data(f.root, "isopen"));
        assert!(doc.has_data(f.root, "ishiding"));
        assert_eq!(
            f.engine.status(f.root),
            Some(OverlayStatus::at(Checkpoint::WillHide))
        );
        f.engine.advance(ms(100));
        assert_eq!(f.engine.phase(f.root), Phase::Closed);
        assert!(!f.engine.document().has_data(f.root, "ishiding"));
        assert_eq!(f.engine.hide("#dlg", &OverlayOptions::new()), Outcome::Locked);
        f.engine.run_until_idle();
        assert_eq!(f.engine.hide("#dlg", &OverlayOptions::new()), Outcome::Unchanged);
    }

    #[test]
    fn bypassing_hide_discards_pending_show() {
        let mut f = fixture();
        let (log, options) = recorder();
        f.engine
            .show("#dlg", &options.clone().transition_duration(ms(250)));
        let hide = options.ignore_lock(true);
        assert_eq!(f.engine.hide("#dlg", &hide), Outcome::Hiding);
        f.engine.run_until_idle();
        assert_eq!(f.engine.phase(f.root), Phase::Closed);
        assert!(!log.borrow().contains(&"did_show"));
        assert_eq!(log.borrow().last(), Some(&"status"));
        assert!(log.borrow().contains(&"did_hide"));
        assert!(!f.engine.is_locked(f.root));
    }

    #[test]
    fn toggle_click_prevents_default_and_flips() {
        let mut f = fixture();
        assert_eq!(f.engine.show("#dlg", &OverlayOptions::new()), Outcome::Shown);
        f.engine.run_until_idle();

        let outcome = f.engine.dispatch(&Event::click(f.toggle));
        assert!(outcome.handled && outcome.default_prevented && outcome.propagation_stopped);
        assert!(!f.engine.is_open(f.root));

        f.engine.run_until_idle();
        f.engine.dispatch(&Event::click(f.toggle));
        assert!(f.engine.is_open(f.root));
    }

    #[test]
    fn touch_layer_needs_exact_target() {
        let mut f = fixture();
        f.engine.show("#dlg", &OverlayOptions::new());
        f.engine.run_until_idle();

        let outcome = f.engine.dispatch(&Event::click(f.button));
        assert!(!outcome.handled);
        assert!(f.engine.is_open(f.root));

        let outcome = f.engine.dispatch(&Event::click(f.touch));
        assert!(outcome.handled);
        assert!(!f.engine.is_open(f.root));
    }

    #[test]
    fn listeners_register_once() {
        let mut f = fixture();
        f.engine.show("#dlg", &OverlayOptions::new());
        f.engine.run_until_idle();
        f.engine.hide("#dlg", &OverlayOptions::new());
        assert_eq!(f.engine.listeners.len(), 2);
        assert_eq!(f.engine.document().data(f.toggle, "registered"), Some(""));

        assert!(f.engine.release(f.root));
        assert!(f.engine.listeners.is_empty());
        assert!(!f.engine.document().has_data(f.toggle, "registered"));
        assert!(!f.engine.release(f.root));
    }

    #[test]
    fn escape_before_any_show_is_ignored() {
        let mut f = fixture();
        assert_eq!(
            f.engine.dispatch(&Event::key(Key::Escape)),
            EventOutcome::IGNORED
        );
        f.engine.show("#dlg", &OverlayOptions::new());
        assert!(f.engine.is_escape_attached());
        assert_eq!(
            f.engine.dispatch(&Event::key(Key::Enter)),
            EventOutcome::IGNORED
        );
        // Escape bypasses the lock taken by the show.
        assert_eq!(
            f.engine.dispatch(&Event::key(Key::Escape)),
            EventOutcome::HANDLED
        );
        assert!(!f.engine.is_open(f.root));
    }

    #[test]
    fn details_open_on_init_is_synced() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "details");
        doc.set_data(root, "prompt", "");
        doc.set_attribute(root, "open", "");
        el(&mut doc, root, "summary");
        let content = el(&mut doc, root, "div");
        doc.set_data(content, "content", "");
        let mut engine = OverlayEngine::new(doc, Stylesheet::new());

        let mut hook = OverlayHook::new(root);
        assert_eq!(hook.mounted(&mut engine), Outcome::Ready);
        assert!(engine.is_open(root));

        engine.run_until_idle();
        assert_eq!(hook.hide(&mut engine, Handle::Bound, &OverlayOptions::new()), Outcome::Hidden);
        assert!(!engine.document().has_attribute(root, "open"));
    }

    #[test]
    fn dialog_content_gets_native_open() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div");
        doc.set_data(root, "prompt", "");
        let dialog = el(&mut doc, root, "dialog");
        doc.set_data(dialog, "content", "");
        let mut engine = OverlayEngine::new(doc, Stylesheet::new());

        engine.show(root, &OverlayOptions::new());
        assert!(engine.document().has_attribute(dialog, "open"));
        engine.run_until_idle();
        engine.hide(root, &OverlayOptions::new());
        assert!(!engine.document().has_attribute(dialog, "open"));
    }

    #[test]
    fn focus_first_on_open() {
        let mut f = fixture();
        f.engine.document_mut().set_data(f.root, "isfocusfirst", "");
        f.engine.show("#dlg", &OverlayOptions::new());
        assert_eq!(f.engine.document().active_element(), Some(f.button));
    }

    #[test]
    fn zero_lock_window_disables_locking() {
        let f = fixture();
        let doc = f.engine.document().clone();
        let config = OverlayConfig::default().lock_duration(Duration::ZERO);
        let mut engine = OverlayEngine::with_config(doc, Stylesheet::parse(CSS).unwrap(), config);
        assert_eq!(engine.show(f.root, &OverlayOptions::new()), Outcome::Shown);
        assert!(!engine.is_locked(f.root));
        assert_eq!(engine.hide(f.root, &OverlayOptions::new()), Outcome::Hidden);
        assert_eq!(engine.pending_timers(), 0);
    }

    #[test]
    fn command_runs_against_enclosing_root() {
        let mut f = fixture();
        let outcome = f
            .engine
            .dispatch_command(f.button, &ToggleCommand::show().with_transition_ms(80));
        assert_eq!(outcome, Outcome::Showing);
        f.engine.advance(ms(80));
        assert_eq!(f.engine.phase(f.root), Phase::Open);
        assert_eq!(
            f.engine.dispatch_command(f.button, &ToggleCommand::default()),
            Outcome::Unchanged
        );
    }

    #[traced_test]
    #[test]
    fn unresolved_handle_is_logged() {
        let mut f = fixture();
        assert_eq!(
            f.engine.show("#missing", &OverlayOptions::new()),
            Outcome::Unresolved
        );
        assert!(logs_contain("overlay not resolved"));
        assert_eq!(f.engine.instance_count(), 0);
    }

    #[test]
    fn markers_track_flags() {
        let mut f = fixture();
        f.engine.show("#dlg", &OverlayOptions::new());
        f.engine.document_mut().remove_data(f.root, "isopen");
        f.engine.sync_markers(f.root);
        assert!(f.engine.document().has_data(f.root, "isopen"));
        let flags = f.engine.instance(f.root).unwrap().flags();
        assert_eq!(StateFlags::read_from(f.engine.document(), f.root), flags);
    }
}
