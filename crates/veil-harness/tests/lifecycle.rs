#![forbid(unsafe_code)]

//! Integration tests: show/hide sequencing, locking, and transition timing.

use std::time::Duration;

use proptest::prelude::*;
use veil_core::Event;
use veil_harness::strategies::{self, Step};
use veil_harness::{OverlayMarkup, Page, Recorder};
use veil_overlay::{
    Checkpoint, DEFAULT_LOCK_DURATION, Handle, Outcome, OverlayHook, OverlayOptions,
    OverlayStatus, Phase,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// Show / hide
// ============================================================================

#[test]
fn show_then_settle_is_open_and_unlocked() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(180));
    let mut engine = page.into_engine();

    assert_eq!(engine.show("#dlg", &OverlayOptions::new()), Outcome::Showing);
    assert!(engine.is_locked(dlg.root));
    engine.advance(ms(180));
    assert_eq!(engine.phase(dlg.root), Phase::Open);
    assert!(engine.is_locked(dlg.root));
    engine.advance(DEFAULT_LOCK_DURATION);
    assert!(engine.is_open(dlg.root));
    assert!(!engine.is_locked(dlg.root));
    assert_eq!(engine.pending_timers(), 0);
}

#[test]
fn hide_then_settle_is_closed() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(120));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    engine.run_until_idle();
    assert_eq!(engine.hide("#dlg", &OverlayOptions::new()), Outcome::Hiding);
    assert_eq!(engine.phase(dlg.root), Phase::Closing);
    assert_eq!(
        engine.status(dlg.root),
        Some(OverlayStatus::at(Checkpoint::WillHide))
    );
    engine.run_until_idle();
    assert!(!engine.is_open(dlg.root));
    assert_eq!(engine.phase(dlg.root), Phase::Closed);
    assert_eq!(
        engine.status(dlg.root),
        Some(OverlayStatus::at(Checkpoint::DidHide))
    );
    let doc = engine.document();
    for marker in ["isopen", "isshowing", "ishiding", "islocked"] {
        assert!(!doc.has_data(dlg.root, marker), "{marker} left behind");
    }
}

#[test]
fn double_show_inside_lock_window_runs_once() {
    let mut page = Page::new();
    page.add(&OverlayMarkup::new("dlg").transition_ms(100));
    let mut engine = page.into_engine();
    let recorder = Recorder::new();
    let options = recorder.options("dlg");

    assert_eq!(engine.show("#dlg", &options), Outcome::Showing);
    engine.advance(ms(150));
    assert_eq!(engine.show("#dlg", &options), Outcome::Locked);
    engine.run_until_idle();

    assert_eq!(recorder.count("dlg:will_show"), 1);
    assert_eq!(recorder.count("dlg:did_show"), 1);
}

#[test]
fn zero_duration_callbacks_fire_back_to_back() {
    let mut page = Page::new();
    page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();
    let recorder = Recorder::new();

    assert_eq!(engine.show("#dlg", &recorder.options("dlg")), Outcome::Shown);
    engine.run_until_idle();
    assert_eq!(engine.hide("#dlg", &recorder.options("dlg")), Outcome::Hidden);

    assert_eq!(
        recorder.events(),
        vec![
            "dlg:will_show",
            "dlg:status(will_show)",
            "dlg:did_show",
            "dlg:status(did_show)",
            "dlg:will_hide",
            "dlg:status(will_hide)",
            "dlg:did_hide",
            "dlg:status(did_hide)",
        ]
    );
}

#[test]
fn timed_callbacks_wait_for_the_transition() {
    let mut page = Page::new();
    page.add(&OverlayMarkup::new("dlg").transition_ms(250));
    let mut engine = page.into_engine();
    let recorder = Recorder::new();

    engine.show("#dlg", &recorder.options("dlg"));
    assert_eq!(recorder.events(), vec!["dlg:will_show", "dlg:status(will_show)"]);
    engine.advance(ms(249));
    assert_eq!(recorder.count("dlg:did_show"), 0);
    engine.advance(ms(1));
    assert_eq!(recorder.count("dlg:did_show"), 1);
}

#[test]
fn transition_option_writes_custom_properties() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").backdrop());
    let mut engine = page.into_engine();

    let options = OverlayOptions::new().transition_duration(ms(400));
    assert_eq!(engine.show("#dlg", &options), Outcome::Showing);
    let doc = engine.document();
    for property in [
        "--prompt-transition-duration-content",
        "--prompt-fast-transition-duration-content",
    ] {
        assert_eq!(doc.style_property(dlg.content, property), Some("400ms"));
    }
    let backdrop = dlg.backdrop.unwrap();
    for property in [
        "--prompt-transition-duration-backdrop",
        "--prompt-fast-transition-duration-backdrop",
    ] {
        assert_eq!(doc.style_property(backdrop, property), Some("400ms"));
    }
    engine.advance(ms(399));
    assert_eq!(engine.phase(dlg.root), Phase::Opening);
    engine.advance(ms(1));
    assert_eq!(engine.phase(dlg.root), Phase::Open);
}

#[test]
fn markers_expose_transition_phases() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(100));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    assert!(engine.document().has_data(dlg.root, "isshowing"));
    assert!(engine.document().has_data(dlg.root, "isopen"));
    engine.run_until_idle();
    assert!(!engine.document().has_data(dlg.root, "isshowing"));

    engine.hide("#dlg", &OverlayOptions::new());
    // The open marker goes first so the closing transition can run.
    assert!(!engine.document().has_data(dlg.root, "isopen"));
    assert!(engine.document().has_data(dlg.root, "ishiding"));
    engine.run_until_idle();
    assert!(!engine.document().has_data(dlg.root, "ishiding"));
}

#[test]
fn toggle_follows_rendered_visibility() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();

    assert_eq!(engine.toggle("#dlg", &OverlayOptions::new()), Outcome::Shown);
    engine.run_until_idle();
    assert_eq!(engine.toggle("#dlg", &OverlayOptions::new()), Outcome::Hidden);
    engine.run_until_idle();
    assert!(!engine.is_open(dlg.root));
}

#[test]
fn toggle_treats_zero_size_content_as_hidden() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();
    engine.show("#dlg", &OverlayOptions::new());
    engine.run_until_idle();

    engine
        .document_mut()
        .set_size(dlg.content, veil_core::Size::ZERO);
    assert_eq!(engine.toggle("#dlg", &OverlayOptions::new()), Outcome::Unchanged);
    assert!(engine.is_open(dlg.root));
}

#[test]
fn native_open_follows_details_and_dialog() {
    let mut page = Page::new();
    let details = page.add(&OverlayMarkup::new("disclosure").details().without_touch());
    let dialog = page.add(&OverlayMarkup::new("native").dialog());
    let mut engine = page.into_engine();

    engine.show("#disclosure", &OverlayOptions::new());
    engine.show("#native", &OverlayOptions::new());
    assert!(engine.document().has_attribute(details.root, "open"));
    assert!(engine.document().has_attribute(dialog.content, "open"));

    engine.run_until_idle();
    engine.hide("#disclosure", &OverlayOptions::new());
    engine.hide("#native", &OverlayOptions::new());
    assert!(!engine.document().has_attribute(details.root, "open"));
    assert!(!engine.document().has_attribute(dialog.content, "open"));
}

#[test]
fn details_rendered_open_is_shown_on_mount() {
    let mut page = Page::new();
    let details = page.add(
        &OverlayMarkup::new("disclosure")
            .details()
            .rendered_open()
            .without_touch(),
    );
    let mut engine = page.into_engine();
    let mut hook = OverlayHook::new(details.root);

    assert_eq!(hook.mounted(&mut engine), Outcome::Ready);
    assert!(engine.is_open(details.root));
}

#[test]
fn details_rendered_open_stays_put_for_hide_mode() {
    let mut page = Page::new();
    let details = page.add(
        &OverlayMarkup::new("disclosure")
            .details()
            .rendered_open()
            .without_touch(),
    );
    let mut engine = page.into_engine();
    let mut hook = OverlayHook::new(details.root);

    assert_eq!(
        hook.hide(&mut engine, Handle::Bound, &OverlayOptions::new()),
        Outcome::Unchanged
    );
    assert!(!engine.is_open(details.root));
}

#[test]
fn details_closing_is_not_reopened_by_remount() {
    let mut page = Page::new();
    let details = page.add(
        &OverlayMarkup::new("disclosure")
            .details()
            .without_touch()
            .transition_ms(600),
    );
    let mut engine = page.into_engine();
    let mut hook = OverlayHook::new(details.root);
    hook.show(&mut engine, Handle::Bound, &OverlayOptions::new());
    engine.run_until_idle();

    assert_eq!(
        hook.hide(&mut engine, Handle::Bound, &OverlayOptions::new()),
        Outcome::Hiding
    );
    engine.advance(ms(350));
    assert!(!engine.is_locked(details.root));
    assert!(engine.document().has_attribute(details.root, "open"));

    assert_eq!(hook.mounted(&mut engine), Outcome::Ready);
    assert_eq!(engine.phase(details.root), Phase::Closing);

    engine.run_until_idle();
    assert_eq!(engine.phase(details.root), Phase::Closed);
    assert!(!engine.document().has_attribute(details.root, "open"));
}

#[test]
fn instances_do_not_share_locks() {
    let mut page = Page::new();
    let a = page.add(&OverlayMarkup::new("a"));
    let b = page.add(&OverlayMarkup::new("b"));
    let mut engine = page.into_engine();

    assert_eq!(engine.show("#a", &OverlayOptions::new()), Outcome::Shown);
    assert_eq!(engine.show("#b", &OverlayOptions::new()), Outcome::Shown);
    assert!(engine.is_open(a.root) && engine.is_open(b.root));
}

#[test]
fn pump_follows_the_wall_clock() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(1));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    std::thread::sleep(ms(5));
    engine.pump();
    assert_eq!(engine.phase(dlg.root), Phase::Open);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn any_duration_settles_open_then_unlocked(duration in strategies::transition_ms()) {
        let mut page = Page::new();
        let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(duration));
        let mut engine = page.into_engine();

        let outcome = engine.show("#dlg", &OverlayOptions::new());
        prop_assert!(outcome.is_started());
        engine.advance(ms(duration));
        prop_assert_eq!(engine.phase(dlg.root), Phase::Open);
        engine.advance(DEFAULT_LOCK_DURATION);
        prop_assert!(engine.is_open(dlg.root));
        prop_assert!(!engine.is_locked(dlg.root));
    }

    #[test]
    fn any_action_sequence_settles_consistently(
        duration in strategies::transition_ms(),
        steps in strategies::steps(24),
    ) {
        let mut page = Page::new();
        let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(duration));
        let mut engine = page.into_engine();
        engine.show("#dlg", &OverlayOptions::new());

        for step in steps {
            match step {
                Step::Show => { engine.show("#dlg", &OverlayOptions::new()); }
                Step::Hide => { engine.hide("#dlg", &OverlayOptions::new()); }
                Step::Toggle => { engine.toggle("#dlg", &OverlayOptions::new()); }
                Step::Escape => { engine.dispatch(&Event::key(veil_core::Key::Escape)); }
                Step::ClickToggle => { engine.dispatch(&Event::click(dlg.toggle())); }
                Step::ClickTouch => { engine.dispatch(&Event::click(dlg.touch())); }
                Step::Wait(n) => engine.advance(ms(n)),
            }
        }
        engine.run_until_idle();

        // Lock always released; no transition left half-way.
        prop_assert!(!engine.is_locked(dlg.root));
        let phase = engine.phase(dlg.root);
        prop_assert!(matches!(phase, Phase::Open | Phase::Closed));
        prop_assert_eq!(engine.is_open(dlg.root), phase == Phase::Open);
        let flags = engine.instance(dlg.root).unwrap().flags();
        prop_assert_eq!(
            veil_overlay::StateFlags::read_from(engine.document(), dlg.root),
            flags
        );
    }
}
