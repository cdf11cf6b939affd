#![forbid(unsafe_code)]

//! Integration tests: Escape closes only the top-most escapable overlay.

use veil_core::{Event, EventOutcome, Key, KeyEvent, Modifiers};
use veil_harness::{OverlayMarkup, Page, Recorder};
use veil_overlay::{OverlayHook, OverlayOptions};

fn escape() -> Event {
    Event::key(Key::Escape)
}

#[test]
fn escape_closes_top_then_next() {
    let mut page = Page::new();
    let a = page.add(&OverlayMarkup::new("a"));
    let b = page.add(&OverlayMarkup::new("b"));
    let mut engine = page.into_engine();

    engine.show("#a", &OverlayOptions::new());
    engine.show("#b", &OverlayOptions::new());
    engine.run_until_idle();
    assert_eq!(engine.escape_stack(), vec![a.root, b.root]);

    assert_eq!(engine.dispatch(&escape()), EventOutcome::HANDLED);
    assert!(engine.is_open(a.root));
    assert!(!engine.is_open(b.root));

    assert_eq!(engine.dispatch(&escape()), EventOutcome::HANDLED);
    assert!(!engine.is_open(a.root));
    assert_eq!(engine.dispatch(&escape()), EventOutcome::IGNORED);
}

#[test]
fn stack_order_is_document_order_not_open_order() {
    let mut page = Page::new();
    let a = page.add(&OverlayMarkup::new("a"));
    let b = page.add(&OverlayMarkup::new("b"));
    let mut engine = page.into_engine();

    engine.show("#b", &OverlayOptions::new());
    engine.show("#a", &OverlayOptions::new());
    assert_eq!(engine.top_most(), Some(b.root));
    engine.dispatch(&escape());
    assert!(engine.is_open(a.root));
    assert!(!engine.is_open(b.root));
}

#[test]
fn nested_overlay_is_above_its_parent() {
    let mut page = Page::new();
    let outer = page.add(&OverlayMarkup::new("outer"));
    let inner = page.add_inside(&outer, &OverlayMarkup::new("inner"));
    let mut engine = page.into_engine();

    engine.show("#outer", &OverlayOptions::new());
    engine.show("#inner", &OverlayOptions::new());
    assert_eq!(engine.top_most(), Some(inner.root));
    engine.dispatch(&escape());
    assert!(engine.is_open(outer.root));
    assert!(!engine.is_open(inner.root));
}

#[test]
fn lone_modal_closes_on_escape() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").modal());
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    assert_eq!(engine.dispatch(&escape()), EventOutcome::HANDLED);
    assert!(!engine.is_open(dlg.root));
}

#[test]
fn unescapable_overlay_ignores_escape() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").modal().escapable(false));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    assert!(engine.escape_stack().is_empty());
    assert_eq!(engine.dispatch(&escape()), EventOutcome::IGNORED);
    assert!(engine.is_open(dlg.root));
}

#[test]
fn unescapable_top_is_skipped() {
    let mut page = Page::new();
    let a = page.add(&OverlayMarkup::new("a"));
    let b = page.add(&OverlayMarkup::new("b").escapable(false));
    let mut engine = page.into_engine();

    engine.show("#a", &OverlayOptions::new());
    engine.show("#b", &OverlayOptions::new());
    engine.dispatch(&escape());
    assert!(!engine.is_open(a.root));
    assert!(engine.is_open(b.root));
}

#[test]
fn escape_bypasses_the_lock() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg").transition_ms(200));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    assert!(engine.is_locked(dlg.root));
    assert_eq!(engine.dispatch(&escape()), EventOutcome::HANDLED);
    engine.run_until_idle();
    assert!(!engine.is_open(dlg.root));
}

#[test]
fn escape_uses_the_stored_hook_options() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();
    let recorder = Recorder::new();

    let mut hook = OverlayHook::new(dlg.root).with_options(recorder.options("dlg"));
    hook.mounted(&mut engine);
    hook.show(&mut engine, dlg.root, &OverlayOptions::new());
    recorder.clear();

    engine.dispatch(&escape());
    assert_eq!(recorder.count("dlg:will_hide"), 1);
    assert_eq!(recorder.count("dlg:did_hide"), 1);
}

#[test]
fn only_escape_key_is_handled() {
    let mut page = Page::new();
    let dlg = page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();

    engine.show("#dlg", &OverlayOptions::new());
    for key in [Key::Enter, Key::Tab, Key::Space, Key::Char('q')] {
        assert_eq!(engine.dispatch(&Event::key(key)), EventOutcome::IGNORED);
    }
    assert!(engine.is_open(dlg.root));

    let shifted = Event::Key(KeyEvent::new(Key::Escape).with_modifiers(Modifiers::SHIFT));
    assert_eq!(engine.dispatch(&shifted), EventOutcome::HANDLED);
}

#[test]
fn escape_is_inert_until_first_show() {
    let mut page = Page::new();
    page.add(&OverlayMarkup::new("dlg"));
    let mut engine = page.into_engine();

    let mut hook = OverlayHook::default();
    hook.init(&mut engine, "#dlg", &OverlayOptions::new());
    assert!(!engine.is_escape_attached());
    assert_eq!(engine.dispatch(&escape()), EventOutcome::IGNORED);
}
