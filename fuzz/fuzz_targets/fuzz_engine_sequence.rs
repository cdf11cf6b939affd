#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_core::{Event, Key};
use veil_harness::{OverlayMarkup, Page};
use veil_overlay::{OverlayOptions, Phase, ToggleCommand};

#[derive(Debug, Arbitrary)]
enum Op {
    Show(bool),
    Hide(bool),
    Toggle(bool),
    Command { second: bool, show: bool, ms: u8 },
    Escape,
    ClickTouch(bool),
    ClickToggle(bool),
    Advance(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    modal: bool,
    nested: bool,
    transition_ms: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut page = Page::new();
    let first = page.add(
        &OverlayMarkup::new("a")
            .transition_ms(u64::from(input.transition_ms % 1000))
            .buttons(1),
    );
    let markup = OverlayMarkup::new("b").escapable(!input.modal);
    let markup = if input.modal { markup.modal() } else { markup };
    let second = if input.nested {
        page.add_inside(&first, &markup)
    } else {
        page.add(&markup)
    };
    let mut engine = page.into_engine();
    let pick = |b: bool| if b { &second } else { &first };

    for op in input.ops.iter().take(64) {
        match *op {
            Op::Show(b) => {
                engine.show(pick(b).root, &OverlayOptions::new());
            }
            Op::Hide(b) => {
                engine.hide(pick(b).root, &OverlayOptions::new());
            }
            Op::Toggle(b) => {
                engine.toggle(pick(b).root, &OverlayOptions::new());
            }
            Op::Command { second, show, ms } => {
                let cmd = if show {
                    ToggleCommand::show()
                } else {
                    ToggleCommand::hide()
                };
                engine.dispatch_command(pick(second).root, &cmd.with_transition_ms(u64::from(ms)));
            }
            Op::Escape => {
                engine.dispatch(&Event::key(Key::Escape));
            }
            Op::ClickTouch(b) => {
                if let Some(touch) = pick(b).touch {
                    engine.dispatch(&Event::click(touch));
                }
            }
            Op::ClickToggle(b) => {
                if let Some(toggle) = pick(b).toggle {
                    engine.dispatch(&Event::click(toggle));
                }
            }
            Op::Advance(ms) => engine.advance(Duration::from_millis(u64::from(ms))),
        }
    }

    engine.run_until_idle();
    for nodes in [&first, &second] {
        let phase = engine.phase(nodes.root);
        assert!(matches!(phase, Phase::Open | Phase::Closed), "{phase:?}");
        assert!(!engine.is_locked(nodes.root));
    }
});
