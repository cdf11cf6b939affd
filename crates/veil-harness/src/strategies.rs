#![forbid(unsafe_code)]

//! `proptest` strategies for overlay scenarios.

use std::time::Duration;

use proptest::prelude::*;

/// Transition lengths from instant to a few seconds.
pub fn transition_ms() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), 1u64..50, 50u64..3_000]
}

/// A CSS `<time>` value paired with its expected duration.
pub fn css_time() -> impl Strategy<Value = (String, Duration)> {
    prop_oneof![
        (0u64..10_000).prop_map(|ms| (format!("{ms}ms"), Duration::from_millis(ms))),
        (0u64..100).prop_map(|tenths| (
            format!("{}.{}s", tenths / 10, tenths % 10),
            Duration::from_millis(tenths * 100)
        )),
    ]
}

/// A user action against one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Show,
    Hide,
    Toggle,
    Escape,
    ClickToggle,
    ClickTouch,
    Wait(u64),
}

pub fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Show),
        Just(Step::Hide),
        Just(Step::Toggle),
        Just(Step::Escape),
        Just(Step::ClickToggle),
        Just(Step::ClickTouch),
        (0u64..600).prop_map(Step::Wait),
    ]
}

/// Up to `max` steps.
pub fn steps(max: usize) -> impl Strategy<Value = Vec<Step>> {
    proptest::collection::vec(step(), 0..max)
}
