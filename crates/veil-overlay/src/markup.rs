#![forbid(unsafe_code)]

//! Declarative markup contract.
//!
//! Overlays are described entirely by attributes on ordinary elements. The
//! engine reads the structural and behavior attributes and writes the state
//! markers, so stylesheets can key transitions off them.

use std::sync::LazyLock;

use veil_core::Selector;

/// Overlay root.
pub const ROOT_SELECTOR: &str = "[data-prompt]";
/// Content panel inside the root.
pub const CONTENT_SELECTOR: &str = "[data-content]";
/// Outside-click layer.
pub const TOUCH_SELECTOR: &str = "[data-touch]";
/// Backdrop layer.
pub const BACKDROP_SELECTOR: &str = "[data-backdrop]";
/// Toggle control.
pub const TOGGLE_SELECTOR: &str = "[data-toggle]";
/// Toggle fallback for `<details>` roots.
pub const SUMMARY_SELECTOR: &str = "summary";

// --- Behavior attributes (read) ---

/// `data-ismodal`: outside clicks do not close.
pub const IS_MODAL: &str = "ismodal";
/// `data-isescapable="false"` opts out of Escape.
pub const IS_ESCAPABLE: &str = "isescapable";
/// `data-isfocusfirst`: focus the first focusable element on open.
pub const IS_FOCUS_FIRST: &str = "isfocusfirst";
/// `data-focusfirst="<selector>"`: element to focus on open.
pub const FOCUS_FIRST: &str = "focusfirst";

// --- State markers (written) ---

/// `data-isopen`.
pub const IS_OPEN: &str = "isopen";
/// `data-isshowing`.
pub const IS_SHOWING: &str = "isshowing";
/// `data-ishiding`.
pub const IS_HIDING: &str = "ishiding";
/// `data-islocked`.
pub const IS_LOCKED: &str = "islocked";
/// `data-registered`: listeners already attached to this element.
pub const REGISTERED: &str = "registered";

/// Native open attribute of `<details>` and `<dialog>`.
pub const NATIVE_OPEN: &str = "open";

/// Custom properties written on the content by the `transition_duration` option.
pub const CONTENT_DURATION_PROPERTIES: [&str; 2] = [
    "--prompt-transition-duration-content",
    "--prompt-fast-transition-duration-content",
];

/// Custom properties written on the backdrop by the `transition_duration` option.
pub const BACKDROP_DURATION_PROPERTIES: [&str; 2] = [
    "--prompt-transition-duration-backdrop",
    "--prompt-fast-transition-duration-backdrop",
];

/// Parsed structural selectors, shared by every engine.
pub(crate) struct Selectors {
    pub root: Selector,
    pub content: Selector,
    pub touch: Selector,
    pub backdrop: Selector,
    pub toggle: Selector,
    pub summary: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| {
    let parse = |s: &str| Selector::parse(s).expect("built-in selector is valid");
    Selectors {
        root: parse(ROOT_SELECTOR),
        content: parse(CONTENT_SELECTOR),
        touch: parse(TOUCH_SELECTOR),
        backdrop: parse(BACKDROP_SELECTOR),
        toggle: parse(TOGGLE_SELECTOR),
        summary: parse(SUMMARY_SELECTOR),
    }
});

pub(crate) fn selectors() -> &'static Selectors {
    &SELECTORS
}
