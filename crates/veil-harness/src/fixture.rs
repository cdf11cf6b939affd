#![forbid(unsafe_code)]

//! Overlay markup fixtures.
//!
//! [`OverlayMarkup`] describes one overlay the way an author would write it;
//! [`Page`] stacks several into a document and hands back an engine over the
//! reference stylesheet.

use veil_core::{Document, NodeId, Size};
use veil_overlay::OverlayEngine;
use veil_style::Stylesheet;

/// Reference stylesheet.
///
/// Closed content is removed from layout, hidden content fades out, and the
/// content/backdrop transition lengths come from the custom properties the
/// engine writes.
pub const STANDARD_CSS: &str = r"
/* closed: out of layout */
[data-prompt]:not([data-isopen]):not([data-ishiding]) [data-content] { display: none; }
[data-prompt]:not([data-isopen]) [data-content] { opacity: 0; }
[data-content] { transition-duration: var(--prompt-transition-duration-content, 0s); }
[data-backdrop] { transition-duration: var(--prompt-transition-duration-backdrop, 0s); }
";

/// Parse [`STANDARD_CSS`].
pub fn standard_stylesheet() -> Stylesheet {
    Stylesheet::parse(STANDARD_CSS).unwrap_or_else(|err| panic!("STANDARD_CSS: {err}"))
}

/// Declarative description of one overlay.
#[derive(Debug, Clone, Default)]
pub struct OverlayMarkup {
    id: String,
    modal: bool,
    escapable: Option<bool>,
    focus_first: bool,
    focus_selector: Option<String>,
    details: bool,
    dialog: bool,
    menu: bool,
    touch: bool,
    backdrop: bool,
    toggle: bool,
    open: bool,
    transition_ms: Option<u64>,
    buttons: usize,
    input: bool,
}

impl OverlayMarkup {
    /// `<div data-prompt id=…>` with a content panel, a touch layer, and a
    /// toggle button.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            touch: true,
            toggle: true,
            ..Self::default()
        }
    }

    /// `data-ismodal`.
    #[must_use]
    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    /// `data-isescapable="false"` (or `"true"`).
    #[must_use]
    pub fn escapable(mut self, escapable: bool) -> Self {
        self.escapable = Some(escapable);
        self
    }

    /// `data-isfocusfirst`.
    #[must_use]
    pub fn focus_first(mut self) -> Self {
        self.focus_first = true;
        self
    }

    /// `data-focusfirst="<selector>"`.
    #[must_use]
    pub fn focus_selector(mut self, selector: &str) -> Self {
        self.focus_selector = Some(selector.to_owned());
        self
    }

    /// `<details>` root with a `<summary>` toggle.
    #[must_use]
    pub fn details(mut self) -> Self {
        self.details = true;
        self
    }

    /// `<details open>`.
    #[must_use]
    pub fn rendered_open(mut self) -> Self {
        self.open = true;
        self
    }

    /// `<dialog>` content.
    #[must_use]
    pub fn dialog(mut self) -> Self {
        self.dialog = true;
        self
    }

    /// `role="menu"` content whose items are `tabindex="0"` elements.
    #[must_use]
    pub fn menu(mut self) -> Self {
        self.menu = true;
        self
    }

    #[must_use]
    pub fn without_touch(mut self) -> Self {
        self.touch = false;
        self
    }

    #[must_use]
    pub fn without_toggle(mut self) -> Self {
        self.toggle = false;
        self
    }

    #[must_use]
    pub fn backdrop(mut self) -> Self {
        self.backdrop = true;
        self
    }

    /// Content transition length, via the content duration custom property.
    #[must_use]
    pub fn transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = Some(ms);
        self
    }

    /// Number of buttons (or menu items) inside the content.
    #[must_use]
    pub fn buttons(mut self, count: usize) -> Self {
        self.buttons = count;
        self
    }

    /// A text input after the buttons.
    #[must_use]
    pub fn input(mut self) -> Self {
        self.input = true;
        self
    }

    /// Append the overlay under `parent`.
    pub fn build(&self, doc: &mut Document, parent: NodeId) -> OverlayNodes {
        let root = append(doc, parent, if self.details { "details" } else { "div" });
        doc.set_data(root, "prompt", "");
        doc.set_attribute(root, "id", self.id.clone());
        if self.modal {
            doc.set_data(root, "ismodal", "");
        }
        if let Some(escapable) = self.escapable {
            doc.set_data(root, "isescapable", escapable.to_string());
        }
        if self.focus_first {
            doc.set_data(root, "isfocusfirst", "");
        }
        if let Some(selector) = &self.focus_selector {
            doc.set_data(root, "focusfirst", selector.clone());
        }
        if self.open {
            doc.set_attribute(root, "open", "");
        }

        let toggle = match (self.details, self.toggle) {
            (true, _) => Some(append(doc, root, "summary")),
            (false, true) => {
                let button = append(doc, root, "button");
                doc.set_data(button, "toggle", "");
                Some(button)
            }
            (false, false) => None,
        };
        let backdrop = self.backdrop.then(|| {
            let node = append(doc, root, "div");
            doc.set_data(node, "backdrop", "");
            node
        });
        let container = if self.touch {
            let node = append(doc, root, "div");
            doc.set_data(node, "touch", "");
            node
        } else {
            root
        };
        let touch = self.touch.then_some(container);

        let content = append(doc, container, if self.dialog { "dialog" } else { "div" });
        doc.set_data(content, "content", "");
        doc.set_size(content, Size::new(320, 200));
        if self.menu {
            doc.set_attribute(content, "role", "menu");
        }
        if let Some(ms) = self.transition_ms {
            doc.set_style_property(
                content,
                "--prompt-transition-duration-content",
                format!("{ms}ms"),
            );
        }

        let mut focusables = Vec::with_capacity(self.buttons + 1);
        for i in 0..self.buttons {
            let node = if self.menu {
                let item = append(doc, content, "div");
                doc.set_attribute(item, "role", "menuitem");
                doc.set_attribute(item, "tabindex", "0");
                item
            } else {
                append(doc, content, "button")
            };
            doc.set_attribute(node, "id", format!("{}-item-{i}", self.id));
            focusables.push(node);
        }
        if self.input {
            let node = append(doc, content, "input");
            doc.set_attribute(node, "type", "text");
            focusables.push(node);
        }

        OverlayNodes {
            root,
            content,
            touch,
            backdrop,
            toggle,
            focusables,
        }
    }
}

/// Elements created by [`OverlayMarkup::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayNodes {
    pub root: NodeId,
    pub content: NodeId,
    pub touch: Option<NodeId>,
    pub backdrop: Option<NodeId>,
    pub toggle: Option<NodeId>,
    /// Buttons, menu items, and the input, in document order.
    pub focusables: Vec<NodeId>,
}

impl OverlayNodes {
    /// The touch layer; panics when the fixture was built without one.
    pub fn touch(&self) -> NodeId {
        self.touch.unwrap_or_else(|| panic!("overlay {} has no touch layer", self.root))
    }

    /// The toggle; panics when the fixture was built without one.
    pub fn toggle(&self) -> NodeId {
        self.toggle.unwrap_or_else(|| panic!("overlay {} has no toggle", self.root))
    }
}

/// A document holding any number of overlays and some page chrome.
#[derive(Debug)]
pub struct Page {
    doc: Document,
    /// A focusable page button outside every overlay.
    pub outside: NodeId,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let mut doc = Document::new();
        let body = doc.body();
        let outside = append(&mut doc, body, "button");
        doc.set_attribute(outside, "id", "page-button");
        Self { doc, outside }
    }

    /// Append an overlay to the body.
    pub fn add(&mut self, markup: &OverlayMarkup) -> OverlayNodes {
        let body = self.doc.body();
        markup.build(&mut self.doc, body)
    }

    /// Append an overlay inside another overlay's content.
    pub fn add_inside(&mut self, parent: &OverlayNodes, markup: &OverlayMarkup) -> OverlayNodes {
        markup.build(&mut self.doc, parent.content)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Engine over the page with the reference stylesheet.
    pub fn into_engine(self) -> OverlayEngine {
        OverlayEngine::new(self.doc, standard_stylesheet())
    }
}

fn append(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let node = doc.create_element(tag);
    doc.append_child(parent, node)
        .unwrap_or_else(|err| panic!("fixture append: {err}"));
    node
}
