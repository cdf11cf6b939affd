#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_core::{Document, Selector};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(selector) = Selector::parse(input) else {
        return;
    };
    // A parsed selector must be safe to evaluate and to re-parse.
    let mut doc = Document::new();
    let body = doc.body();
    let node = doc.create_element("div");
    let _ = doc.append_child(body, node);
    doc.set_data(node, "prompt", "");
    let _ = selector.matches(&doc, node);
    let _ = doc.query_selector_all(body, &selector);
    let _ = Selector::parse(selector.as_str());
});
