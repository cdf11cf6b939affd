#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_core::Document;
use veil_style::{StyleSource, Stylesheet};

fuzz_target!(|data: &[u8]| {
    let Ok(css) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(sheet) = Stylesheet::parse(css) else {
        return;
    };
    let mut doc = Document::new();
    let body = doc.body();
    let node = doc.create_element("div");
    let _ = doc.append_child(body, node);
    doc.set_data(node, "content", "");
    let style = sheet.computed_style(&doc, node);
    let _ = veil_overlay::timing::measure(&style);
});
