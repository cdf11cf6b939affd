#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_overlay::timing::{parse_time, parse_time_list};

fuzz_target!(|data: &str| {
    let list = parse_time_list(data);
    assert!(!list.is_empty());
    let _ = parse_time(data);
});
