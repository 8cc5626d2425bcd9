#![no_main]

use escalation_paths::text::WrapHeuristic;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let h = WrapHeuristic::default();

    let breaks = h.suspicious_breaks(&s);
    if !s.contains('\n') && breaks != 0 {
        panic!("Single-line text reported {} suspicious breaks: {:?}", breaks, s);
    }
    if breaks > s.lines().count() {
        panic!("More breaks ({}) than lines in {:?}", breaks, s);
    }
});
