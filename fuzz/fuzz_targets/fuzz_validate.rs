#![no_main]

use escalation_paths::validate::validate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let doc = match escalation_paths::parse(&s) {
        Ok(d) => d,
        Err(_) => return,
    };

    let first = validate(&doc);
    let second = validate(&doc);
    if first != second {
        panic!(
            "Validation is not deterministic.\nInput (lossy): {:?}\nFirst: {:?}\nSecond: {:?}",
            s.get(..200).unwrap_or(&s),
            first.errors,
            second.errors,
        );
    }

    // A fatal error is always the only error.
    if first.errors.iter().any(|e| e.kind.is_fatal()) && first.errors.len() != 1 {
        panic!("Fatal error reported alongside others: {:?}", first.errors);
    }
});
