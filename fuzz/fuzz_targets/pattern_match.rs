#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine_rules::PathPattern;

// First line is the pattern, the rest is the path.
fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let (pattern, path) = s.split_once('\n').unwrap_or((&s, ""));
    if let Ok(pattern) = PathPattern::parse(pattern) {
        let _ = pattern.matches(path);
    }
});
