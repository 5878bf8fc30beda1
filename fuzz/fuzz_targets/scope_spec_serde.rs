#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine_rules::{classify, ScopeSpec, ScopeTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let Ok(specs) = serde_json::from_str::<Vec<ScopeSpec>>(s) else {
            return;
        };
        if let Ok(table) = ScopeTable::from_specs(&specs) {
            for scope in table.scopes() {
                let result = classify(["package.json", s], scope);
                assert!(result.allowed.contains("package.json"));
            }
        }
    }
});
