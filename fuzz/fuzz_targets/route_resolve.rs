#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine_rules::{default_route_specs, RouteTable};

fuzz_target!(|data: &[u8]| {
    let path = String::from_utf8_lossy(data);
    let Ok(table) = RouteTable::from_specs(&default_route_specs()) else {
        return;
    };
    let matched = table.resolve(&path);
    if path.starts_with('/') {
        assert!(matched.forward_path.starts_with('/'));
    }
    let _ = matched.path_and_query(None);
});
