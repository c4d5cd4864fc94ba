#![no_main]
use docquery::config::QueryConfig;
use docquery::engine::Engine;
use docquery::features::{QueryDescriptor, QueryTranslator};
use libfuzzer_sys::fuzz_target;

// Any query string must plan or be rejected as a bad request, never panic.
fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let Ok(qs) = std::str::from_utf8(data) else {
        return;
    };
    let engine = Engine::new();
    let cfg = QueryConfig::default();
    let d = QueryDescriptor::from_query_string(qs);
    if let Err(e) = QueryTranslator::new(&engine, &cfg).plan(&d) {
        assert!(e.is_bad_request());
    }
});
