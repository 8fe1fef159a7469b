#![no_main]

use libfuzzer_sys::fuzz_target;
use sparfront::SparqlParser;

fuzz_target!(|data: &str| {
    if let Ok(query) = SparqlParser::new().parse_query(data) {
        // Rendering must not fail on any accepted query
        let _ = query.to_string();
        let _ = query.to_sse();
    }
});
