#![no_main]

use libfuzzer_sys::fuzz_target;
use sparfront::SparqlParser;

fuzz_target!(|data: &str| {
    if let Ok(update) = SparqlParser::new().parse_update(data) {
        let _ = update.to_string();
        let _ = update.to_sse();
    }
});
