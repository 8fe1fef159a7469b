#![no_main]

use libfuzzer_sys::fuzz_target;
use sparfront::media_type::{MediaType, parse_accept_header, select_media_type};

fuzz_target!(|data: &str| {
    let candidates = MediaType::well_known().collect::<Vec<_>>();
    let parsed = parse_accept_header(data);
    let selected = select_media_type(data, &candidates);
    if data.trim().is_empty() {
        assert_eq!(selected.ok().flatten().as_ref(), candidates.first());
    } else {
        assert_eq!(parsed.is_ok(), selected.is_ok());
        if let Ok(Some(selected)) = selected {
            assert!(candidates.contains(&selected));
        }
    }
});
