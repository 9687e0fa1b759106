//! Fuzz test for filter and payload decoding
//!
//! Run with: cargo +nightly fuzz run filter_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_core::{build_meta, normalize, Filter, QueryPayload};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(filter) = Filter::from_json(input) {
        // Whatever decodes re-encodes and decodes to the same tree.
        let encoded = filter.to_value().to_string();
        let decoded = Filter::from_json(&encoded).expect("re-encoded filter decodes");
        assert_eq!(decoded.to_value(), filter.to_value());
        let _ = filter.relation_prefixes();
    }

    if let Ok(mut payload) = QueryPayload::from_json(input) {
        normalize(&mut payload);
        if let Some(meta) = build_meta(&payload, 0) {
            assert_eq!(meta.count, Some(0));
            if payload.limit.map_or(true, |limit| limit <= 0) {
                assert!(meta.page_count.is_none());
            }
        }
    }
});
