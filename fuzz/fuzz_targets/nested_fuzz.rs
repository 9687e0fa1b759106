//! Fuzz test for the nested-relation parsers
//!
//! Feeds arbitrary UTF-8 to the flat and tree parsers in both modes.
//!
//! Run with: cargo +nightly fuzz run nested_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_dsl::{
    flatten_paths, parse_nested_flat, parse_nested_flat_with, parse_nested_tree,
    parse_nested_tree_with, pretty_print_nested, NestedNode, ParseOptions,
};

fn count_nodes(nodes: &[NestedNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Lenient parsing accepts anything.
    let paths = parse_nested_flat(input);
    let tree = parse_nested_tree(input);
    for path in &paths {
        assert!(!path.trim().is_empty(), "blank path from {input:?}");
    }

    let _ = pretty_print_nested(&tree);

    // Strict errors always point inside the input.
    let strict = ParseOptions::strict();
    match parse_nested_flat_with(input, &strict) {
        Ok(strict_paths) => assert_eq!(strict_paths, paths),
        Err(e) => assert!(e.offset <= input.len(), "offset {} past end", e.offset),
    }
    match parse_nested_tree_with(input, &strict) {
        Ok(strict_tree) => assert_eq!(strict_tree, tree),
        Err(e) => assert!(e.offset <= input.len(), "offset {} past end", e.offset),
    }

    assert_eq!(flatten_paths(&tree).len(), count_nodes(&tree));
});
