//! Property-Based Tests for the Nested-Relation Parsers
//!
//! Properties:
//! - Pretty-printing a tree and parsing it back yields the same tree
//! - The tree parser and flat parser agree on paths for query-free input
//! - The lenient parsers accept any input without panicking
//! - Strict parsing of printed trees never fails

use proptest::prelude::*;
use quarry_core::{QueryConfig, QueryPayload};
use quarry_dsl::{
    flatten_paths, parse_nested_flat, parse_nested_flat_with, parse_nested_tree,
    parse_nested_tree_with, pretty_print_nested, NestedNode, ParseErrorKind, ParseOptions,
};
use quarry_test_utils::generators::arb_nested_tree;
use quarry_test_utils::init_test_tracing;

fn strip_queries(nodes: &[NestedNode]) -> Vec<NestedNode> {
    nodes
        .iter()
        .map(|n| NestedNode {
            name: n.name.clone(),
            query: None,
            children: strip_queries(&n.children),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_tree_round_trip(tree in arb_nested_tree()) {
        let text = pretty_print_nested(&tree);
        prop_assert_eq!(parse_nested_tree(&text), tree.clone());
        prop_assert_eq!(parse_nested_tree_with(&text, &ParseOptions::strict()).unwrap(), tree);
    }

    #[test]
    fn prop_flat_matches_tree_paths(tree in arb_nested_tree()) {
        let text = pretty_print_nested(&strip_queries(&tree));
        prop_assert_eq!(parse_nested_flat(&text), flatten_paths(&tree));
        prop_assert_eq!(
            parse_nested_flat_with(&text, &ParseOptions::strict()).unwrap(),
            flatten_paths(&tree)
        );
    }

    #[test]
    fn prop_lenient_parsers_are_total(input in r#"[a-z{},"\\: \[\]0-9]{0,48}"#) {
        let _ = parse_nested_flat(&input);
        let _ = parse_nested_tree(&input);
    }

    /// Surrounding the whole text with one brace pair changes nothing.
    #[test]
    fn prop_enclosing_braces_are_transparent(tree in arb_nested_tree()) {
        let text = pretty_print_nested(&tree);
        prop_assert_eq!(parse_nested_tree(&format!("{{{}}}", text)), parse_nested_tree(&text));
    }
}

#[test]
fn test_flat_example() {
    assert_eq!(parse_nested_flat("a{b,c{d}}"), vec!["a", "a.b", "a.c", "a.c.d"]);
}

#[test]
fn test_tree_example() {
    let tree = parse_nested_tree(r#"a{ {"where":{"x":1}} , b{c} }"#);
    let expected_query = QueryPayload::from_json(r#"{"where":{"x":1}}"#).unwrap();
    assert_eq!(
        tree,
        vec![NestedNode::new("a")
            .with_query(expected_query)
            .with_child(NestedNode::new("b").with_child(NestedNode::new("c")))]
    );
}

#[test]
fn test_nested_string_in_embedded_query() {
    let tree = parse_nested_tree(r#"a{ {"nested":"x{y}","select":["id"]}, b }"#);
    let query = tree[0].query.as_ref().unwrap();
    assert_eq!(query.nested, "x{y}");
    assert_eq!(parse_nested_flat(&query.nested), vec!["x", "x.y"]);
    assert_eq!(tree[0].children, vec![NestedNode::new("b")]);
}

#[test]
fn test_options_from_config() {
    init_test_tracing();

    let config = QueryConfig::from_toml_str(
        r#"
        nested_parse_mode = "strict"
        max_nested_depth = 2
        "#,
    )
    .unwrap();
    let options = ParseOptions::from_config(&config);

    assert!(parse_nested_tree_with("a{b}", &options).is_ok());
    let err = parse_nested_tree_with("a{b{c{d}}}", &options).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TooDeep { max_depth: 2 });
    assert_eq!(err.offset, 5);

    let lenient = ParseOptions::from_config(&QueryConfig {
        max_nested_depth: 2,
        ..QueryConfig::lenient()
    });
    assert_eq!(
        flatten_paths(&parse_nested_tree_with("a{b{c{d}}}", &lenient).unwrap()),
        vec!["a", "a.b", "a.b.c"]
    );
}

#[test]
fn test_strict_malformed_inputs() {
    let strict = ParseOptions::strict();
    let cases = [
        ("a{b", ParseErrorKind::UnclosedBlock, 1),
        ("a}", ParseErrorKind::UnmatchedClose, 1),
        ("a,,b", ParseErrorKind::EmptyName, 2),
        (r#"a{ {"limit":1 }"#, ParseErrorKind::UnclosedBlock, 1),
    ];
    for (input, kind, offset) in cases {
        let err = parse_nested_tree_with(input, &strict).unwrap_err();
        assert_eq!(err.kind, kind, "input {input:?}");
        assert_eq!(err.offset, offset, "input {input:?}");
    }

    let err = parse_nested_tree_with(r#"a{ {"limit":"ten"} }"#, &strict).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidEmbeddedQuery { .. }));
}
