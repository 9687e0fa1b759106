//! Flat-path parser: `a{b,c{d}}` → `["a", "a.b", "a.c", "a.c.d"]`

use crate::lexer::{Item, Scanner};
use crate::parser::ast::{ParseError, ParseOptions};
use crate::parser::parser::NestedParser;

/// Parse nested-relation text into dotted paths, tolerating malformed input.
///
/// Every relation appears after its parent, in document order. Empty or
/// whitespace-only input yields no paths. Blocks nested deeper than
/// [`QueryConfig::DEFAULT_MAX_NESTED_DEPTH`](quarry_core::QueryConfig::DEFAULT_MAX_NESTED_DEPTH)
/// are dropped; use [`parse_nested_flat_with`] to choose the limit.
pub fn parse_nested_flat(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let options = ParseOptions::lenient();
    // Lenient parsing reports nothing.
    let _ = NestedParser::new(&options).flat(input, &mut out);
    out
}

/// Parse nested-relation text into dotted paths under `options`.
pub fn parse_nested_flat_with(input: &str, options: &ParseOptions) -> Result<Vec<String>, ParseError> {
    let mut out = Vec::new();
    NestedParser::new(options).flat(input, &mut out)?;
    Ok(out)
}

impl<'o> NestedParser<'o> {
    /// Append the paths found in `input` to `out`.
    ///
    /// In lenient mode paths collected before any problem are kept.
    pub fn flat(&self, input: &str, out: &mut Vec<String>) -> Result<(), ParseError> {
        let mut scanner = self.top_level(input);
        while let Some(item) = scanner.next_item() {
            self.flat_item(&item, None, 0, out)?;
        }
        Ok(())
    }

    fn flat_item(
        &self,
        item: &Item<'_>,
        prefix: Option<&str>,
        depth: usize,
        out: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let Some(accepted) = self.accept(item, depth)? else {
            return Ok(());
        };

        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, accepted.name),
            None => accepted.name,
        };
        out.push(path.clone());

        if let Some(block) = accepted.block {
            let mut scanner = Scanner::new(block.body, block.offset);
            while let Some(child) = scanner.next_item() {
                self.flat_item(&child, Some(&path), depth + 1, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::ParseErrorKind;

    #[test]
    fn test_default_depth_cap() {
        let depth = quarry_core::QueryConfig::DEFAULT_MAX_NESTED_DEPTH + 4;
        let input = format!("{}n{}", "n{".repeat(depth), "}".repeat(depth));
        let paths = parse_nested_flat(&input);
        let deepest = paths.last().unwrap().split('.').count();
        assert_eq!(deepest, quarry_core::QueryConfig::DEFAULT_MAX_NESTED_DEPTH + 1);
    }

    #[test]
    fn test_flat_basic() {
        assert_eq!(parse_nested_flat("a{b,c{d}}"), vec!["a", "a.b", "a.c", "a.c.d"]);
    }

    #[test]
    fn test_flat_siblings_and_whitespace() {
        assert_eq!(
            parse_nested_flat(" author { profile } , tags "),
            vec!["author", "author.profile", "tags"]
        );
    }

    #[test]
    fn test_flat_empty_input() {
        assert!(parse_nested_flat("").is_empty());
        assert!(parse_nested_flat("   ").is_empty());
        assert!(parse_nested_flat("{}").is_empty());
    }

    #[test]
    fn test_flat_strips_enclosing_braces() {
        assert_eq!(parse_nested_flat("{a{b}}"), vec!["a", "a.b"]);
        assert_eq!(parse_nested_flat("{a,b}"), vec!["a", "b"]);
    }

    #[test]
    fn test_flat_lenient_recovery() {
        // Unclosed block runs to end of input.
        assert_eq!(parse_nested_flat("a{b,c"), vec!["a", "a.b", "a.c"]);
        // Stray close brace and empty entries are ignored.
        assert_eq!(parse_nested_flat("a},,b"), vec!["a", "b"]);
        // Junk after a block is ignored.
        assert_eq!(parse_nested_flat("a{b} junk, c"), vec!["a", "a.b", "c"]);
        // Unnamed blocks are skipped with their contents.
        assert_eq!(parse_nested_flat("{x},a"), vec!["a"]);
    }

    #[test]
    fn test_flat_lenient_depth_limit_keeps_parent() {
        let options = ParseOptions::lenient().with_max_depth(2);
        assert_eq!(
            parse_nested_flat_with("a{b{c{d}}}", &options).unwrap(),
            vec!["a", "a.b", "a.b.c"]
        );
    }

    #[test]
    fn test_flat_strict_accepts_well_formed() {
        let options = ParseOptions::strict();
        assert_eq!(
            parse_nested_flat_with("a{b,c{d}}, e", &options).unwrap(),
            vec!["a", "a.b", "a.c", "a.c.d", "e"]
        );
        // A trailing separator is not an empty item.
        assert_eq!(parse_nested_flat_with("a,b,", &options).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_flat_strict_errors_carry_offsets() {
        let options = ParseOptions::strict();

        let err = parse_nested_flat_with("a{b,c", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedBlock);
        assert_eq!(err.offset, 1);

        let err = parse_nested_flat_with("a,,b", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyName);
        assert_eq!(err.offset, 2);

        let err = parse_nested_flat_with("a{b}}", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnmatchedClose);
        assert_eq!(err.offset, 4);

        // Offsets point into the original input, past stripped braces.
        let err = parse_nested_flat_with("  {a{b, }}", &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyName);
        assert_eq!(err.offset, 7);

        let err = parse_nested_flat_with("a{b{c}}", &options.with_max_depth(1)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep { max_depth: 1 });
        assert_eq!(err.offset, 3);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The lenient parser never panics and never yields empty segments.
        #[test]
        fn prop_lenient_total(input in "[a-z{}, ]{0,40}") {
            for path in parse_nested_flat(&input) {
                prop_assert!(!path.is_empty());
                prop_assert!(path.split('.').all(|segment| !segment.is_empty()));
            }
        }

        /// Sibling lists come back in order.
        #[test]
        fn prop_siblings_in_order(names in prop::collection::vec(arb_name(), 1..6)) {
            let input = names.join(",");
            prop_assert_eq!(parse_nested_flat(&input), names);
        }

        /// Every path's parent precedes it.
        #[test]
        fn prop_parent_precedes_child(
            parent in arb_name(),
            children in prop::collection::vec(arb_name(), 1..4),
        ) {
            let input = format!("{}{{{}}}", parent, children.join(","));
            let paths = parse_nested_flat_with(&input, &ParseOptions::strict()).unwrap();
            prop_assert_eq!(&paths[0], &parent);
            for (path, child) in paths[1..].iter().zip(&children) {
                prop_assert_eq!(path, &format!("{}.{}", parent, child));
            }
        }
    }
}
