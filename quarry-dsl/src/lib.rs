//! QUARRY DSL - Nested-Relation Parsers
//!
//! Parses the compact bracketed text that describes which relations to load
//! alongside a list query.
//!
//! Architecture:
//! ```text
//! "author{profile},posts{ {\"limit\":5}, comments }"
//!     ↓
//! Scanner (brace depth, string-aware)   (lexer)
//!     ↓
//! Flat parser  → ["author", "author.profile", ...]
//! Tree parser  → [NestedNode { name, query, children }]
//!     ↓
//! Pretty printer (for round-trip testing)
//! ```
//!
//! The convenience entry points never fail; the `_with` variants take
//! [`ParseOptions`] and report malformed input in strict mode.

pub mod lexer;
pub mod parser;
pub mod pretty_printer;

// Re-export key types for convenience
pub use parser::{
    flatten_paths, parse_nested_flat, parse_nested_flat_with, parse_nested_tree,
    parse_nested_tree_with, NestedNode, NestedParser, ParseError, ParseErrorKind, ParseOptions,
};
pub use pretty_printer::pretty_print_nested;
