//! Parsed nested-relation trees and parser settings

use quarry_core::{NestedParseMode, QueryConfig, QueryPayload};
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// TREE
// ============================================================================

/// One relation in a nested eager-load tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NestedNode {
    pub name: String,
    /// Sub-query scoping this relation's rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedNode>,
}

impl NestedNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: None,
            children: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: QueryPayload) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_child(mut self, child: NestedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Dotted paths of this node and every descendant, depth-first.
    ///
    /// For a tree parsed from query-free text this equals what the flat
    /// parser returns for the same text.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(None, &mut out);
        out
    }

    fn collect_paths(&self, prefix: Option<&str>, out: &mut Vec<String>) {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, self.name),
            None => self.name.clone(),
        };
        out.push(path.clone());
        for child in &self.children {
            child.collect_paths(Some(&path), out);
        }
    }
}

/// Dotted paths of a whole forest, in document order.
pub fn flatten_paths(nodes: &[NestedNode]) -> Vec<String> {
    nodes.iter().flat_map(NestedNode::paths).collect()
}

// ============================================================================
// ERRORS
// ============================================================================

/// What strict parsing rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unclosed '{{'")]
    UnclosedBlock,

    #[error("unmatched '}}'")]
    UnmatchedClose,

    #[error("empty relation name")]
    EmptyName,

    #[error("unexpected text after block: {text:?}")]
    UnexpectedText { text: String },

    #[error("invalid embedded query: {reason}")]
    InvalidEmbeddedQuery { reason: String },

    #[error("nesting deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },
}

/// Strict-mode parse failure, located by byte offset in the original input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self {
            message: kind.to_string(),
            kind,
            offset,
        }
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Settings for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: NestedParseMode,
    /// Deepest `{...}` nesting that is descended into.
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn lenient() -> Self {
        Self::from_config(&QueryConfig::lenient())
    }

    pub fn strict() -> Self {
        Self::from_config(&QueryConfig::strict())
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            mode: config.nested_parse_mode,
            max_depth: config.max_nested_depth,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.mode == NestedParseMode::Strict
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

// ============================================================================
// TESTS
// ============================================================================
