//! Pretty printer for nested-relation trees
//!
//! Renders a tree back to compact DSL text that both parsers accept:
//! `pretty_print_nested` followed by `parse_nested_tree` gives back the
//! same tree.

use crate::parser::NestedNode;
use std::fmt::{self, Write};
use tracing::warn;

/// Render a forest as comma-separated DSL text.
///
/// A node whose embedded query cannot be encoded is left out whole.
pub fn pretty_print_nested(nodes: &[NestedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        let mut rendered = String::new();
        if write!(rendered, "{}", node).is_err() {
            warn!(name = %node.name, "dropping nested node whose query cannot be encoded");
            continue;
        }
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(&rendered);
    }
    out
}

impl fmt::Display for NestedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.query.is_none() && self.children.is_empty() {
            return Ok(());
        }

        f.write_char('{')?;
        if let Some(query) = &self.query {
            let json = serde_json::to_string(query).map_err(|_| fmt::Error)?;
            f.write_str(&json)?;
            if !self.children.is_empty() {
                f.write_char(',')?;
            }
        }
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            write!(f, "{}", child)?;
        }
        f.write_char('}')
    }
}

// ============================================================================
// TESTS
// ============================================================================
