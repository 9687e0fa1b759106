//! Tree parser for nested relations with embedded sub-queries
//!
//! ```text
//! author{ {"where":{"active":true},"limit":5}, profile, posts{comments} }
//! ```
//!
//! A child block that starts with `{` carries a JSON [`QueryPayload`] for
//! that relation, optionally followed by `,` and the relation's own
//! children.

use crate::lexer::{find_matching_close, Block, Item, Scanner};
use crate::parser::ast::{NestedNode, ParseError, ParseErrorKind, ParseOptions};
use crate::parser::parser::NestedParser;
use quarry_core::QueryPayload;
use tracing::warn;

/// Parse nested-relation text into a tree, tolerating malformed input.
///
/// Unreadable embedded queries leave the node without a query. Blocks
/// nested deeper than
/// [`QueryConfig::DEFAULT_MAX_NESTED_DEPTH`](quarry_core::QueryConfig::DEFAULT_MAX_NESTED_DEPTH)
/// are dropped; use [`parse_nested_tree_with`] to choose the limit.
pub fn parse_nested_tree(input: &str) -> Vec<NestedNode> {
    let options = ParseOptions::lenient();
    NestedParser::new(&options).tree(input).unwrap_or_default()
}

/// Parse nested-relation text into a tree under `options`.
pub fn parse_nested_tree_with(input: &str, options: &ParseOptions) -> Result<Vec<NestedNode>, ParseError> {
    NestedParser::new(options).tree(input)
}

/// Contents of one child block.
struct BlockParts<'a> {
    query: Option<QueryPayload>,
    /// Children text and its absolute offset.
    children: Option<(&'a str, usize)>,
}

impl<'o> NestedParser<'o> {
    pub fn tree(&self, input: &str) -> Result<Vec<NestedNode>, ParseError> {
        let mut scanner = self.top_level(input);
        self.tree_level(&mut scanner, 0)
    }

    fn tree_level(&self, scanner: &mut Scanner<'_>, depth: usize) -> Result<Vec<NestedNode>, ParseError> {
        let mut nodes = Vec::new();
        while let Some(item) = scanner.next_item() {
            if let Some(node) = self.tree_item(&item, depth)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn tree_item(&self, item: &Item<'_>, depth: usize) -> Result<Option<NestedNode>, ParseError> {
        let Some(accepted) = self.accept(item, depth)? else {
            return Ok(None);
        };

        let mut node = NestedNode::new(accepted.name);
        if let Some(block) = accepted.block {
            let parts = self.split_block(&block, &node.name)?;
            node.query = parts.query;
            if let Some((text, offset)) = parts.children {
                let mut scanner = Scanner::new(text, offset);
                node.children = self.tree_level(&mut scanner, depth + 1)?;
            }
        }
        Ok(Some(node))
    }

    /// Separate a leading JSON object from the children that follow it.
    fn split_block<'a>(&self, block: &Block<'a>, relation: &str) -> Result<BlockParts<'a>, ParseError> {
        let body = block.body.trim_start();
        let offset = block.offset + (block.body.len() - body.len());

        if !body.starts_with('{') {
            return Ok(BlockParts {
                query: None,
                children: Some((block.body, block.offset)),
            });
        }

        let Some(close) = find_matching_close(body, 0) else {
            self.reject(ParseErrorKind::UnclosedBlock, offset)?;
            warn!(relation, offset, "ignoring unterminated embedded query");
            return Ok(BlockParts {
                query: None,
                children: None,
            });
        };

        let query = self.decode_query(&body[..=close], offset, relation)?;

        let after = &body[close + 1..];
        let rest = after.trim_start();
        let rest_offset = offset + close + 1 + (after.len() - rest.len());

        let children = if rest.is_empty() {
            None
        } else if let Some(children) = rest.strip_prefix(',') {
            Some((children, rest_offset + 1))
        } else {
            self.reject(
                ParseErrorKind::UnexpectedText {
                    text: rest.trim_end().to_string(),
                },
                rest_offset,
            )?;
            Some((rest, rest_offset))
        };

        Ok(BlockParts { query, children })
    }

    fn decode_query(&self, json: &str, offset: usize, relation: &str) -> Result<Option<QueryPayload>, ParseError> {
        match QueryPayload::from_json(json) {
            Ok(query) => Ok(Some(query)),
            Err(e) if self.options().is_strict() => Err(ParseError::new(
                ParseErrorKind::InvalidEmbeddedQuery {
                    reason: e.to_string(),
                },
                offset,
            )),
            Err(e) => {
                warn!(relation, offset, error = %e, "ignoring unreadable embedded query");
                Ok(None)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
