//! Shared item validation for the flat and tree parsers

use crate::lexer::{strip_outer_braces, Block, Item, Scanner};
use crate::parser::ast::{ParseError, ParseErrorKind, ParseOptions};
use tracing::{debug, warn};

/// An item that survived validation.
pub(crate) struct Accepted<'a> {
    pub name: String,
    /// Child block to descend into; dropped when too deep in lenient mode.
    pub block: Option<Block<'a>>,
}

/// Applies one set of [`ParseOptions`] to scanned items.
pub struct NestedParser<'o> {
    options: &'o ParseOptions,
}

impl<'o> NestedParser<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        self.options
    }

    /// Scan the top level of `input`, dropping one enclosing brace pair.
    pub(crate) fn top_level<'a>(&self, input: &'a str) -> Scanner<'a> {
        let (source, base) = strip_outer_braces(input);
        Scanner::new(source, base)
    }

    /// Fail in strict mode; otherwise log and carry on.
    pub(crate) fn reject(&self, kind: ParseErrorKind, offset: usize) -> Result<(), ParseError> {
        if self.options.is_strict() {
            return Err(ParseError::new(kind, offset));
        }
        debug!(offset, problem = %kind, "tolerating malformed nested input");
        Ok(())
    }

    /// Validate an item found at `depth` enclosing blocks.
    ///
    /// Returns `None` for items lenient mode skips entirely.
    pub(crate) fn accept<'a>(
        &self,
        item: &Item<'a>,
        depth: usize,
    ) -> Result<Option<Accepted<'a>>, ParseError> {
        if let Some(at) = item.stray_close {
            self.reject(ParseErrorKind::UnmatchedClose, at)?;
        }

        let name: String = item
            .name
            .chars()
            .filter(|c| *c != '}')
            .collect::<String>()
            .trim()
            .to_string();
        if name.is_empty() {
            self.reject(ParseErrorKind::EmptyName, item.start)?;
            return Ok(None);
        }

        let Some(block) = item.block else {
            return Ok(Some(Accepted { name, block: None }));
        };

        if !block.closed {
            self.reject(ParseErrorKind::UnclosedBlock, block.open_at)?;
        }
        if item.has_trailing_text() {
            self.reject(
                ParseErrorKind::UnexpectedText {
                    text: item.trailing.trim().to_string(),
                },
                item.trailing_at,
            )?;
        }

        if depth + 1 > self.options.max_depth {
            let kind = ParseErrorKind::TooDeep {
                max_depth: self.options.max_depth,
            };
            if self.options.is_strict() {
                return Err(ParseError::new(kind, block.open_at));
            }
            warn!(
                relation = %name,
                offset = block.open_at,
                max_depth = self.options.max_depth,
                "dropping nested block beyond depth limit"
            );
            return Ok(Some(Accepted { name, block: None }));
        }

        Ok(Some(Accepted {
            name,
            block: Some(block),
        }))
    }
}
