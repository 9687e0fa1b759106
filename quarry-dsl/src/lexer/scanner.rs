//! Brace-depth scanner
//!
//! Splits one nesting level of nested-DSL text into items. Child blocks are
//! delimited by counting braces rather than by pattern matching, because
//! relation names and embedded JSON may nest arbitrarily deep. Inside a
//! block, braces and commas within double-quoted strings are skipped.

use super::token::*;

// ============================================================================
// SCANNER
// ============================================================================

/// Scanner over one nesting level of nested-DSL source.
pub struct Scanner<'a> {
    source: &'a str,
    base: usize,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for `source`, which starts at absolute offset `base`
    /// of the original input.
    pub fn new(source: &'a str, base: usize) -> Self {
        Self {
            source,
            base,
            pos: 0,
        }
    }

    /// Scan every remaining item.
    pub fn items(&mut self) -> Vec<Item<'a>> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item() {
            items.push(item);
        }
        items
    }

    /// Scan the next comma-separated item, if any input remains.
    pub fn next_item(&mut self) -> Option<Item<'a>> {
        let bytes = self.source.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        let mut pos = start;
        let mut block: Option<(usize, Option<usize>)> = None;
        let mut stray_close = None;

        while pos < bytes.len() {
            match bytes[pos] {
                b',' => break,
                b'{' => match find_matching_close(self.source, pos) {
                    Some(close) => {
                        if block.is_none() {
                            block = Some((pos, Some(close)));
                        }
                        pos = close + 1;
                        continue;
                    }
                    None => {
                        if block.is_none() {
                            block = Some((pos, None));
                        }
                        pos = bytes.len();
                        break;
                    }
                },
                b'}' => {
                    stray_close.get_or_insert(self.base + pos);
                }
                _ => {}
            }
            pos += 1;
        }

        let end = pos;
        // Step over the separator.
        self.pos = if end < bytes.len() { end + 1 } else { end };

        let item = match block {
            None => Item {
                name: &self.source[start..end],
                start: self.base + start,
                block: None,
                trailing: "",
                trailing_at: self.base + end,
                stray_close,
            },
            Some((open, close)) => {
                let (body, closed, trailing_from) = match close {
                    Some(close) => (&self.source[open + 1..close], true, close + 1),
                    None => (&self.source[open + 1..end], false, end),
                };
                Item {
                    name: &self.source[start..open],
                    start: self.base + start,
                    block: Some(Block {
                        body,
                        offset: self.base + open + 1,
                        open_at: self.base + open,
                        closed,
                    }),
                    trailing: &self.source[trailing_from..end],
                    trailing_at: self.base + trailing_from,
                    stray_close,
                }
            }
        };

        Some(item)
    }
}

/// Index of the `}` matching the `{` at `open`, or `None` if it never closes.
pub fn find_matching_close(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Trim `input` and drop one pair of braces enclosing all of it.
///
/// Returns the remaining text and its absolute offset in `input`. The braces
/// are only removed when the leading `{` is matched by the final `}`, so
/// `{a}` becomes `a` but `{a},{b}` is left alone.
pub fn strip_outer_braces(input: &str) -> (&str, usize) {
    let leading = input.len() - input.trim_start().len();
    let trimmed = input.trim();

    if trimmed.starts_with('{') && find_matching_close(trimmed, 0) == Some(trimmed.len() - 1) {
        (&trimmed[1..trimmed.len() - 1], leading + 1)
    } else {
        (trimmed, leading)
    }
}

// ============================================================================
// TESTS
// ============================================================================
