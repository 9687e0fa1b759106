//! Item types produced by the scanner

/// A `{...}` child block attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Text between the braces (to end of input when unclosed).
    pub body: &'a str,
    /// Absolute offset of `body` in the original input.
    pub offset: usize,
    /// Absolute offset of the opening `{`.
    pub open_at: usize,
    /// Whether a matching `}` was found.
    pub closed: bool,
}

/// One comma-separated entry at the current nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    /// Raw text before the first `{` (or the whole entry), untrimmed.
    pub name: &'a str,
    /// Absolute offset where the entry starts.
    pub start: usize,
    pub block: Option<Block<'a>>,
    /// Text between the block's closing `}` and the next separator.
    pub trailing: &'a str,
    /// Absolute offset of `trailing`.
    pub trailing_at: usize,
    /// Absolute offset of the first `}` that closes nothing.
    pub stray_close: Option<usize>,
}

impl<'a> Item<'a> {
    /// Name with surrounding whitespace removed.
    pub fn trimmed_name(&self) -> &'a str {
        self.name.trim()
    }

    /// Whether anything other than whitespace follows the block.
    pub fn has_trailing_text(&self) -> bool {
        !self.trailing.trim().is_empty()
    }
}
