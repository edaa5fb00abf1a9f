#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the parser behavior and options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseOptions {
    /// Indent width of one list nesting level; a tab counts as a full level
    pub spaces_per_level: usize,
    /// Maximum nesting depth of quotes, spans and links
    pub max_nesting_depth: usize,
    /// Whether paragraph lines are joined with newline nodes
    pub soft_breaks: bool,
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    /// Indent width of one level, never zero.
    pub(crate) fn indent_unit(&self) -> usize {
        self.spaces_per_level.max(1)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            spaces_per_level: 2,
            max_nesting_depth: 64,
            soft_breaks: false,
        }
    }
}

/// Builder pattern for ParseOptions
#[derive(Debug, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spaces_per_level(mut self, spaces: usize) -> Self {
        self.options.spaces_per_level = spaces;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.options.max_nesting_depth = depth;
        self
    }

    pub fn with_soft_breaks(mut self, enabled: bool) -> Self {
        self.options.soft_breaks = enabled;
        self
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}
