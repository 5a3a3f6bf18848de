//! Formatting options for text output.

/// Options for writing configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Indentation string for one nesting level (default: a tab)
    pub indent: &'static str,

    /// Line terminator (default: "\r\n")
    pub line_ending: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "\t",
            line_ending: "\r\n",
        }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom indentation string.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }

    /// Set a custom line terminator.
    pub fn line_ending(mut self, line_ending: &'static str) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Terminate lines with a bare `\n`.
    pub fn unix(self) -> Self {
        self.line_ending("\n")
    }
}
