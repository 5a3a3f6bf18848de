//! Text output for configuration trees.
//!
//! Nested configurations come first, each as a name line followed by a
//! braced block, then the variables as `name = value` lines. Values are
//! written in their stored (escaped) form, so the output reads back into an
//! equal tree.

use crate::Config;
use crate::options::FormatOptions;

/// Builds configuration text.
pub struct ConfigWriter {
    out: String,
    options: FormatOptions,
    depth: usize,
}

impl ConfigWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
            depth: 0,
        }
    }

    /// Consume the writer and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(self.options.indent);
        }
    }

    fn write_line(&mut self, text: &str) {
        self.write_indent();
        self.out.push_str(text);
        self.out.push_str(self.options.line_ending);
    }

    /// Write the contents of `config` at the current depth.
    pub fn write_config(&mut self, config: &Config) {
        let last = config.config_count();
        for (idx, (name, section)) in config.sections().enumerate() {
            self.write_line(name);
            self.write_line("{");
            self.depth += 1;
            self.write_config(section);
            self.depth -= 1;
            self.write_line("}");

            // Blank separator line, except after the final block of a
            // config with no variables.
            if idx + 1 < last || config.variable_count() > 0 {
                self.write_line("");
            }
        }

        for (name, raw) in config.variables() {
            self.write_indent();
            self.out.push_str(name);
            self.out.push_str(" = ");
            self.out.push_str(raw);
            self.out.push_str(self.options.line_ending);
        }
    }
}

impl Default for ConfigWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a configuration tree as text with default options.
pub fn to_text(config: &Config) -> String {
    to_text_with_options(config, FormatOptions::default())
}

/// Write a configuration tree as text with the given options.
pub fn to_text_with_options(config: &Config, options: FormatOptions) -> String {
    let mut writer = ConfigWriter::with_options(options);
    writer.write_config(config);
    writer.finish()
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_text_with_options(self, FormatOptions::new().unix()))
    }
}
