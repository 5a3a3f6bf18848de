//! Parse errors and their diagnostic rendering.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::Span;

/// The kind of a text parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A variable name starts with, or contains, a character that cannot
    /// appear in a name.
    InvalidNameToken,
    /// A name is followed by neither `=` nor `{`.
    AssignmentMissing,
    /// Input ended inside a `{ ... }` block.
    ClosingBraceMissing {
        /// The `{` that was never closed.
        opened_at: Span,
    },
    /// A `{` opens more than [`MAX_DEPTH`](crate::MAX_DEPTH) nested blocks.
    NestingTooDeep,
    /// The input does not fit in `u32` byte offsets.
    InputTooLarge,
}

/// A text parse error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// 1-based line where the error was detected.
    pub line: u32,
    /// Offending character, or an empty span at end of input.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, line: u32, span: Span) -> Self {
        Self { kind, line, span }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::InvalidNameToken => "invalid name token",
            ParseErrorKind::AssignmentMissing => "assignment missing",
            ParseErrorKind::ClosingBraceMissing { .. } => "closing brace missing",
            ParseErrorKind::NestingTooDeep => "blocks nested too deeply",
            ParseErrorKind::InputTooLarge => "input too large",
        }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span.into();

        match self.kind {
            ParseErrorKind::InvalidNameToken => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(self.message())
                    .with_label(
                        Label::new((filename, range))
                            .with_message("not allowed in a name")
                            .with_color(Color::Red),
                    )
                    .with_help("names must match [A-Za-z_][A-Za-z0-9_]*")
            }

            ParseErrorKind::AssignmentMissing => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(self.message())
                    .with_label(
                        Label::new((filename, range))
                            .with_message("expected `=` or `{`")
                            .with_color(Color::Red),
                    )
                    .with_help("write `name = value` for a variable or `name { ... }` for a block")
            }

            ParseErrorKind::ClosingBraceMissing { opened_at } => {
                let opened: std::ops::Range<usize> = opened_at.into();
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(self.message())
                    .with_label(
                        Label::new((filename, opened))
                            .with_message("block opened here")
                            .with_color(Color::Blue),
                    )
                    .with_label(
                        Label::new((filename, range))
                            .with_message("input ends here")
                            .with_color(Color::Red),
                    )
                    .with_help("add a closing '}'")
            }

            ParseErrorKind::NestingTooDeep => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(self.message())
                    .with_label(
                        Label::new((filename, range))
                            .with_message(format!(
                                "block {} opened here",
                                crate::MAX_DEPTH + 1
                            ))
                            .with_color(Color::Red),
                    )
                    .with_help(format!(
                        "blocks may nest at most {} levels deep",
                        crate::MAX_DEPTH
                    ))
            }

            ParseErrorKind::InputTooLarge => Report::build(ReportKind::Error, (filename, range))
                .with_message(self.message())
                .with_note(format!("inputs are limited to {} bytes", u32::MAX)),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}", self.message(), self.line)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(source: &str) -> ParseError {
        crate::parse(source).expect_err("expected a parse error")
    }

    fn stripped(rendered: String) -> String {
        String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap()
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(parse_error("1abc = 5").to_string(), @"invalid name token at line 1");
        insta::assert_snapshot!(parse_error("a\nb c").to_string(), @"assignment missing at line 2");
        insta::assert_snapshot!(parse_error("a {\n").to_string(), @"closing brace missing at line 2");
    }

    #[test]
    fn test_invalid_name_diagnostic() {
        let source = "w = 1\n2h = 600\n";
        let rendered = stripped(parse_error(source).render("game.cfg", source));
        assert!(rendered.contains("invalid name token"), "{rendered}");
        assert!(rendered.contains("not allowed in a name"), "{rendered}");
        assert!(rendered.contains("game.cfg"), "{rendered}");
    }

    #[test]
    fn test_unclosed_block_diagnostic() {
        let source = "player\n{\n\tspeed = 2\n";
        let rendered = stripped(parse_error(source).render("game.cfg", source));
        assert!(rendered.contains("closing brace missing"), "{rendered}");
        assert!(rendered.contains("block opened here"), "{rendered}");
        assert!(rendered.contains("add a closing '}'"), "{rendered}");
    }

    #[test]
    fn test_nesting_too_deep_diagnostic() {
        let depth = crate::MAX_DEPTH + 1;
        let source = "a {\n".repeat(depth);
        let err = parse_error(&source);
        insta::assert_snapshot!(err.to_string(), @"blocks nested too deeply at line 257");
        let rendered = stripped(err.render("deep.cfg", &source));
        assert!(rendered.contains("block 257 opened here"), "{rendered}");
        assert!(rendered.contains("at most 256 levels"), "{rendered}");
    }
}
