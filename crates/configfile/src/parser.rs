//! Text parser for configuration files.
//!
//! A single-pass, character-driven state machine. It reads one character at
//! a time, tracks the current line for error reporting, and keeps a stack of
//! configurations mirroring `{ ... }` nesting. Each stack frame also holds
//! the variable name pending at that depth, so a value (or a closed block)
//! can be bound once it has been read completely.
//!
//! Names seen more than once overwrite the earlier value; loading a file into
//! a tree that already holds its contents changes nothing.

use tracing::trace;

use crate::diagnostic::{ParseError, ParseErrorKind};
use crate::scalar::{is_name_char, is_name_start};
use crate::{Config, MAX_DEPTH, Span};

/// Parse configuration text into a new tree.
pub fn parse(source: &str) -> Result<Config, ParseError> {
    let mut config = Config::new();
    parse_into(source, &mut config)?;
    Ok(config)
}

/// Parse configuration text into an existing tree.
///
/// Variables and blocks already present in `dest` are overwritten when the
/// text defines them again. On error, `dest` keeps whatever was bound before
/// the error was detected and should be discarded.
///
/// Blocks may nest at most [`MAX_DEPTH`] levels deep, and the source must
/// fit in `u32` byte offsets.
pub fn parse_into(source: &str, dest: &mut Config) -> Result<(), ParseError> {
    check_size(source.len())?;
    let mut parser = Parser::new(source, std::mem::take(dest));
    let result = parser.run();
    *dest = parser.into_root();
    result
}

/// Spans are `u32` byte offsets; longer input cannot be located.
fn check_size(len: usize) -> Result<(), ParseError> {
    if u32::try_from(len).is_err() {
        return Err(ParseError::new(
            ParseErrorKind::InputTooLarge,
            1,
            Span::empty(0),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between entries; expects a name, a comment or blank space.
    WaitingName,
    /// Inside a name.
    ReadingName,
    /// After a name and some blanks on the same line.
    WaitingEqualsOrBrace,
    /// After a name and a line break; only `{` may follow.
    WaitingOpeningBrace,
    /// After `=`, before the first value character.
    WaitingValue,
    /// Inside a value.
    ReadingValue,
    /// Like `WaitingName`, but inside a block so `}` is also accepted.
    WaitingNameOrBrace,
}

struct Frame {
    config: Config,
    /// Name of the entry currently being read at this depth.
    name: String,
    /// The `{` that opened this block (empty for the root).
    opened_at: Span,
}

struct Parser<'src> {
    /// The remaining source text.
    remaining: &'src str,
    /// Current byte position in the source.
    pos: u32,
    /// Current 1-based line.
    line: u32,
    /// Span of the most recently consumed character.
    last: Span,

    state: State,
    frames: Vec<Frame>,

    /// Value being accumulated.
    value: String,
    /// Blanks seen after the value that may still turn out to be part of it.
    spaces: String,
}

#[inline]
fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, root: Config) -> Self {
        Self {
            remaining: source,
            pos: 0,
            line: 1,
            last: Span::empty(0),
            state: State::WaitingName,
            frames: vec![Frame {
                config: root,
                name: String::new(),
                opened_at: Span::empty(0),
            }],
            value: String::new(),
            spaces: String::new(),
        }
    }

    /// Hand back the root configuration, dropping any unclosed blocks.
    fn into_root(mut self) -> Config {
        self.frames.truncate(1);
        self.frames.pop().map(|f| f.config).unwrap_or_default()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        let start = self.pos;
        // Cannot overflow: `check_size` bounds the whole source.
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        self.last = Span::new(start, self.pos);
        Some(c)
    }

    /// Nesting depth; the root is depth 1.
    #[inline]
    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn goto(&mut self, state: State) {
        if self.state != state {
            trace!(line = self.line, "{:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.line, self.last)
    }

    fn eof_error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.line, Span::empty(self.pos))
    }

    fn closing_brace_missing(&self) -> ParseError {
        let opened_at = self
            .frames
            .last()
            .map(|f| f.opened_at)
            .unwrap_or_else(|| Span::empty(0));
        self.eof_error(ParseErrorKind::ClosingBraceMissing { opened_at })
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.advance() {
            match self.state {
                State::WaitingName => self.waiting_name(c)?,
                State::ReadingName => self.reading_name(c)?,
                State::WaitingEqualsOrBrace => self.waiting_equals_or_brace(c)?,
                State::WaitingOpeningBrace => self.waiting_opening_brace(c)?,
                State::WaitingValue => self.waiting_value(c),
                State::ReadingValue => self.reading_value(c),
                State::WaitingNameOrBrace => self.waiting_name_or_brace(c)?,
            }
        }
        self.finish()
    }

    // ---- shared actions ---------------------------------------------------

    /// Count a line break; the LF of a CRLF pair is consumed with the CR.
    fn line_break(&mut self, c: char) {
        self.line += 1;
        if c == '\r' && self.peek() == Some('\n') {
            self.advance();
        }
    }

    /// Skip the rest of the current line, including its line break.
    fn skip_line(&mut self) {
        while let Some(c) = self.advance() {
            if is_line_break(c) {
                self.line_break(c);
                break;
            }
        }
    }

    /// Pick the name-waiting state that fits the current depth.
    fn after_entry(&mut self) {
        if self.depth() == 1 {
            self.goto(State::WaitingName);
        } else {
            self.goto(State::WaitingNameOrBrace);
        }
    }

    fn open_block(&mut self) -> Result<(), ParseError> {
        // The root frame is not a block.
        if self.frames.len() > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        if let Some(frame) = self.frames.last() {
            trace!(line = self.line, name = %frame.name, "open block");
        }
        self.frames.push(Frame {
            config: Config::new(),
            name: String::new(),
            opened_at: self.last,
        });
        self.goto(State::WaitingNameOrBrace);
        Ok(())
    }

    /// Bind the accumulated value to the pending name at the current depth.
    fn bind_value(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.spaces.clear();
        let line = self.line;
        let frame = self.top();
        trace!(line, name = %frame.name, value = %value, "bind value");
        frame.config.upsert_str(&frame.name, &value);
    }

    /// Pop the innermost block into its parent under the parent's pending name.
    fn close_block(&mut self) {
        if let [.., parent, child] = self.frames.as_mut_slice() {
            trace!(name = %parent.name, "close block");
            parent
                .config
                .upsert_config(&parent.name, std::mem::take(&mut child.config));
            self.frames.pop();
        }
    }

    // ---- states -----------------------------------------------------------

    fn waiting_name(&mut self, c: char) -> Result<(), ParseError> {
        if is_name_start(c) {
            let frame = self.top();
            frame.name.clear();
            frame.name.push(c);
            self.goto(State::ReadingName);
        } else if c == '#' {
            self.skip_line();
        } else if is_line_break(c) {
            self.line_break(c);
        } else if !is_blank(c) {
            return Err(self.error(ParseErrorKind::InvalidNameToken));
        }
        Ok(())
    }

    fn reading_name(&mut self, c: char) -> Result<(), ParseError> {
        if is_name_char(c) {
            self.top().name.push(c);
        } else if is_blank(c) {
            self.goto(State::WaitingEqualsOrBrace);
        } else if is_line_break(c) {
            self.line_break(c);
            self.goto(State::WaitingOpeningBrace);
        } else if c == '=' {
            self.goto(State::WaitingValue);
        } else if c == '{' {
            self.open_block()?;
        } else {
            return Err(self.error(ParseErrorKind::InvalidNameToken));
        }
        Ok(())
    }

    fn waiting_equals_or_brace(&mut self, c: char) -> Result<(), ParseError> {
        if c == '=' {
            self.goto(State::WaitingValue);
        } else if c == '{' {
            self.open_block()?;
        } else if c == '#' {
            self.skip_line();
            self.goto(State::WaitingOpeningBrace);
        } else if is_line_break(c) {
            self.line_break(c);
            self.goto(State::WaitingOpeningBrace);
        } else if !is_blank(c) {
            return Err(self.error(ParseErrorKind::AssignmentMissing));
        }
        Ok(())
    }

    fn waiting_opening_brace(&mut self, c: char) -> Result<(), ParseError> {
        if c == '{' {
            self.open_block()?;
        } else if c == '#' {
            self.skip_line();
        } else if is_line_break(c) {
            self.line_break(c);
        } else if !is_blank(c) {
            return Err(self.error(ParseErrorKind::AssignmentMissing));
        }
        Ok(())
    }

    fn waiting_value(&mut self, c: char) {
        if c == '#' {
            self.value.clear();
            self.bind_value();
            self.skip_line();
            self.after_entry();
        } else if is_line_break(c) {
            self.value.clear();
            self.bind_value();
            self.line_break(c);
            self.after_entry();
        } else if is_blank(c) {
            // leading blanks are not part of the value
        } else if c == '}' && self.depth() > 1 {
            // `name = }` closes the block with an empty value
            self.value.clear();
            self.bind_value();
            self.close_block();
            self.after_entry();
        } else {
            self.spaces.clear();
            self.value.clear();
            self.value.push(c);
            self.goto(State::ReadingValue);
        }
    }

    fn reading_value(&mut self, c: char) {
        if is_blank(c) {
            self.spaces.push(c);
        } else if is_line_break(c) {
            self.bind_value();
            self.line_break(c);
            self.after_entry();
        } else if c == '#' && !self.spaces.is_empty() {
            self.bind_value();
            self.skip_line();
            self.after_entry();
        } else if c == '}' && !self.spaces.is_empty() && self.depth() > 1 {
            self.bind_value();
            self.close_block();
            self.skip_line();
            self.after_entry();
        } else {
            // Blanks followed by more text belong to the value.
            self.value.push_str(&self.spaces);
            self.spaces.clear();
            self.value.push(c);
        }
    }

    fn waiting_name_or_brace(&mut self, c: char) -> Result<(), ParseError> {
        if c == '}' {
            self.close_block();
            self.after_entry();
            Ok(())
        } else {
            self.waiting_name(c)
        }
    }

    /// Resolve the state left over at end of input.
    fn finish(&mut self) -> Result<(), ParseError> {
        match self.state {
            State::WaitingName => Ok(()),
            State::ReadingName | State::WaitingEqualsOrBrace | State::WaitingOpeningBrace => {
                Err(self.eof_error(ParseErrorKind::AssignmentMissing))
            }
            State::WaitingValue | State::ReadingValue if self.depth() > 1 => {
                Err(self.closing_brace_missing())
            }
            State::WaitingValue => {
                self.value.clear();
                self.bind_value();
                Ok(())
            }
            State::ReadingValue => {
                self.bind_value();
                Ok(())
            }
            State::WaitingNameOrBrace => Err(self.closing_brace_missing()),
        }
    }
}

impl std::str::FromStr for Config {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
