#![doc = include_str!("../README.md")]

mod binary;
mod config;
mod diagnostic;
mod error;
mod fs;
mod options;
mod parser;
pub mod scalar;
mod span;
mod writer;

pub use binary::{LengthWidth, from_bytes, read_bin, to_bytes, write_bin};
pub use config::{Config, MAX_DEPTH};
pub use diagnostic::{ParseError, ParseErrorKind};
pub use error::{ConversionError, Error, Result, ScalarKind};
pub use options::FormatOptions;
pub use parser::{parse, parse_into};
pub use span::Span;
pub use writer::{ConfigWriter, to_text, to_text_with_options};
