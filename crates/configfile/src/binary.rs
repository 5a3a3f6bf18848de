//! Binary encoding of configuration trees.
//!
//! The layout is recursive and has no header:
//!
//! ```text
//! section count
//!   per section: name length, name bytes, section body (same layout)
//! variable count
//!   per variable: name length, name bytes, value length, value bytes
//! ```
//!
//! Counts and lengths are unsigned integers whose width and byte order are
//! chosen by [`LengthWidth`]. Values are stored in their escaped form.

use std::io::{self, Read, Write};

use tracing::trace;

use crate::error::{Error, Result};
use crate::scalar::validate_name;
use crate::{Config, MAX_DEPTH};

/// Width and byte order of counts and lengths in the binary format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthWidth {
    /// Host `usize` in host byte order.
    #[default]
    Native,
    /// `u64`, little-endian. Readable on any host.
    Fixed64,
}

impl LengthWidth {
    fn write_len<W: Write>(self, w: &mut W, len: usize) -> io::Result<()> {
        match self {
            LengthWidth::Native => w.write_all(&len.to_ne_bytes()),
            LengthWidth::Fixed64 => w.write_all(&(len as u64).to_le_bytes()),
        }
    }

    fn read_len<R: Read>(self, r: &mut R) -> io::Result<u64> {
        match self {
            LengthWidth::Native => {
                let mut buf = [0u8; size_of::<usize>()];
                r.read_exact(&mut buf)?;
                Ok(usize::from_ne_bytes(buf) as u64)
            }
            LengthWidth::Fixed64 => {
                let mut buf = [0u8; 8];
                r.read_exact(&mut buf)?;
                Ok(u64::from_le_bytes(buf))
            }
        }
    }
}

/// Write `config` in binary form.
pub fn write_bin<W: Write>(w: &mut W, config: &Config, width: LengthWidth) -> io::Result<()> {
    width.write_len(w, config.config_count())?;
    for (name, section) in config.sections() {
        write_bytes(w, name.as_bytes(), width)?;
        write_bin(w, section, width)?;
    }

    width.write_len(w, config.variable_count())?;
    for (name, raw) in config.variables() {
        write_bytes(w, name.as_bytes(), width)?;
        write_bytes(w, raw.as_bytes(), width)?;
    }
    Ok(())
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8], width: LengthWidth) -> io::Result<()> {
    width.write_len(w, bytes.len())?;
    w.write_all(bytes)
}

/// Read a binary configuration into `dest`.
///
/// Entries already in `dest` are overwritten when the input defines them
/// again. Blocks nested deeper than [`MAX_DEPTH`] yield [`Error::TooDeep`].
/// On error, `dest` may be partially filled and should be discarded.
pub fn read_bin<R: Read>(r: &mut R, dest: &mut Config, width: LengthWidth) -> Result<()> {
    read_body(r, dest, width, 0)
}

/// `depth` is the number of blocks enclosing `dest`.
fn read_body<R: Read>(
    r: &mut R,
    dest: &mut Config,
    width: LengthWidth,
    depth: usize,
) -> Result<()> {
    let sections = width.read_len(r)?;
    for _ in 0..sections {
        let name = read_name(r, width)?;
        if depth >= MAX_DEPTH {
            return Err(Error::TooDeep { name });
        }
        let mut section = Config::new();
        read_body(r, &mut section, width, depth + 1)?;
        trace!(depth, name = %name, "read section");
        dest.upsert_config(&name, section);
    }

    let variables = width.read_len(r)?;
    for _ in 0..variables {
        let name = read_name(r, width)?;
        let value = read_string(r, width)?;
        dest.upsert_str(&name, &value);
    }
    Ok(())
}

fn read_name<R: Read>(r: &mut R, width: LengthWidth) -> Result<String> {
    let name = read_string(r, width)?;
    validate_name(&name)?;
    Ok(name)
}

fn read_string<R: Read>(r: &mut R, width: LengthWidth) -> Result<String> {
    let len = width.read_len(r)?;
    // `take` bounds the read by what the input actually holds, so a bogus
    // length cannot trigger a huge allocation.
    let mut buf = Vec::new();
    (&mut *r).take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes, found {}", buf.len()),
        )
        .into());
    }
    String::from_utf8(buf).map_err(|e| Error::CorruptBinary {
        reason: format!("invalid UTF-8: {e}"),
    })
}

/// Encode `config` with the native layout.
pub fn to_bytes(config: &Config) -> Vec<u8> {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_bin(&mut out, config, LengthWidth::Native);
    out
}

/// Decode a native-layout buffer into a new tree.
///
/// Trailing bytes after the tree are ignored.
pub fn from_bytes(mut bytes: &[u8]) -> Result<Config> {
    let mut config = Config::new();
    read_bin(&mut bytes, &mut config, LengthWidth::Native)?;
    Ok(config)
}
