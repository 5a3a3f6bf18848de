//! The configuration tree.
//!
//! A [`Config`] holds two independent collections, each kept sorted by name:
//! scalar variables (stored as escaped text) and nested configurations.
//! A variable and a nested configuration may share a name.

use crate::error::{Error, Result};
use crate::scalar::{
    decode_char, decode_int, decode_real, decode_str, encode_char, encode_int, encode_real,
    encode_str, is_valid_name, validate_name,
};

/// Deepest allowed chain of nested blocks.
///
/// Every way of building a tree (parsing, insertion, binary input) enforces
/// it, so anything one reader accepts the other does too.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Variable {
    name: String,
    /// Escaped on-disk representation of the value.
    raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    config: Config,
}

/// A tree of configuration variables.
///
/// Nested configurations are owned by value: inserting, replacing or cloning
/// always copies, so two trees never share storage.
///
/// A tree cannot be nested inside itself; the borrow checker rejects it:
///
/// ```compile_fail
/// let mut cfg = configfile::Config::new();
/// cfg.insert_config("me", &cfg).unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    variables: Vec<Variable>,
    sections: Vec<Section>,
}

/// `config` may only become a child if that keeps the chain within [`MAX_DEPTH`].
fn check_nesting(name: &str, config: &Config) -> Result<()> {
    if config.depth() >= MAX_DEPTH {
        return Err(Error::TooDeep {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn find_variable(vars: &[Variable], name: &str) -> std::result::Result<usize, usize> {
    vars.binary_search_by(|v| v.name.as_str().cmp(name))
}

fn find_section(sections: &[Section], name: &str) -> std::result::Result<usize, usize> {
    sections.binary_search_by(|s| s.name.as_str().cmp(name))
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- counts -----------------------------------------------------------

    /// Number of scalar variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of nested configurations.
    pub fn config_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of entries (variables plus nested configurations).
    pub fn len(&self) -> usize {
        self.variables.len() + self.sections.len()
    }

    /// Whether the configuration has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.sections.is_empty()
    }

    /// Length of the longest chain of nested blocks; 0 without blocks.
    pub fn depth(&self) -> usize {
        self.sections
            .iter()
            .map(|s| 1 + s.config.depth())
            .max()
            .unwrap_or(0)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.sections.clear();
    }

    /// Iterate over `(name, raw value)` pairs in name order.
    pub fn variables(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.variables
            .iter()
            .map(|v| (v.name.as_str(), v.raw.as_str()))
    }

    /// Iterate over `(name, config)` pairs in name order.
    pub fn sections(&self) -> impl ExactSizeIterator<Item = (&str, &Config)> + '_ {
        self.sections
            .iter()
            .map(|s| (s.name.as_str(), &s.config))
    }

    // ---- insertion --------------------------------------------------------

    fn insert_raw(&mut self, name: &str, raw: String) -> Result<()> {
        validate_name(name)?;
        match find_variable(&self.variables, name) {
            Ok(_) => Err(Error::already_exists(name)),
            Err(idx) => {
                self.variables.insert(
                    idx,
                    Variable {
                        name: name.to_string(),
                        raw,
                    },
                );
                Ok(())
            }
        }
    }

    /// Insert a string variable.
    pub fn insert_str(&mut self, name: &str, value: &str) -> Result<()> {
        self.insert_raw(name, encode_str(value).into_owned())
    }

    /// Insert an integer variable.
    pub fn insert_int(&mut self, name: &str, value: i64) -> Result<()> {
        self.insert_raw(name, encode_int(value))
    }

    /// Insert a real variable.
    pub fn insert_real(&mut self, name: &str, value: f64) -> Result<()> {
        self.insert_raw(name, encode_real(value))
    }

    /// Insert a character variable.
    pub fn insert_char(&mut self, name: &str, value: char) -> Result<()> {
        self.insert_raw(name, encode_char(value))
    }

    /// Insert a copy of `config` as a nested configuration.
    pub fn insert_config(&mut self, name: &str, config: &Config) -> Result<()> {
        validate_name(name)?;
        check_nesting(name, config)?;
        match find_section(&self.sections, name) {
            Ok(_) => Err(Error::already_exists(name)),
            Err(idx) => {
                self.sections.insert(
                    idx,
                    Section {
                        name: name.to_string(),
                        config: config.clone(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Store a string variable, replacing any existing value of that name.
    ///
    /// This is the reload policy used by the text and binary readers: a
    /// name seen twice keeps the last value instead of failing. The caller
    /// guarantees `name` is valid.
    pub(crate) fn upsert_str(&mut self, name: &str, value: &str) {
        debug_assert!(is_valid_name(name), "invalid name {name:?}");
        let raw = encode_str(value).into_owned();
        match find_variable(&self.variables, name) {
            Ok(idx) => self.variables[idx].raw = raw,
            Err(idx) => self.variables.insert(
                idx,
                Variable {
                    name: name.to_string(),
                    raw,
                },
            ),
        }
    }

    /// Store a nested configuration, replacing any existing one of that name.
    pub(crate) fn upsert_config(&mut self, name: &str, config: Config) {
        debug_assert!(is_valid_name(name), "invalid name {name:?}");
        match find_section(&self.sections, name) {
            Ok(idx) => self.sections[idx].config = config,
            Err(idx) => self.sections.insert(
                idx,
                Section {
                    name: name.to_string(),
                    config,
                },
            ),
        }
    }

    // ---- access -----------------------------------------------------------

    /// Get the raw (escaped) value of a variable.
    pub fn get(&self, name: &str) -> Result<&str> {
        find_variable(&self.variables, name)
            .map(|idx| self.variables[idx].raw.as_str())
            .map_err(|_| Error::not_found(name))
    }

    /// Get a variable as a string, with escapes decoded.
    pub fn get_str(&self, name: &str) -> Result<String> {
        Ok(decode_str(self.get(name)?).into_owned())
    }

    /// Get a variable as an integer.
    pub fn get_int(&self, name: &str) -> Result<i64> {
        Ok(decode_int(self.get(name)?)?)
    }

    /// Get a variable as a real.
    pub fn get_real(&self, name: &str) -> Result<f64> {
        Ok(decode_real(self.get(name)?)?)
    }

    /// Get a variable as a character.
    pub fn get_char(&self, name: &str) -> Result<char> {
        Ok(decode_char(self.get(name)?)?)
    }

    /// Get a nested configuration.
    pub fn get_config(&self, name: &str) -> Result<&Config> {
        find_section(&self.sections, name)
            .map(|idx| &self.sections[idx].config)
            .map_err(|_| Error::not_found(name))
    }

    /// Walk a dotted path of nested configurations, e.g. `"video.window"`.
    ///
    /// An empty path returns `self`.
    pub fn config_at(&self, path: &str) -> Result<&Config> {
        if path.is_empty() {
            return Ok(self);
        }
        path.split('.')
            .try_fold(self, |config, segment| config.get_config(segment))
    }

    /// Get the raw value at a dotted path, e.g. `"video.window.width"`.
    pub fn get_path(&self, path: &str) -> Result<&str> {
        match path.rsplit_once('.') {
            Some((parent, name)) => self.config_at(parent)?.get(name),
            None => self.get(path),
        }
    }

    // ---- update -----------------------------------------------------------

    fn set_raw(&mut self, name: &str, raw: String) -> Result<()> {
        let idx = find_variable(&self.variables, name).map_err(|_| Error::not_found(name))?;
        self.variables[idx].raw = raw;
        Ok(())
    }

    /// Overwrite an existing variable with a string.
    pub fn set_str(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_raw(name, encode_str(value).into_owned())
    }

    /// Overwrite an existing variable with an integer.
    pub fn set_int(&mut self, name: &str, value: i64) -> Result<()> {
        self.set_raw(name, encode_int(value))
    }

    /// Overwrite an existing variable with a real.
    pub fn set_real(&mut self, name: &str, value: f64) -> Result<()> {
        self.set_raw(name, encode_real(value))
    }

    /// Overwrite an existing variable with a character.
    pub fn set_char(&mut self, name: &str, value: char) -> Result<()> {
        self.set_raw(name, encode_char(value))
    }

    /// Replace an existing nested configuration with a copy of `config`.
    pub fn set_config(&mut self, name: &str, config: &Config) -> Result<()> {
        let idx = find_section(&self.sections, name).map_err(|_| Error::not_found(name))?;
        check_nesting(name, config)?;
        self.sections[idx].config = config.clone();
        Ok(())
    }

    // ---- removal ----------------------------------------------------------

    /// Remove a variable.
    pub fn erase(&mut self, name: &str) -> Result<()> {
        let idx = find_variable(&self.variables, name).map_err(|_| Error::not_found(name))?;
        self.variables.remove(idx);
        Ok(())
    }

    /// Remove a nested configuration.
    pub fn erase_config(&mut self, name: &str) -> Result<()> {
        let idx = find_section(&self.sections, name).map_err(|_| Error::not_found(name))?;
        self.sections.remove(idx);
        Ok(())
    }
}
