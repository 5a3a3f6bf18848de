//! Reading and writing configuration files.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::binary::{self, LengthWidth};
use crate::error::{Error, Result};
use crate::options::FormatOptions;
use crate::writer::to_text_with_options;
use crate::{Config, parser};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|_| Error::FileNotFound {
        path: path.to_path_buf(),
    })
}

impl Config {
    /// Parse a text file into this tree.
    ///
    /// Entries the file defines replace existing ones; others are kept.
    /// A file that cannot be opened yields [`Error::FileNotFound`], never a
    /// parse error.
    pub fn read_txt(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut source = String::new();
        BufReader::new(open(path)?).read_to_string(&mut source)?;
        parser::parse_into(&source, self)?;
        debug!(path = %path.display(), entries = self.len(), "read text");
        Ok(())
    }

    /// Load a text file into a new tree.
    pub fn load_txt(path: impl AsRef<Path>) -> Result<Config> {
        let mut config = Config::new();
        config.read_txt(path)?;
        Ok(config)
    }

    /// Write this tree as text with default formatting.
    pub fn write_txt(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_txt_with_options(path, FormatOptions::default())
    }

    /// Write this tree as text.
    pub fn write_txt_with_options(
        &self,
        path: impl AsRef<Path>,
        options: FormatOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = to_text_with_options(self, options);
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(text.as_bytes())?;
        out.flush()?;
        debug!(path = %path.display(), entries = self.len(), "wrote text");
        Ok(())
    }

    /// Read a native-layout binary file into this tree.
    pub fn read_bin(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.read_bin_with(path, LengthWidth::Native)
    }

    /// Read a binary file into this tree.
    pub fn read_bin_with(&mut self, path: impl AsRef<Path>, width: LengthWidth) -> Result<()> {
        let path = path.as_ref();
        let mut input = BufReader::new(open(path)?);
        binary::read_bin(&mut input, self, width)?;
        debug!(path = %path.display(), ?width, entries = self.len(), "read binary");
        Ok(())
    }

    /// Load a native-layout binary file into a new tree.
    pub fn load_bin(path: impl AsRef<Path>) -> Result<Config> {
        let mut config = Config::new();
        config.read_bin(path)?;
        Ok(config)
    }

    /// Write this tree as a native-layout binary file.
    pub fn write_bin(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_bin_with(path, LengthWidth::Native)
    }

    /// Write this tree as a binary file.
    pub fn write_bin_with(&self, path: impl AsRef<Path>, width: LengthWidth) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        binary::write_bin(&mut out, self, width)?;
        out.flush()?;
        debug!(path = %path.display(), ?width, entries = self.len(), "wrote binary");
        Ok(())
    }
}
