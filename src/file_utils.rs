use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

// @module: File utilities for input texts and reports

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a text file
    ///
    /// Accepts UTF-8 with or without a byte order mark, and UTF-16 with one.
    pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        Self::decode_text(&bytes).with_context(|| format!("Failed to decode file: {:?}", path))
    }

    /// Decode raw bytes using the byte order mark, defaulting to UTF-8
    ///
    /// Malformed input is an error rather than being replaced.
    pub fn decode_text(bytes: &[u8]) -> Result<String> {
        let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
        if had_errors {
            return Err(anyhow!("Invalid {} input", encoding.name()));
        }
        Ok(text.into_owned())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
