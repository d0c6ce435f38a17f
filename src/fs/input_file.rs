//! An indexed source file with its contents and line geometry.

use crate::errors::{Error, Result};
use crate::fs::{FileType, InputComponent, Language};
use crate::text::{TextPointer, TextRange};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// A source file of the analyzed project.
///
/// Carries the full contents plus precomputed line offsets, so result
/// builders can validate positions without re-reading the file. Shared as
/// `Arc<InputFile>` between the file system and sensors.
#[derive(Debug)]
pub struct InputFile {
    relative_path: PathBuf,
    absolute_path: PathBuf,
    language: Language,
    file_type: FileType,
    contents: String,
    line_offsets: Vec<usize>,
    digest: String,
}

impl InputFile {
    pub fn new(
        relative_path: impl Into<PathBuf>,
        absolute_path: impl Into<PathBuf>,
        contents: impl Into<String>,
        language: Language,
        file_type: FileType,
    ) -> Self {
        let contents = contents.into();
        let line_offsets = compute_line_offsets(&contents);
        let digest = digest_of(&contents);
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            language,
            file_type,
            contents,
            line_offsets,
            digest,
        }
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Hex sha256 of the file contents
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn component(&self) -> InputComponent {
        InputComponent::File(self.relative_path.clone())
    }

    /// Number of lines, following `str::lines` semantics: an empty file has
    /// zero lines, a trailing newline does not open a new one.
    pub fn line_count(&self) -> u32 {
        self.line_offsets.len() as u32
    }

    /// Text of the 1-based `line`, without its line terminator
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        let index = (line - 1) as usize;
        let start = *self.line_offsets.get(index)?;
        let end = match self.line_offsets.get(index + 1) {
            Some(next) => next - 1,
            None if self.contents.ends_with('\n') => self.contents.len() - 1,
            None => self.contents.len(),
        };
        let text = &self.contents[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Length in characters of the 1-based `line`
    pub fn line_length(&self, line: u32) -> Option<u32> {
        self.line_text(line).map(|text| text.chars().count() as u32)
    }

    /// Check that a 1-based line exists in this file
    pub fn validate_line(&self, line: u32) -> Result<()> {
        if line == 0 || line > self.line_count() {
            return Err(Error::out_of_bounds(
                &self.relative_path,
                format!("line {} not in 1..={}", line, self.line_count()),
            ));
        }
        Ok(())
    }

    fn validate_pointer(&self, pointer: TextPointer) -> Result<()> {
        self.validate_line(pointer.line)?;
        let length = self.line_length(pointer.line).unwrap_or(0);
        if pointer.column > length {
            return Err(Error::out_of_bounds(
                &self.relative_path,
                format!(
                    "column {} past end of line {} (length {})",
                    pointer.column, pointer.line, length
                ),
            ));
        }
        Ok(())
    }

    /// Check that a non-empty range fits inside this file
    pub fn validate_range(&self, range: &TextRange) -> Result<()> {
        if range.is_empty() {
            return Err(Error::validation(format!(
                "empty range {} in {}",
                range,
                self.relative_path.display()
            )));
        }
        self.validate_pointer(range.start)?;
        self.validate_pointer(range.end)
    }
}

impl PartialEq for InputFile {
    fn eq(&self, other: &Self) -> bool {
        self.relative_path == other.relative_path
    }
}

impl Eq for InputFile {}

impl std::hash::Hash for InputFile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.relative_path.hash(state);
    }
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path.display())
    }
}

fn compute_line_offsets(contents: &str) -> Vec<usize> {
    if contents.is_empty() {
        return Vec::new();
    }
    let mut offsets = vec![0];
    for (index, byte) in contents.bytes().enumerate() {
        if byte == b'\n' && index + 1 < contents.len() {
            offsets.push(index + 1);
        }
    }
    offsets
}

fn digest_of(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(contents: &str) -> InputFile {
        InputFile::new(
            "src/sample.rs",
            "/project/src/sample.rs",
            contents,
            Language::Rust,
            FileType::Main,
        )
    }

    #[test]
    fn test_empty_file_has_no_lines() {
        let f = file("");
        assert_eq!(f.line_count(), 0);
        assert_eq!(f.line_text(1), None);
        assert!(f.validate_line(1).is_err());
    }

    #[test]
    fn test_trailing_newline_does_not_add_line() {
        assert_eq!(file("a\n").line_count(), 1);
        assert_eq!(file("a\nb").line_count(), 2);
        assert_eq!(file("a\nb\n").line_count(), 2);
    }

    #[test]
    fn test_line_text_strips_terminators() {
        let f = file("alpha\r\nbeta\n");
        assert_eq!(f.line_text(1), Some("alpha"));
        assert_eq!(f.line_text(2), Some("beta"));
        assert_eq!(f.line_text(3), None);
    }

    #[test]
    fn test_line_length_in_chars() {
        let f = file("héllo\n");
        assert_eq!(f.line_length(1), Some(5));
    }

    #[test]
    fn test_validate_range_bounds() {
        let f = file("fn main() {}\n");
        assert!(f.validate_range(&TextRange::on_line(1, 0, 2)).is_ok());
        assert!(f.validate_range(&TextRange::on_line(1, 0, 12)).is_ok());
        assert!(f.validate_range(&TextRange::on_line(1, 0, 13)).is_err());
        assert!(f.validate_range(&TextRange::on_line(2, 0, 1)).is_err());
        assert!(f.validate_range(&TextRange::on_line(1, 3, 3)).is_err());
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(file("abc").digest(), file("abc").digest());
        assert_ne!(file("abc").digest(), file("abd").digest());
    }
}
