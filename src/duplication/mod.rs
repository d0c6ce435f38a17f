//! Copy-paste detection: token streams fed by sensors and duplication
//! groups, either computed by the engine or reported manually.
//!
//! A sensor has two ways in. It can tokenize a file through
//! [`DuplicationTokenBuilder`] and let the engine find repeats across the
//! whole project, or it can report groups it found itself through
//! [`DuplicationBuilder`] plus `save_duplications`. A manual save, even an
//! empty one, marks the file as handled and keeps the engine away from it.

mod engine;

pub use engine::{duplicated_lines, DuplicationConfig, DuplicationEngine};

use crate::errors::{Error, Result};
use crate::fs::InputFile;
use crate::sensor::storage::SensorStorage;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One token of a file, as reported by a tokenizing sensor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    pub line: u32,
    pub image: String,
}

/// The full token sequence of one file, in reading order.
#[derive(Clone, Debug, Serialize)]
pub struct TokenStream {
    file: PathBuf,
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A contiguous run of duplicated lines in one file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DuplicatedBlock {
    pub file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
}

impl DuplicatedBlock {
    pub fn new(file: impl Into<PathBuf>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    pub fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }
}

/// One origin block and every place it is duplicated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicationGroup {
    pub origin: DuplicatedBlock,
    pub duplicates: Vec<DuplicatedBlock>,
}

/// Builder feeding one file's tokens to the duplication engine. Tokens must
/// arrive in reading order.
pub struct DuplicationTokenBuilder<'a> {
    storage: &'a mut dyn SensorStorage,
    file: &'a InputFile,
    tokens: Vec<Token>,
}

impl<'a> DuplicationTokenBuilder<'a> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage, file: &'a InputFile) -> Self {
        Self {
            storage,
            file,
            tokens: Vec::new(),
        }
    }

    pub fn add_token(&mut self, line: u32, image: impl Into<String>) -> Result<&mut Self> {
        self.file.validate_line(line)?;
        let image = image.into();
        if image.trim().is_empty() {
            return Err(Error::validation(format!(
                "empty token on line {line} of {}",
                self.file.relative_path().display()
            )));
        }
        if let Some(last) = self.tokens.last() {
            if line < last.line {
                return Err(Error::validation(format!(
                    "token on line {line} of {} arrives after line {}",
                    self.file.relative_path().display(),
                    last.line
                )));
            }
        }
        self.tokens.push(Token { line, image });
        Ok(self)
    }

    pub fn save(self) -> Result<()> {
        self.storage.store_token_stream(TokenStream {
            file: self.file.relative_path().to_path_buf(),
            tokens: self.tokens,
        })
    }
}

/// Builder assembling manually detected duplication groups. Produces the
/// groups without storing them, so the sensor can pass them on to
/// `save_duplications` or discard them.
pub struct DuplicationBuilder<'a> {
    file: &'a InputFile,
    groups: Vec<DuplicationGroup>,
    current: Option<DuplicationGroup>,
}

impl<'a> DuplicationBuilder<'a> {
    pub(crate) fn new(file: &'a InputFile) -> Self {
        Self {
            file,
            groups: Vec::new(),
            current: None,
        }
    }

    /// Start a new group with its origin block in the builder's file.
    pub fn origin_block(&mut self, start_line: u32, end_line: u32) -> Result<&mut Self> {
        self.validate_span(self.file, start_line, end_line)?;
        if let Some(done) = self.current.take() {
            self.groups.push(done);
        }
        self.current = Some(DuplicationGroup {
            origin: DuplicatedBlock::new(self.file.relative_path(), start_line, end_line),
            duplicates: Vec::new(),
        });
        Ok(self)
    }

    /// Add a copy of the current origin block. The copy may live in any
    /// indexed file, including the origin file itself.
    pub fn duplicated_by(
        &mut self,
        file: &InputFile,
        start_line: u32,
        end_line: u32,
    ) -> Result<&mut Self> {
        self.validate_span(file, start_line, end_line)?;
        let current = self.current.as_mut().ok_or_else(|| {
            Error::validation(format!(
                "duplicate block for {} reported before any origin block",
                self.file.relative_path().display()
            ))
        })?;
        current.duplicates.push(DuplicatedBlock::new(
            file.relative_path(),
            start_line,
            end_line,
        ));
        Ok(self)
    }

    /// Finish and return every group with at least one duplicate.
    pub fn build(mut self) -> Vec<DuplicationGroup> {
        if let Some(done) = self.current.take() {
            self.groups.push(done);
        }
        self.groups
            .into_iter()
            .filter(|group| !group.duplicates.is_empty())
            .collect()
    }

    fn validate_span(&self, file: &InputFile, start_line: u32, end_line: u32) -> Result<()> {
        if start_line > end_line {
            return Err(Error::validation(format!(
                "block {start_line}..{end_line} in {} ends before it starts",
                file.relative_path().display()
            )));
        }
        file.validate_line(start_line)?;
        file.validate_line(end_line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileType, Language};
    use crate::sensor::storage::InMemorySensorStorage;

    fn file(path: &str, lines: usize) -> InputFile {
        let contents = (0..lines)
            .map(|i| format!("line {i}\n"))
            .collect::<String>();
        InputFile::new(
            PathBuf::from(path),
            PathBuf::from("/tmp").join(path),
            contents,
            Language::Rust,
            FileType::Main,
        )
    }

    #[test]
    fn test_token_builder_keeps_reading_order() {
        let f = file("a.rs", 5);
        let mut storage = InMemorySensorStorage::new();
        let mut builder = DuplicationTokenBuilder::new(&mut storage, &f);
        builder.add_token(1, "fn").unwrap();
        builder.add_token(1, "main").unwrap();
        builder.add_token(2, "let").unwrap();
        assert!(builder.add_token(1, "late").is_err());
        builder.save().unwrap();

        let streams = storage.token_streams();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].len(), 3);
    }

    #[test]
    fn test_token_builder_rejects_blank_images() {
        let f = file("a.rs", 5);
        let mut storage = InMemorySensorStorage::new();
        let mut builder = DuplicationTokenBuilder::new(&mut storage, &f);
        assert!(builder.add_token(1, "   ").is_err());
    }

    #[test]
    fn test_manual_builder_groups() {
        let origin = file("a.rs", 30);
        let other = file("b.rs", 30);
        let mut builder = DuplicationBuilder::new(&origin);
        builder.origin_block(1, 10).unwrap();
        builder.duplicated_by(&other, 5, 14).unwrap();
        builder.duplicated_by(&origin, 20, 29).unwrap();
        builder.origin_block(12, 15).unwrap();
        let groups = builder.build();

        // The second group has no duplicates and is dropped.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].origin.start_line, 1);
        assert_eq!(groups[0].duplicates.len(), 2);
    }

    #[test]
    fn test_manual_builder_requires_origin_first() {
        let origin = file("a.rs", 30);
        let other = file("b.rs", 30);
        let mut builder = DuplicationBuilder::new(&origin);
        assert!(builder.duplicated_by(&other, 1, 5).is_err());
    }

    #[test]
    fn test_block_line_count() {
        assert_eq!(DuplicatedBlock::new("a.rs", 3, 3).line_count(), 1);
        assert_eq!(DuplicatedBlock::new("a.rs", 3, 12).line_count(), 10);
    }
}
