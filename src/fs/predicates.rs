//! Composable predicates for selecting input files.
//!
//! Sensors describe the files they want with a `FilePredicate` instead of
//! filtering by hand, so the same expression works against the real project
//! file system and the testkit.

use crate::errors::Result;
use crate::fs::{FileType, InputFile, Language};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum FilePredicate {
    /// Matches every file
    All,
    /// Matches no file
    None,
    HasLanguage(Language),
    HasType(FileType),
    /// Glob pattern matched against the project-relative path
    MatchesPathPattern(glob::Pattern),
    HasRelativePath(PathBuf),
    And(Vec<FilePredicate>),
    Or(Vec<FilePredicate>),
    Not(Box<FilePredicate>),
}

impl FilePredicate {
    pub fn all() -> Self {
        FilePredicate::All
    }

    pub fn none() -> Self {
        FilePredicate::None
    }

    pub fn has_language(language: Language) -> Self {
        FilePredicate::HasLanguage(language)
    }

    pub fn has_type(file_type: FileType) -> Self {
        FilePredicate::HasType(file_type)
    }

    /// Main files only, the most common sensor filter
    pub fn main_files() -> Self {
        FilePredicate::HasType(FileType::Main)
    }

    /// Test files only
    pub fn test_files() -> Self {
        FilePredicate::HasType(FileType::Test)
    }

    pub fn matches_pattern(pattern: &str) -> Result<Self> {
        Ok(FilePredicate::MatchesPathPattern(glob::Pattern::new(
            pattern,
        )?))
    }

    pub fn has_relative_path(path: impl Into<PathBuf>) -> Self {
        FilePredicate::HasRelativePath(path.into())
    }

    pub fn and(self, other: FilePredicate) -> Self {
        match self {
            FilePredicate::And(mut parts) => {
                parts.push(other);
                FilePredicate::And(parts)
            }
            first => FilePredicate::And(vec![first, other]),
        }
    }

    pub fn or(self, other: FilePredicate) -> Self {
        match self {
            FilePredicate::Or(mut parts) => {
                parts.push(other);
                FilePredicate::Or(parts)
            }
            first => FilePredicate::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        FilePredicate::Not(Box::new(self))
    }

    pub fn matches(&self, file: &InputFile) -> bool {
        match self {
            FilePredicate::All => true,
            FilePredicate::None => false,
            FilePredicate::HasLanguage(language) => file.language() == *language,
            FilePredicate::HasType(file_type) => file.file_type() == *file_type,
            FilePredicate::MatchesPathPattern(pattern) => {
                pattern.matches(&file.relative_path().to_string_lossy())
            }
            FilePredicate::HasRelativePath(path) => file.relative_path() == path,
            FilePredicate::And(parts) => parts.iter().all(|p| p.matches(file)),
            FilePredicate::Or(parts) => parts.iter().any(|p| p.matches(file)),
            FilePredicate::Not(inner) => !inner.matches(file),
        }
    }
}
