//! In-memory input files for tests.

use crate::fs::{FileType, InputFile, Language};
use std::path::PathBuf;

/// Builder for an [`InputFile`] backed by a string.
///
/// Language defaults to what the path's extension suggests and the file
/// type to `Main`; both can be overridden.
///
/// ```rust,ignore
/// let file = TestInputFile::new("tests/login_test.rs", "fn t() {}\n")
///     .with_type(FileType::Test)
///     .build();
/// ```
pub struct TestInputFile {
    relative_path: PathBuf,
    contents: String,
    language: Option<Language>,
    file_type: FileType,
    base_dir: PathBuf,
}

impl TestInputFile {
    pub fn new(relative_path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
            language: None,
            file_type: FileType::Main,
            base_dir: PathBuf::from("/virtual"),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    /// Base directory the absolute path is derived from. Only matters for
    /// code that inspects absolute paths; defaults to `/virtual`.
    pub fn under(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn build(self) -> InputFile {
        let language = self
            .language
            .unwrap_or_else(|| Language::from_path(&self.relative_path));
        let absolute = self.base_dir.join(&self.relative_path);
        InputFile::new(
            self.relative_path,
            absolute,
            self.contents,
            language,
            self.file_type,
        )
    }
}
