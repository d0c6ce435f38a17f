//! Input files, predicates and the project file system handed to sensors.

pub mod input_file;
pub mod predicates;
pub mod system;

pub use input_file::InputFile;
pub use predicates::FilePredicate;
pub use system::{FileIndexer, FileSystem};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Language of an input file, detected from its extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Line-comment prefixes for this language, used by text-based sensors
    pub fn line_comment_prefixes(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["#"],
            Language::Rust
            | Language::JavaScript
            | Language::TypeScript
            | Language::Go
            | Language::Java => &["//"],
            Language::Unknown => &["//", "#"],
        }
    }

    /// Block-comment delimiters, if the language has them
    pub fn block_comment_delimiters(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Language::Rust
            | Language::JavaScript
            | Language::TypeScript
            | Language::Go
            | Language::Java => Some(("/*", "*/")),
            Language::Python | Language::Unknown => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Whether a file holds production code or test code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Main,
    Test,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Main => write!(f, "main"),
            FileType::Test => write!(f, "test"),
        }
    }
}

/// The component a result attaches to: one input file, or the project itself
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputComponent {
    Project,
    /// Project-relative path of the file
    File(PathBuf),
}

impl InputComponent {
    pub fn file(input_file: &InputFile) -> Self {
        InputComponent::File(input_file.relative_path().to_path_buf())
    }

    pub fn is_project(&self) -> bool {
        matches!(self, InputComponent::Project)
    }

    pub fn as_file_path(&self) -> Option<&Path> {
        match self {
            InputComponent::Project => None,
            InputComponent::File(path) => Some(path),
        }
    }
}

impl fmt::Display for InputComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputComponent::Project => write!(f, "<project>"),
            InputComponent::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("pyi"), Language::Python);
        assert_eq!(Language::from_extension("xyz"), Language::Unknown);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("src/main.go")), Language::Go);
        assert_eq!(Language::from_path(Path::new("README")), Language::Unknown);
    }

    #[test]
    fn test_component_display() {
        assert_eq!(InputComponent::Project.to_string(), "<project>");
        let c = InputComponent::File(PathBuf::from("src/lib.rs"));
        assert_eq!(c.to_string(), "src/lib.rs");
    }
}
