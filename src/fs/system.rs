//! Project file system: indexing and lookup of input files.

use crate::errors::{Error, Result};
use crate::fs::{FilePredicate, FileType, InputFile, Language};
use crate::progress::{ProgressManager, TEMPLATE_INDEXING};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable view over the indexed files of one analysis, handed to sensors
/// through the context. Cloning is cheap: files are shared as `Arc`s.
#[derive(Clone, Debug)]
pub struct FileSystem {
    base_dir: PathBuf,
    files: Vec<Arc<InputFile>>,
    by_path: HashMap<PathBuf, usize>,
}

impl FileSystem {
    pub fn new(base_dir: impl Into<PathBuf>, mut files: Vec<Arc<InputFile>>) -> Self {
        files.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
        let by_path = files
            .iter()
            .enumerate()
            .map(|(index, file)| (file.relative_path().to_path_buf(), index))
            .collect();
        Self {
            base_dir: base_dir.into(),
            files,
            by_path,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// All indexed files, sorted by relative path
    pub fn iter(&self) -> impl Iterator<Item = &Arc<InputFile>> {
        self.files.iter()
    }

    /// Files matching the predicate, in relative-path order
    pub fn files<'a>(
        &'a self,
        predicate: &'a FilePredicate,
    ) -> impl Iterator<Item = &'a Arc<InputFile>> + 'a {
        self.files.iter().filter(|file| predicate.matches(file))
    }

    /// First file matching the predicate
    pub fn input_file<'a>(&'a self, predicate: &'a FilePredicate) -> Option<&'a Arc<InputFile>> {
        self.files(predicate).next()
    }

    /// Lookup by project-relative path
    pub fn input_file_at(&self, relative_path: &Path) -> Option<&Arc<InputFile>> {
        self.by_path
            .get(relative_path)
            .map(|index| &self.files[*index])
    }

    /// Languages present in the index, Unknown excluded
    pub fn languages(&self) -> BTreeSet<Language> {
        self.files
            .iter()
            .map(|file| file.language())
            .filter(|language| *language != Language::Unknown)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walks a project root and builds the [`FileSystem`].
///
/// Respects gitignore rules, classifies file type from configurable test-path
/// patterns, and loads contents in parallel. Unreadable or non-UTF-8 files
/// are skipped with a warning rather than failing the whole index.
pub struct FileIndexer {
    root: PathBuf,
    test_patterns: Vec<glob::Pattern>,
    exclude_patterns: Vec<glob::Pattern>,
    include_hidden: bool,
}

/// Path patterns classified as test code when no configuration overrides them
pub const DEFAULT_TEST_PATTERNS: &[&str] = &[
    "tests/**",
    "**/tests/**",
    "test/**",
    "**/test/**",
    "*_test.*",
    "**/*_test.*",
    "test_*.*",
    "**/test_*.*",
    "*.spec.*",
    "**/*.spec.*",
];

impl FileIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let test_patterns = DEFAULT_TEST_PATTERNS
            .iter()
            .filter_map(|pattern| glob::Pattern::new(pattern).ok())
            .collect();
        Self {
            root: root.into(),
            test_patterns,
            exclude_patterns: Vec::new(),
            include_hidden: false,
        }
    }

    pub fn with_test_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.test_patterns = compile_patterns(patterns)?;
        Ok(self)
    }

    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_patterns = compile_patterns(patterns)?;
        Ok(self)
    }

    pub fn with_include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn index(&self) -> Result<FileSystem> {
        if !self.root.is_dir() {
            return Err(Error::file_system("not a directory", &self.root));
        }

        let candidates = self.collect_candidates()?;

        let bar = ProgressManager::global()
            .map(|manager| manager.create_bar(candidates.len() as u64, TEMPLATE_INDEXING))
            .unwrap_or_else(indicatif::ProgressBar::hidden);
        bar.set_message("Indexing files");

        let files: Vec<Arc<InputFile>> = candidates
            .par_iter()
            .filter_map(|path| {
                let result = self.load_file(path);
                bar.inc(1);
                result
            })
            .collect();

        bar.finish_and_clear();
        log::debug!(
            "Indexed {} files under {}",
            files.len(),
            self.root.display()
        );
        Ok(FileSystem::new(self.root.clone(), files))
    }

    fn collect_candidates(&self) -> Result<Vec<PathBuf>> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(!self.include_hidden)
            .git_ignore(true)
            .build();

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::file_system(e.to_string(), &self.root))?;
            let path = entry.path();
            if path.is_file() && !self.is_excluded(&self.relative(path)) {
                candidates.push(path.to_path_buf());
            }
        }
        Ok(candidates)
    }

    fn load_file(&self, path: &Path) -> Option<Arc<InputFile>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) => {
                log::warn!("Skipping unreadable file {}: {}", path.display(), error);
                return None;
            }
        };
        let relative = self.relative(path);
        let language = Language::from_path(&relative);
        let file_type = self.classify(&relative);
        Some(Arc::new(InputFile::new(
            relative,
            path.to_path_buf(),
            contents,
            language,
            file_type,
        )))
    }

    fn relative(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf())
    }

    fn classify(&self, relative: &Path) -> FileType {
        let text = relative.to_string_lossy();
        if self
            .test_patterns
            .iter()
            .any(|pattern| pattern.matches(&text))
        {
            FileType::Test
        } else {
            FileType::Main
        }
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        let text = relative.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&text))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|pattern| glob::Pattern::new(pattern).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(path: &str, language: Language, file_type: FileType) -> Arc<InputFile> {
        Arc::new(InputFile::new(
            path,
            format!("/p/{path}"),
            "line\n",
            language,
            file_type,
        ))
    }

    #[test]
    fn test_lookup_by_relative_path() {
        let fs = FileSystem::new(
            "/p",
            vec![
                input("src/lib.rs", Language::Rust, FileType::Main),
                input("src/main.rs", Language::Rust, FileType::Main),
            ],
        );
        assert!(fs.input_file_at(Path::new("src/lib.rs")).is_some());
        assert!(fs.input_file_at(Path::new("src/other.rs")).is_none());
    }

    #[test]
    fn test_files_are_sorted_and_filtered() {
        let fs = FileSystem::new(
            "/p",
            vec![
                input("b.py", Language::Python, FileType::Main),
                input("a.rs", Language::Rust, FileType::Main),
                input("tests/c.rs", Language::Rust, FileType::Test),
            ],
        );
        let rust: Vec<_> = fs
            .files(&FilePredicate::has_language(Language::Rust))
            .map(|f| f.relative_path().to_path_buf())
            .collect();
        assert_eq!(rust, vec![PathBuf::from("a.rs"), PathBuf::from("tests/c.rs")]);
    }

    #[test]
    fn test_languages_exclude_unknown() {
        let fs = FileSystem::new(
            "/p",
            vec![
                input("a.rs", Language::Rust, FileType::Main),
                input("notes.txt", Language::Unknown, FileType::Main),
            ],
        );
        let languages = fs.languages();
        assert!(languages.contains(&Language::Rust));
        assert!(!languages.contains(&Language::Unknown));
        assert_eq!(languages.len(), 1);
    }

    #[test]
    fn test_default_test_classification() {
        let indexer = FileIndexer::new("/p");
        assert_eq!(indexer.classify(Path::new("tests/api.rs")), FileType::Test);
        assert_eq!(
            indexer.classify(Path::new("src/deep/module_test.go")),
            FileType::Test
        );
        assert_eq!(indexer.classify(Path::new("src/lib.rs")), FileType::Main);
    }

    #[test]
    fn test_exclusion_patterns() {
        let indexer = FileIndexer::new("/p")
            .with_exclude_patterns(&["vendor/**".to_string()])
            .unwrap();
        assert!(indexer.is_excluded(Path::new("vendor/dep/lib.rs")));
        assert!(!indexer.is_excluded(Path::new("src/lib.rs")));
    }
}
