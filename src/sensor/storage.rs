//! Where sensor results go.
//!
//! [`SensorStorage`] is the seam between the analysis API and its host: the
//! bundled runner stores into [`InMemorySensorStorage`] and reads the results
//! back for reporting, an embedding host can implement the trait and stream
//! results wherever it wants. Semantic validation happens in the builders
//! before a store call; implementations only enforce the one-save-per-key
//! rules they can check locally.

use crate::dependency::Dependency;
use crate::duplication::{DuplicationGroup, TokenStream};
use crate::errors::{Error, Result};
use crate::fs::InputComponent;
use crate::highlight::FileHighlighting;
use crate::issue::Issue;
use crate::measure::Measure;
use crate::rule::RuleKey;
use crate::symbol::SymbolTable;
use crate::testplan::{TestCase, TestCaseRef, TestCoverage};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub trait SensorStorage {
    /// Store a measure. One value per metric and component.
    fn store_measure(&mut self, measure: Measure) -> Result<()>;

    fn store_issue(&mut self, issue: Issue) -> Result<()>;

    /// Called instead of `store_issue` when a suppression marker dropped the
    /// issue. Hosts that do not track suppressions can ignore it.
    fn note_suppressed_issue(&mut self, rule: &RuleKey, component: &InputComponent, line: u32) {
        let _ = (rule, component, line);
    }

    /// Store a file's highlighting. One set per file.
    fn store_highlighting(&mut self, highlighting: FileHighlighting) -> Result<()>;

    /// Store a file's symbol table. One table per file.
    fn store_symbol_table(&mut self, table: SymbolTable) -> Result<()>;

    /// Store a file's token stream for the duplication engine. One stream
    /// per file.
    fn store_token_stream(&mut self, stream: TokenStream) -> Result<()>;

    /// Store manually detected duplications for a file. An empty group list
    /// still counts as a save: the file was analyzed and the engine must
    /// leave it alone.
    fn store_duplications(&mut self, file: PathBuf, groups: Vec<DuplicationGroup>) -> Result<()>;

    /// Register a test case and hand back the reference that per-test
    /// coverage requires. One case per (file, name).
    fn store_test_case(&mut self, test_case: TestCase) -> Result<TestCaseRef>;

    /// Attach covered lines to a registered test case. Fails with
    /// [`Error::UnknownTestCase`] for a reference this storage never issued.
    fn store_test_coverage(&mut self, coverage: TestCoverage) -> Result<()>;

    fn store_dependency(&mut self, dependency: Dependency) -> Result<()>;
}

/// Collecting storage used by the bundled runner and the test fixtures.
#[derive(Default)]
pub struct InMemorySensorStorage {
    measures: Vec<Measure>,
    measure_keys: HashSet<(InputComponent, &'static str)>,
    issues: Vec<Issue>,
    suppressed_issues: usize,
    highlighting: Vec<FileHighlighting>,
    highlighted_files: HashSet<PathBuf>,
    symbol_tables: Vec<SymbolTable>,
    symbol_files: HashSet<PathBuf>,
    token_streams: Vec<TokenStream>,
    tokenized_files: HashSet<PathBuf>,
    duplications: BTreeMap<PathBuf, Vec<DuplicationGroup>>,
    test_cases: Vec<TestCase>,
    test_case_keys: HashSet<(PathBuf, String)>,
    test_coverage: Vec<TestCoverage>,
    coverage_keys: HashSet<(TestCaseRef, PathBuf)>,
    dependencies: Vec<Dependency>,
    dependency_keys: HashSet<(PathBuf, PathBuf)>,
}

impl InMemorySensorStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn measure_for(&self, component: &InputComponent, metric_key: &str) -> Option<&Measure> {
        self.measures
            .iter()
            .find(|m| m.component() == component && m.metric_key() == metric_key)
    }

    pub fn has_measure(&self, component: &InputComponent, metric_key: &str) -> bool {
        self.measure_for(component, metric_key).is_some()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn suppressed_issue_count(&self) -> usize {
        self.suppressed_issues
    }

    pub fn highlighting(&self) -> &[FileHighlighting] {
        &self.highlighting
    }

    pub fn symbol_tables(&self) -> &[SymbolTable] {
        &self.symbol_tables
    }

    pub fn token_streams(&self) -> &[TokenStream] {
        &self.token_streams
    }

    /// Files with a duplication save, manual or engine-made. Includes files
    /// saved with an empty group list.
    pub fn duplications(&self) -> &BTreeMap<PathBuf, Vec<DuplicationGroup>> {
        &self.duplications
    }

    pub fn has_duplications_for(&self, file: &Path) -> bool {
        self.duplications.contains_key(file)
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn test_coverage(&self) -> &[TestCoverage] {
        &self.test_coverage
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

impl SensorStorage for InMemorySensorStorage {
    fn store_measure(&mut self, measure: Measure) -> Result<()> {
        let key = (measure.component().clone(), measure.metric_key());
        if !self.measure_keys.insert(key) {
            return Err(Error::duplicate(
                "measure",
                format!("{} on {}", measure.metric_key(), measure.component()),
            ));
        }
        self.measures.push(measure);
        Ok(())
    }

    fn store_issue(&mut self, issue: Issue) -> Result<()> {
        self.issues.push(issue);
        Ok(())
    }

    fn note_suppressed_issue(&mut self, _rule: &RuleKey, _component: &InputComponent, _line: u32) {
        self.suppressed_issues += 1;
    }

    fn store_highlighting(&mut self, highlighting: FileHighlighting) -> Result<()> {
        if !self.highlighted_files.insert(highlighting.file().clone()) {
            return Err(Error::duplicate(
                "highlighting",
                highlighting.file().display().to_string(),
            ));
        }
        self.highlighting.push(highlighting);
        Ok(())
    }

    fn store_symbol_table(&mut self, table: SymbolTable) -> Result<()> {
        if !self.symbol_files.insert(table.file().clone()) {
            return Err(Error::duplicate(
                "symbol table",
                table.file().display().to_string(),
            ));
        }
        self.symbol_tables.push(table);
        Ok(())
    }

    fn store_token_stream(&mut self, stream: TokenStream) -> Result<()> {
        if !self.tokenized_files.insert(stream.file().to_path_buf()) {
            return Err(Error::duplicate(
                "token stream",
                stream.file().display().to_string(),
            ));
        }
        self.token_streams.push(stream);
        Ok(())
    }

    fn store_duplications(&mut self, file: PathBuf, groups: Vec<DuplicationGroup>) -> Result<()> {
        if self.duplications.contains_key(&file) {
            return Err(Error::duplicate(
                "duplications",
                file.display().to_string(),
            ));
        }
        self.duplications.insert(file, groups);
        Ok(())
    }

    fn store_test_case(&mut self, test_case: TestCase) -> Result<TestCaseRef> {
        let key = (test_case.file().to_path_buf(), test_case.name().to_string());
        if !self.test_case_keys.insert(key.clone()) {
            return Err(Error::duplicate(
                "test case",
                format!("{}#{}", key.0.display(), key.1),
            ));
        }
        let reference = TestCaseRef::new(key.0, key.1);
        self.test_cases.push(test_case);
        Ok(reference)
    }

    fn store_test_coverage(&mut self, coverage: TestCoverage) -> Result<()> {
        let key = (
            coverage.test.file().to_path_buf(),
            coverage.test.name().to_string(),
        );
        if !self.test_case_keys.contains(&key) {
            return Err(Error::UnknownTestCase {
                file: key.0,
                name: key.1,
            });
        }
        let coverage_key = (coverage.test.clone(), coverage.covered_file.clone());
        if !self.coverage_keys.insert(coverage_key) {
            return Err(Error::duplicate(
                "per-test coverage",
                format!("{} covering {}", coverage.test, coverage.covered_file.display()),
            ));
        }
        self.test_coverage.push(coverage);
        Ok(())
    }

    fn store_dependency(&mut self, dependency: Dependency) -> Result<()> {
        let key = (
            dependency.from().to_path_buf(),
            dependency.to().to_path_buf(),
        );
        if !self.dependency_keys.insert(key) {
            return Err(Error::duplicate(
                "dependency",
                format!(
                    "{} -> {}",
                    dependency.from().display(),
                    dependency.to().display()
                ),
            ));
        }
        self.dependencies.push(dependency);
        Ok(())
    }
}
