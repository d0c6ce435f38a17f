//! The context handed to a sensor for one project analysis.
//!
//! Everything a sensor reads (settings, indexed files, active rules) and
//! everything it reports (measures, issues, highlighting, symbols,
//! duplications, tests, coverage, dependencies) goes through this one value.
//! Reporting is done through short-lived builders that borrow the context
//! mutably, so results from one sensor land in storage before the next
//! builder is created.

use crate::dependency::Dependency;
use crate::duplication::{DuplicationBuilder, DuplicationGroup, DuplicationTokenBuilder};
use crate::errors::{Error, Result};
use crate::fs::{FileSystem, FileType, InputFile};
use crate::highlight::HighlightingBuilder;
use crate::issue::NewIssue;
use crate::measure::{MeasureValue, NewMeasure};
use crate::rule::ActiveRules;
use crate::sensor::storage::SensorStorage;
use crate::settings::Settings;
use crate::symbol::SymbolTableBuilder;
use crate::testplan::{NewTestCase, TestCaseRef, TestCoverage};

pub struct SensorContext<'a> {
    settings: &'a Settings,
    file_system: &'a FileSystem,
    active_rules: &'a ActiveRules,
    storage: &'a mut dyn SensorStorage,
}

impl<'a> SensorContext<'a> {
    pub fn new(
        settings: &'a Settings,
        file_system: &'a FileSystem,
        active_rules: &'a ActiveRules,
        storage: &'a mut dyn SensorStorage,
    ) -> Self {
        Self {
            settings,
            file_system,
            active_rules,
            storage,
        }
    }

    /// Properties of the current analysis.
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// The project's indexed files.
    pub fn file_system(&self) -> &FileSystem {
        self.file_system
    }

    /// Rules active in the current profile.
    pub fn active_rules(&self) -> &ActiveRules {
        self.active_rules
    }

    /// Start a measure. The metric passed to
    /// [`NewMeasure::for_metric`] pins down `T`.
    pub fn new_measure<T: MeasureValue>(&mut self) -> NewMeasure<'_, T> {
        NewMeasure::new(&mut *self.storage)
    }

    /// Start an issue. Saving filters by active rules and suppression
    /// markers, see [`NewIssue::save`].
    pub fn new_issue(&mut self) -> NewIssue<'_> {
        NewIssue::new(&mut *self.storage, self.active_rules)
    }

    /// Start reporting syntax highlighting for one file.
    pub fn highlighting_builder<'b>(&'b mut self, file: &'b InputFile) -> HighlightingBuilder<'b> {
        HighlightingBuilder::new(&mut *self.storage, file)
    }

    /// Start reporting the symbol table of one file.
    pub fn symbol_table_builder<'b>(&'b mut self, file: &'b InputFile) -> SymbolTableBuilder<'b> {
        SymbolTableBuilder::new(&mut *self.storage, file)
    }

    /// Start feeding one file's tokens to the duplication engine.
    pub fn duplication_token_builder<'b>(
        &'b mut self,
        file: &'b InputFile,
    ) -> DuplicationTokenBuilder<'b> {
        DuplicationTokenBuilder::new(&mut *self.storage, file)
    }

    /// Start assembling manually detected duplication groups for one file.
    /// The result of [`DuplicationBuilder::build`] is handed to
    /// [`Self::save_duplications`].
    pub fn duplication_builder<'b>(&'b self, file: &'b InputFile) -> DuplicationBuilder<'b> {
        DuplicationBuilder::new(file)
    }

    /// Save manually detected duplications for `file`. Saving an empty list
    /// is meaningful: it marks the file as handled so the engine skips it.
    /// Every group's origin block must lie in `file`.
    pub fn save_duplications(
        &mut self,
        file: &InputFile,
        groups: Vec<DuplicationGroup>,
    ) -> Result<()> {
        self.require_indexed(file)?;
        for group in &groups {
            if group.origin.file != file.relative_path() {
                return Err(Error::validation(format!(
                    "duplication group for {} has its origin in {}",
                    file.relative_path().display(),
                    group.origin.file.display()
                )));
            }
            if group.duplicates.is_empty() {
                return Err(Error::validation(format!(
                    "duplication group at {}:{} has no duplicate blocks",
                    group.origin.file.display(),
                    group.origin.start_line
                )));
            }
        }
        self.storage
            .store_duplications(file.relative_path().to_path_buf(), groups)
    }

    /// Start registering a test case. Saving returns the [`TestCaseRef`]
    /// that per-test coverage requires.
    pub fn new_test_case(&mut self) -> NewTestCase<'_> {
        NewTestCase::new(&mut *self.storage)
    }

    /// Record which main-code lines of `covered_file` the given test
    /// exercises.
    pub fn save_coverage_per_test(
        &mut self,
        test: &TestCaseRef,
        covered_file: &InputFile,
        lines: &[u32],
    ) -> Result<()> {
        self.require_indexed(covered_file)?;
        if covered_file.file_type() == FileType::Test {
            return Err(Error::validation(format!(
                "{} is a test file, per-test coverage targets main code",
                covered_file.relative_path().display()
            )));
        }
        if lines.is_empty() {
            return Err(Error::validation(format!(
                "test {test} covers no lines of {}",
                covered_file.relative_path().display()
            )));
        }
        let mut lines = lines.to_vec();
        lines.sort_unstable();
        lines.dedup();
        for &line in &lines {
            covered_file.validate_line(line)?;
        }
        self.storage.store_test_coverage(TestCoverage {
            test: test.clone(),
            covered_file: covered_file.relative_path().to_path_buf(),
            lines,
        })
    }

    /// Record that `from` depends on `to` with the given weight.
    pub fn save_dependency(
        &mut self,
        from: &InputFile,
        to: &InputFile,
        weight: u32,
    ) -> Result<()> {
        self.require_indexed(from)?;
        self.require_indexed(to)?;
        if from.relative_path() == to.relative_path() {
            return Err(Error::validation(format!(
                "{} cannot depend on itself",
                from.relative_path().display()
            )));
        }
        if weight == 0 {
            return Err(Error::validation(format!(
                "dependency {} -> {} has weight 0",
                from.relative_path().display(),
                to.relative_path().display()
            )));
        }
        self.storage.store_dependency(Dependency::new(
            from.relative_path().to_path_buf(),
            to.relative_path().to_path_buf(),
            weight,
        ))
    }

    fn require_indexed(&self, file: &InputFile) -> Result<()> {
        if self.file_system.input_file_at(file.relative_path()).is_none() {
            return Err(Error::validation(format!(
                "{} is not part of the indexed file system",
                file.relative_path().display()
            )));
        }
        Ok(())
    }
}
