//! The sensor test harness.

use crate::dependency::Dependency;
use crate::duplication::{DuplicationGroup, TokenStream};
use crate::fs::{FileSystem, InputComponent, InputFile};
use crate::highlight::HighlightKind;
use crate::issue::Issue;
use crate::measure::Measure;
use crate::rule::{ActiveRule, ActiveRules};
use crate::sensor::{InMemorySensorStorage, SensorContext};
use crate::settings::Settings;
use crate::testplan::{TestCase, TestCoverage};
use crate::text::{TextPointer, TextRange};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A sensor context over in-memory state, plus accessors for everything a
/// sensor saved through it.
///
/// Build one with the project files, settings and rules the test needs,
/// run the sensor against [`context()`](Self::context), then assert on the
/// stored results:
///
/// ```rust,ignore
/// let mut tester = SensorContextTester::new("/proj")
///     .with_file(TestInputFile::new("src/lib.rs", "// TODO: later\n").build())
///     .activate(ActiveRule::new(RuleKey::new("sensorkit", "todo-comment")));
///
/// TodoSensor.execute(&mut tester.context()).unwrap();
/// assert_eq!(tester.issues().len(), 1);
/// ```
pub struct SensorContextTester {
    base_dir: PathBuf,
    settings: Settings,
    files: Vec<Arc<InputFile>>,
    file_system: FileSystem,
    active_rules: ActiveRules,
    storage: InMemorySensorStorage,
}

impl SensorContextTester {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            file_system: FileSystem::new(base_dir.clone(), Vec::new()),
            base_dir,
            settings: Settings::new(),
            files: Vec::new(),
            active_rules: ActiveRules::new(),
            storage: InMemorySensorStorage::new(),
        }
    }

    /// Index a file. Usually built with
    /// [`TestInputFile`](crate::testkit::TestInputFile).
    pub fn with_file(mut self, file: InputFile) -> Self {
        self.files.push(Arc::new(file));
        self.file_system = FileSystem::new(self.base_dir.clone(), self.files.clone());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn set_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.set(key, value);
        self
    }

    pub fn with_active_rules(mut self, rules: ActiveRules) -> Self {
        self.active_rules = rules;
        self
    }

    /// Activate one more rule on top of whatever is already active.
    pub fn activate(mut self, rule: ActiveRule) -> Self {
        let mut builder = ActiveRules::builder();
        for existing in self.active_rules.iter() {
            builder = builder.activate(existing.clone());
        }
        self.active_rules = builder.activate(rule).build();
        self
    }

    /// A fresh context over this tester's state. Results accumulate in the
    /// tester across contexts, like they do across sensors in a real run.
    pub fn context(&mut self) -> SensorContext<'_> {
        SensorContext::new(
            &self.settings,
            &self.file_system,
            &self.active_rules,
            &mut self.storage,
        )
    }

    pub fn file_system(&self) -> &FileSystem {
        &self.file_system
    }

    /// The indexed file at `path`, for handing to result builders.
    pub fn input_file(&self, path: impl AsRef<Path>) -> Option<Arc<InputFile>> {
        self.file_system.input_file_at(path.as_ref()).cloned()
    }

    /// The component key of the file at `path`.
    pub fn component(&self, path: impl Into<PathBuf>) -> InputComponent {
        InputComponent::File(path.into())
    }

    // Inspection of stored results

    pub fn measures(&self) -> &[Measure] {
        self.storage.measures()
    }

    pub fn measure(&self, component: &InputComponent, metric_key: &str) -> Option<&Measure> {
        self.storage.measure_for(component, metric_key)
    }

    pub fn issues(&self) -> &[Issue] {
        self.storage.issues()
    }

    pub fn suppressed_issue_count(&self) -> usize {
        self.storage.suppressed_issue_count()
    }

    /// Highlighting kinds covering `pointer` in `file`, outermost first.
    pub fn highlighting_at(&self, file: &Path, pointer: TextPointer) -> Vec<HighlightKind> {
        self.storage
            .highlighting()
            .iter()
            .filter(|h| h.file() == file)
            .flat_map(|h| h.spans())
            .filter(|span| span.range.contains(pointer))
            .map(|span| span.kind)
            .collect()
    }

    /// References of the symbol declared at `pointer` in `file`.
    pub fn symbol_references_at(&self, file: &Path, pointer: TextPointer) -> Vec<TextRange> {
        self.storage
            .symbol_tables()
            .iter()
            .filter(|t| t.file() == file)
            .flat_map(|t| t.symbols())
            .find(|symbol| symbol.declaration().contains(pointer))
            .map(|symbol| symbol.references().to_vec())
            .unwrap_or_default()
    }

    pub fn duplication_groups(&self, file: &Path) -> &[DuplicationGroup] {
        self.storage
            .duplications()
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn token_stream(&self, file: &Path) -> Option<&TokenStream> {
        self.storage
            .token_streams()
            .iter()
            .find(|stream| stream.file() == file)
    }

    pub fn test_cases(&self) -> &[TestCase] {
        self.storage.test_cases()
    }

    /// Coverage saved for the test case `name` in `file`, one entry per
    /// covered main file.
    pub fn coverage_per_test(&self, file: &Path, name: &str) -> Vec<&TestCoverage> {
        self.storage
            .test_coverage()
            .iter()
            .filter(|c| c.test.file() == file && c.test.name() == name)
            .collect()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        self.storage.dependencies()
    }

    pub fn storage(&self) -> &InMemorySensorStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::metrics;
    use crate::rule::RuleKey;
    use crate::testkit::TestInputFile;

    #[test]
    fn test_measure_flow_through_tester() {
        let mut tester = SensorContextTester::new("/proj")
            .with_file(TestInputFile::new("src/lib.rs", "fn f() {}\n").build());
        let file = tester.input_file("src/lib.rs").unwrap();

        let mut ctx = tester.context();
        ctx.new_measure()
            .on_file(&file)
            .for_metric(&metrics::NCLOC)
            .with_value(1)
            .save()
            .unwrap();

        let component = tester.component("src/lib.rs");
        let measure = tester.measure(&component, "ncloc").unwrap();
        assert_eq!(measure.value_as::<i64>(), Some(1));
        assert!(tester.measure(&component, "lines").is_none());
    }

    #[test]
    fn test_issue_requires_active_rule() {
        let key = RuleKey::new("sensorkit", "todo-comment");
        let mut tester = SensorContextTester::new("/proj")
            .with_file(TestInputFile::new("src/lib.rs", "// TODO: x\n").build());
        let file = tester.input_file("src/lib.rs").unwrap();

        // Rule not active: issue dropped.
        let saved = tester
            .context()
            .new_issue()
            .on_file(&file)
            .for_rule(key.clone())
            .at_line(1)
            .message("todo")
            .save()
            .unwrap();
        assert!(!saved);
        assert!(tester.issues().is_empty());

        let mut tester = tester.activate(ActiveRule::new(key.clone()));
        let saved = tester
            .context()
            .new_issue()
            .on_file(&file)
            .for_rule(key)
            .at_line(1)
            .message("todo")
            .save()
            .unwrap();
        assert!(saved);
        assert_eq!(tester.issues().len(), 1);
    }

    #[test]
    fn test_highlighting_and_symbol_lookup() {
        use crate::highlight::HighlightKind;

        let mut tester = SensorContextTester::new("/proj").with_file(
            TestInputFile::new("src/lib.rs", "fn name() {}\nname();\n").build(),
        );
        let file = tester.input_file("src/lib.rs").unwrap();

        let mut ctx = tester.context();
        let mut highlighting = ctx.highlighting_builder(&file);
        highlighting
            .highlight(TextRange::on_line(1, 0, 2), HighlightKind::Keyword)
            .unwrap();
        highlighting.save().unwrap();

        let mut ctx = tester.context();
        let mut symbols = ctx.symbol_table_builder(&file);
        let id = symbols.declare_symbol(TextRange::on_line(1, 3, 7)).unwrap();
        symbols
            .add_reference(id, TextRange::on_line(2, 0, 4))
            .unwrap();
        symbols.save().unwrap();

        let path = Path::new("src/lib.rs");
        assert_eq!(
            tester.highlighting_at(path, TextPointer::new(1, 1)),
            vec![HighlightKind::Keyword]
        );
        assert!(tester.highlighting_at(path, TextPointer::new(1, 5)).is_empty());

        let references = tester.symbol_references_at(path, TextPointer::new(1, 4));
        assert_eq!(references, vec![TextRange::on_line(2, 0, 4)]);
        assert!(tester
            .symbol_references_at(path, TextPointer::new(2, 1))
            .is_empty());
    }

    #[test]
    fn test_coverage_per_test_lookup() {
        use crate::fs::FileType;
        use crate::testplan::TestStatus;

        let mut tester = SensorContextTester::new("/proj")
            .with_file(TestInputFile::new("src/lib.rs", "fn f() {}\nfn g() {}\n").build())
            .with_file(
                TestInputFile::new("tests/t.rs", "fn test_f() {}\n")
                    .with_type(FileType::Test)
                    .build(),
            );
        let test_file = tester.input_file("tests/t.rs").unwrap();
        let main_file = tester.input_file("src/lib.rs").unwrap();

        let mut ctx = tester.context();
        let test_ref = ctx
            .new_test_case()
            .in_file(&test_file)
            .named("test_f")
            .with_status(TestStatus::Ok)
            .save()
            .unwrap();
        ctx.save_coverage_per_test(&test_ref, &main_file, &[1])
            .unwrap();

        let coverage = tester.coverage_per_test(Path::new("tests/t.rs"), "test_f");
        assert_eq!(coverage.len(), 1);
        assert_eq!(coverage[0].lines, vec![1]);
        assert!(tester
            .coverage_per_test(Path::new("tests/t.rs"), "other")
            .is_empty());
    }
}
