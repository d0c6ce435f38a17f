//! Runs registered sensors over an indexed project and assembles the
//! results.
//!
//! Sensors run one after another against a shared storage: each one sees a
//! context wired to the same [`InMemorySensorStorage`], and the one-save-per
//! key rules apply across the whole run. After the sensors, three post
//! phases run: the duplication engine over the collected token streams, the
//! aggregate measures no sensor saved itself, and the dependency graph.

use crate::dependency::DependencyGraph;
use crate::duplication::{duplicated_lines, DuplicationConfig, DuplicationEngine};
use crate::errors::{Error, Result};
use crate::fs::{FileSystem, InputComponent};
use crate::measure::{metrics, Measure, Value};
use crate::progress::{ProgressManager, TEMPLATE_SENSORS};
use crate::report::{AnalysisResults, ProjectSummary, SensorOutcome};
use crate::rule::ActiveRules;
use crate::runner::SensorRegistry;
use crate::sensor::{InMemorySensorStorage, SensorContext, SensorDescriptor, SensorStorage};
use crate::settings::Settings;
use crate::testplan::TestStatus;
use std::time::Instant;

pub struct SensorExecutor {
    registry: SensorRegistry,
    fail_fast: bool,
}

impl SensorExecutor {
    pub fn new(registry: SensorRegistry) -> Self {
        Self {
            registry,
            fail_fast: false,
        }
    }

    /// Abort the run on the first sensor error instead of recording it and
    /// carrying on.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn execute(
        &self,
        settings: &Settings,
        file_system: &FileSystem,
        active_rules: &ActiveRules,
    ) -> Result<AnalysisResults> {
        let started = Instant::now();
        let timestamp = chrono::Utc::now();
        let mut storage = InMemorySensorStorage::new();
        let mut outcomes = Vec::with_capacity(self.registry.len());

        let bar = ProgressManager::global()
            .map(|manager| manager.create_bar(self.registry.len() as u64, TEMPLATE_SENSORS))
            .unwrap_or_else(indicatif::ProgressBar::hidden);
        bar.set_message("Running sensors");

        for sensor in self.registry.iter() {
            let descriptor = sensor.describe();
            let name = descriptor.name().to_string();

            if let Some(reason) = skip_reason(&descriptor, file_system, active_rules) {
                log::debug!("skipping sensor {name}: {reason}");
                outcomes.push(SensorOutcome::skipped(name, reason));
                bar.inc(1);
                continue;
            }

            let sensor_started = Instant::now();
            let mut context =
                SensorContext::new(settings, file_system, active_rules, &mut storage);
            match sensor.execute(&mut context) {
                Ok(()) => {
                    let elapsed = elapsed_ms(sensor_started);
                    log::info!("sensor {name} finished in {elapsed}ms");
                    outcomes.push(SensorOutcome::executed(name, elapsed));
                }
                Err(e) => {
                    let elapsed = elapsed_ms(sensor_started);
                    if self.fail_fast {
                        bar.finish_and_clear();
                        return Err(Error::Sensor {
                            name,
                            source: Box::new(e),
                        });
                    }
                    log::error!("sensor {name} failed after {elapsed}ms: {e}");
                    outcomes.push(SensorOutcome::failed(name, e.to_string(), elapsed));
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        self.run_duplication_engine(settings, &mut storage)?;
        aggregate_measures(file_system, &mut storage)?;

        let graph = DependencyGraph::from_dependencies(storage.dependencies());
        let dependency_cycles = graph.cycles();
        if !dependency_cycles.is_empty() {
            log::warn!(
                "found {} dependency cycles in the project",
                dependency_cycles.len()
            );
        }

        Ok(AnalysisResults {
            project: ProjectSummary {
                base_dir: file_system.base_dir().to_path_buf(),
                files: file_system.len(),
                languages: file_system
                    .languages()
                    .into_iter()
                    .map(|l| l.to_string())
                    .collect(),
            },
            timestamp,
            duration_ms: elapsed_ms(started),
            sensors: outcomes,
            measures: storage.measures().to_vec(),
            issues: storage.issues().to_vec(),
            suppressed_issues: storage.suppressed_issue_count(),
            highlighting: storage.highlighting().to_vec(),
            symbol_tables: storage.symbol_tables().to_vec(),
            duplications: storage.duplications().clone(),
            test_cases: storage.test_cases().to_vec(),
            test_coverage: storage.test_coverage().to_vec(),
            dependencies: storage.dependencies().to_vec(),
            dependency_cycles,
        })
    }

    /// Feed every tokenized file without a manual duplication save to the
    /// engine and store what it finds.
    fn run_duplication_engine(
        &self,
        settings: &Settings,
        storage: &mut InMemorySensorStorage,
    ) -> Result<()> {
        let config = DuplicationConfig::from_settings(settings)?;
        let streams: Vec<_> = storage
            .token_streams()
            .iter()
            .filter(|stream| !storage.has_duplications_for(stream.file()))
            .cloned()
            .collect();
        if streams.is_empty() {
            return Ok(());
        }

        let detected = DuplicationEngine::new(config).detect(&streams);
        for (file, groups) in detected {
            log::debug!(
                "duplication engine found {} groups in {}",
                groups.len(),
                file.display()
            );
            storage.store_duplications(file, groups)?;
        }
        Ok(())
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

/// Why a sensor should not run against this project, if any reason applies.
fn skip_reason(
    descriptor: &SensorDescriptor,
    file_system: &FileSystem,
    active_rules: &ActiveRules,
) -> Option<String> {
    if !descriptor.languages().is_empty() {
        let present = file_system.languages();
        if !descriptor.languages().iter().any(|l| present.contains(l)) {
            let wanted: Vec<String> = descriptor
                .languages()
                .iter()
                .map(|l| l.to_string())
                .collect();
            return Some(format!("no files of language {}", wanted.join("/")));
        }
    }
    if !descriptor.repositories().is_empty() {
        let active = active_rules.repositories();
        if !descriptor
            .repositories()
            .iter()
            .any(|repo| active.contains(repo.as_str()))
        {
            return Some(format!(
                "no active rules in {}",
                descriptor.repositories().join("/")
            ));
        }
    }
    None
}

/// Fill in the measures every report expects when no sensor saved them:
/// the project file count, test summary metrics, and the duplication
/// metrics derived from the stored groups.
fn aggregate_measures(
    file_system: &FileSystem,
    storage: &mut InMemorySensorStorage,
) -> Result<()> {
    let project = InputComponent::Project;

    let save_int = |storage: &mut InMemorySensorStorage,
                    component: &InputComponent,
                    key: &'static str,
                    value: i64|
     -> Result<()> {
        if storage.has_measure(component, key) {
            return Ok(());
        }
        storage.store_measure(Measure::new(component.clone(), key, Value::Int(value)))
    };

    save_int(
        storage,
        &project,
        metrics::FILES.key(),
        file_system.len() as i64,
    )?;

    if !storage.test_cases().is_empty() {
        let cases = storage.test_cases().to_vec();
        let count_with = |status: TestStatus| -> i64 {
            cases.iter().filter(|c| c.status() == status).count() as i64
        };
        save_int(storage, &project, metrics::TESTS.key(), cases.len() as i64)?;
        save_int(
            storage,
            &project,
            metrics::TEST_FAILURES.key(),
            count_with(TestStatus::Failure),
        )?;
        save_int(
            storage,
            &project,
            metrics::TEST_ERRORS.key(),
            count_with(TestStatus::Error),
        )?;
        save_int(
            storage,
            &project,
            metrics::SKIPPED_TESTS.key(),
            count_with(TestStatus::Skipped),
        )?;
        let total_ms: u64 = cases.iter().filter_map(|c| c.duration_ms()).sum();
        save_int(
            storage,
            &project,
            metrics::TEST_EXECUTION_TIME.key(),
            total_ms as i64,
        )?;
    }

    let duplications = storage.duplications().clone();
    let mut total_blocks = 0i64;
    let mut total_lines = 0i64;
    let mut duplicated_files = 0i64;
    for (file, groups) in &duplications {
        if groups.is_empty() {
            continue;
        }
        duplicated_files += 1;
        let blocks = groups.len() as i64;
        let lines = duplicated_lines(groups) as i64;
        total_blocks += blocks;
        total_lines += lines;
        let component = InputComponent::File(file.clone());
        save_int(storage, &component, metrics::DUPLICATED_BLOCKS.key(), blocks)?;
        save_int(storage, &component, metrics::DUPLICATED_LINES.key(), lines)?;
    }
    if duplicated_files > 0 {
        save_int(
            storage,
            &project,
            metrics::DUPLICATED_FILES.key(),
            duplicated_files,
        )?;
        save_int(
            storage,
            &project,
            metrics::DUPLICATED_BLOCKS.key(),
            total_blocks,
        )?;
        save_int(
            storage,
            &project,
            metrics::DUPLICATED_LINES.key(),
            total_lines,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileType, InputFile, Language};
    use crate::rule::{ActiveRule, RuleKey};
    use crate::sensor::Sensor;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct CountingSensor;

    impl Sensor for CountingSensor {
        fn describe(&self) -> SensorDescriptor {
            SensorDescriptor::new("counting")
        }

        fn execute(&self, context: &mut SensorContext<'_>) -> Result<()> {
            let files: Vec<_> = context.file_system().iter().cloned().collect();
            for file in &files {
                context
                    .new_measure::<i64>()
                    .on_file(file)
                    .for_metric(&metrics::LINES)
                    .with_value(i64::from(file.line_count()))
                    .save()?;
            }
            Ok(())
        }
    }

    struct FailingSensor;

    impl Sensor for FailingSensor {
        fn describe(&self) -> SensorDescriptor {
            SensorDescriptor::new("failing")
        }

        fn execute(&self, _context: &mut SensorContext<'_>) -> Result<()> {
            Err(Error::validation("deliberate failure"))
        }
    }

    struct PythonOnlySensor;

    impl Sensor for PythonOnlySensor {
        fn describe(&self) -> SensorDescriptor {
            SensorDescriptor::new("python-only").for_languages([Language::Python])
        }

        fn execute(&self, _context: &mut SensorContext<'_>) -> Result<()> {
            Err(Error::validation("must never run"))
        }
    }

    fn rust_fs() -> FileSystem {
        let file = Arc::new(InputFile::new(
            PathBuf::from("src/lib.rs"),
            PathBuf::from("/tmp/src/lib.rs"),
            "fn main() {\n    println!(\"hi\");\n}\n",
            Language::Rust,
            FileType::Main,
        ));
        FileSystem::new("/tmp", vec![file])
    }

    fn no_rules() -> ActiveRules {
        ActiveRules::new()
    }

    #[test]
    fn test_execute_collects_measures_and_outcomes() {
        let executor = SensorExecutor::new(SensorRegistry::new().register(CountingSensor));
        let results = executor
            .execute(&Settings::new(), &rust_fs(), &no_rules())
            .unwrap();

        assert_eq!(results.sensors.len(), 1);
        assert!(!results.has_failures());
        // CountingSensor's per-file measure plus the aggregate file count.
        assert!(results
            .measures
            .iter()
            .any(|m| m.metric_key() == "lines" && !m.component().is_project()));
        assert!(results
            .measures
            .iter()
            .any(|m| m.metric_key() == "files" && m.component().is_project()));
    }

    #[test]
    fn test_language_skip_prevents_execution() {
        let executor = SensorExecutor::new(SensorRegistry::new().register(PythonOnlySensor));
        let results = executor
            .execute(&Settings::new(), &rust_fs(), &no_rules())
            .unwrap();
        assert_eq!(results.sensors.len(), 1);
        assert!(!results.has_failures());
    }

    #[test]
    fn test_failures_are_recorded_without_fail_fast() {
        let executor = SensorExecutor::new(
            SensorRegistry::new()
                .register(FailingSensor)
                .register(CountingSensor),
        );
        let results = executor
            .execute(&Settings::new(), &rust_fs(), &no_rules())
            .unwrap();
        assert!(results.has_failures());
        assert_eq!(results.failed_sensors().len(), 1);
        // The second sensor still ran.
        assert!(results.measures.iter().any(|m| m.metric_key() == "lines"));
    }

    #[test]
    fn test_fail_fast_aborts_the_run() {
        let executor =
            SensorExecutor::new(SensorRegistry::new().register(FailingSensor)).fail_fast(true);
        let result = executor.execute(&Settings::new(), &rust_fs(), &no_rules());
        assert!(matches!(result, Err(Error::Sensor { .. })));
    }

    #[test]
    fn test_repository_skip_requires_active_rules() {
        struct RepoSensor;
        impl Sensor for RepoSensor {
            fn describe(&self) -> SensorDescriptor {
                SensorDescriptor::new("repo").creates_issues_for(["style"])
            }
            fn execute(&self, _context: &mut SensorContext<'_>) -> Result<()> {
                Err(Error::validation("must never run"))
            }
        }

        let executor = SensorExecutor::new(SensorRegistry::new().register(RepoSensor));
        let results = executor
            .execute(&Settings::new(), &rust_fs(), &no_rules())
            .unwrap();
        assert!(!results.has_failures());

        let rules = ActiveRules::builder()
            .activate(ActiveRule::new(RuleKey::new("style", "x")))
            .build();
        let executor = SensorExecutor::new(SensorRegistry::new().register(RepoSensor));
        let results = executor.execute(&Settings::new(), &rust_fs(), &rules).unwrap();
        assert!(results.has_failures());
    }

    #[test]
    fn test_empty_project_runs_cleanly() {
        let fs = FileSystem::new("/tmp", Vec::new());
        let executor = SensorExecutor::new(SensorRegistry::new().register(CountingSensor));
        let results = executor.execute(&Settings::new(), &fs, &no_rules()).unwrap();
        assert_eq!(results.project.files, 0);
        assert!(results
            .measures
            .iter()
            .any(|m| m.metric_key() == "files" && m.value_as::<i64>() == Some(0)));
    }
}
