//! The outcome of one analysis run and the writers that render it.

pub mod output;

pub use output::{OutputFormat, OutputWriter};

use crate::dependency::{Dependency, DependencyCycle};
use crate::duplication::DuplicationGroup;
use crate::highlight::FileHighlighting;
use crate::issue::Issue;
use crate::measure::Measure;
use crate::rule::Severity;
use crate::symbol::SymbolTable;
use crate::testplan::{TestCase, TestCoverage, TestStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How one sensor fared during the run.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SensorStatus {
    Executed,
    Skipped { reason: String },
    Failed { message: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct SensorOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: SensorStatus,
    pub duration_ms: u64,
}

impl SensorOutcome {
    pub fn executed(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: SensorStatus::Executed,
            duration_ms,
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SensorStatus::Skipped {
                reason: reason.into(),
            },
            duration_ms: 0,
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: SensorStatus::Failed {
                message: message.into(),
            },
            duration_ms,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SensorStatus::Failed { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectSummary {
    pub base_dir: PathBuf,
    pub files: usize,
    pub languages: Vec<String>,
}

/// Everything one analysis run produced.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResults {
    pub project: ProjectSummary,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub sensors: Vec<SensorOutcome>,
    pub measures: Vec<Measure>,
    pub issues: Vec<Issue>,
    pub suppressed_issues: usize,
    pub highlighting: Vec<FileHighlighting>,
    pub symbol_tables: Vec<SymbolTable>,
    pub duplications: BTreeMap<PathBuf, Vec<DuplicationGroup>>,
    pub test_cases: Vec<TestCase>,
    pub test_coverage: Vec<TestCoverage>,
    pub dependencies: Vec<Dependency>,
    pub dependency_cycles: Vec<DependencyCycle>,
}

impl AnalysisResults {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Issue counts per severity, most severe first.
    pub fn issues_by_severity(&self) -> Vec<(Severity, usize)> {
        let mut counts: BTreeMap<Severity, usize> = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity()).or_insert(0) += 1;
        }
        counts.into_iter().rev().collect()
    }

    pub fn failed_sensors(&self) -> Vec<&SensorOutcome> {
        self.sensors.iter().filter(|s| s.is_failed()).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.sensors.iter().any(SensorOutcome::is_failed)
    }

    pub fn test_count(&self) -> usize {
        self.test_cases.len()
    }

    pub fn failing_test_count(&self) -> usize {
        self.test_cases
            .iter()
            .filter(|t| matches!(t.status(), TestStatus::Failure | TestStatus::Error))
            .count()
    }

    /// Files with at least one duplication group.
    pub fn duplicated_file_count(&self) -> usize {
        self.duplications
            .values()
            .filter(|groups| !groups.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InputComponent;
    use crate::measure::{metrics, Value};

    fn empty_results() -> AnalysisResults {
        AnalysisResults {
            project: ProjectSummary {
                base_dir: PathBuf::from("/tmp/demo"),
                files: 0,
                languages: Vec::new(),
            },
            timestamp: Utc::now(),
            duration_ms: 1,
            sensors: Vec::new(),
            measures: Vec::new(),
            issues: Vec::new(),
            suppressed_issues: 0,
            highlighting: Vec::new(),
            symbol_tables: Vec::new(),
            duplications: BTreeMap::new(),
            test_cases: Vec::new(),
            test_coverage: Vec::new(),
            dependencies: Vec::new(),
            dependency_cycles: Vec::new(),
        }
    }

    #[test]
    fn test_empty_run_has_no_failures() {
        let results = empty_results();
        assert!(!results.has_failures());
        assert_eq!(results.issue_count(), 0);
        assert_eq!(results.duplicated_file_count(), 0);
    }

    #[test]
    fn test_failed_sensor_detection() {
        let mut results = empty_results();
        results
            .sensors
            .push(SensorOutcome::executed("lines", 3));
        results
            .sensors
            .push(SensorOutcome::failed("broken", "boom", 1));
        assert!(results.has_failures());
        assert_eq!(results.failed_sensors().len(), 1);
        assert_eq!(results.failed_sensors()[0].name, "broken");
    }

    #[test]
    fn test_results_serialize_to_json() {
        let mut results = empty_results();
        results.measures.push(Measure::new(
            InputComponent::Project,
            metrics::FILES.key(),
            Value::Int(0),
        ));
        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains("\"files\":0"));
        assert!(json.contains("\"measures\""));
    }
}
