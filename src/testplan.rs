//! Test cases reported by sensors, and the main-code lines each one covers.
//!
//! Saving a test case yields a [`TestCaseRef`], and per-test coverage can
//! only be attached through such a handle. That makes "coverage for a test
//! nobody registered" unrepresentable in the normal flow; storage still
//! checks, since handles can outlive a run.

use crate::errors::{Error, Result};
use crate::fs::{FileType, InputFile};
use crate::sensor::storage::SensorStorage;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Ok,
    Failure,
    Error,
    Skipped,
}

impl TestStatus {
    pub fn is_ok(self) -> bool {
        self == TestStatus::Ok
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestStatus::Ok => "ok",
            TestStatus::Failure => "failure",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    #[default]
    Unit,
    Integration,
}

/// A saved test case, keyed by test file and name.
#[derive(Clone, Debug, Serialize)]
pub struct TestCase {
    file: PathBuf,
    name: String,
    test_type: TestType,
    status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl TestCase {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test_type(&self) -> TestType {
        self.test_type
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Handle proving a test case was saved. Required for per-test coverage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TestCaseRef {
    file: PathBuf,
    name: String,
}

impl TestCaseRef {
    pub(crate) fn new(file: PathBuf, name: String) -> Self {
        Self { file, name }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TestCaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file.display(), self.name)
    }
}

/// Main-code lines one test case exercises.
#[derive(Clone, Debug, Serialize)]
pub struct TestCoverage {
    pub test: TestCaseRef,
    pub covered_file: PathBuf,
    pub lines: Vec<u32>,
}

/// Builder for one test case, obtained from the sensor context.
pub struct NewTestCase<'a> {
    storage: &'a mut dyn SensorStorage,
    file: Option<&'a InputFile>,
    name: Option<String>,
    test_type: TestType,
    status: TestStatus,
    duration_ms: Option<u64>,
    message: Option<String>,
}

impl<'a> NewTestCase<'a> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage) -> Self {
        Self {
            storage,
            file: None,
            name: None,
            test_type: TestType::default(),
            status: TestStatus::default(),
            duration_ms: None,
            message: None,
        }
    }

    /// The test file declaring this case. Must be a test file.
    pub fn in_file(mut self, file: &'a InputFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn of_type(mut self, test_type: TestType) -> Self {
        self.test_type = test_type;
        self
    }

    pub fn with_status(mut self, status: TestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn taking_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Failure or error detail. Ignored for passing tests by convention.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn save(self) -> Result<TestCaseRef> {
        let file = self
            .file
            .ok_or_else(|| Error::validation("test case is missing its file"))?;
        if file.file_type() != FileType::Test {
            return Err(Error::validation(format!(
                "{} is main code, test cases belong to test files",
                file.relative_path().display()
            )));
        }
        let name = match self.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => {
                return Err(Error::validation(format!(
                    "test case in {} has no name",
                    file.relative_path().display()
                )))
            }
        };
        self.storage.store_test_case(TestCase {
            file: file.relative_path().to_path_buf(),
            name,
            test_type: self.test_type,
            status: self.status,
            duration_ms: self.duration_ms,
            message: self.message,
        })
    }
}
