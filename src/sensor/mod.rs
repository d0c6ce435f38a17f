//! The sensor contract.
//!
//! A sensor is one analysis pass over the project. It announces what it
//! needs through its [`SensorDescriptor`] so the runner can skip it when the
//! project has no matching files or no matching active rules, and does all
//! of its reporting through the [`SensorContext`] it is handed.

pub mod context;
pub mod storage;

pub use context::SensorContext;
pub use storage::{InMemorySensorStorage, SensorStorage};

use crate::errors::Result;
use crate::fs::Language;

/// What a sensor is called and when it should run.
#[derive(Clone, Debug)]
pub struct SensorDescriptor {
    name: String,
    languages: Vec<Language>,
    repositories: Vec<String>,
}

impl SensorDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            languages: Vec::new(),
            repositories: Vec::new(),
        }
    }

    /// Only run when the project contains files of one of these languages.
    /// No restriction by default.
    pub fn for_languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages.extend(languages);
        self
    }

    /// Only run when at least one rule of one of these repositories is
    /// active. No restriction by default.
    pub fn creates_issues_for(
        mut self,
        repositories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.repositories
            .extend(repositories.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }
}

/// One analysis pass. Implementations are registered with the runner and
/// executed in registration order.
pub trait Sensor: Send + Sync {
    fn describe(&self) -> SensorDescriptor;

    fn execute(&self, context: &mut SensorContext<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults_are_unrestricted() {
        let descriptor = SensorDescriptor::new("lines");
        assert_eq!(descriptor.name(), "lines");
        assert!(descriptor.languages().is_empty());
        assert!(descriptor.repositories().is_empty());
    }

    #[test]
    fn test_descriptor_restrictions_accumulate() {
        let descriptor = SensorDescriptor::new("todo")
            .for_languages([Language::Rust, Language::Python])
            .creates_issues_for(["style"]);
        assert_eq!(descriptor.languages().len(), 2);
        assert_eq!(descriptor.repositories(), ["style"]);
    }
}
