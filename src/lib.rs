// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod dependency;
pub mod duplication;
pub mod errors;
pub mod fs;
pub mod highlight;
pub mod issue;
pub mod measure;
pub mod progress;
pub mod report;
pub mod rule;
pub mod runner;
pub mod sensor;
pub mod sensors;
pub mod settings;
pub mod suppression;
pub mod symbol;
pub mod testkit;
pub mod testplan;
pub mod text;

// Re-export commonly used types
pub use crate::errors::{Error, Result};

pub use crate::fs::{
    FileIndexer, FilePredicate, FileSystem, FileType, InputComponent, InputFile, Language,
};

pub use crate::rule::{ActiveRule, ActiveRules, RuleKey, Severity};

pub use crate::sensor::{
    InMemorySensorStorage, Sensor, SensorContext, SensorDescriptor, SensorStorage,
};

pub use crate::measure::{metrics, Measure, Metric, MeasureValue};

pub use crate::issue::Issue;

pub use crate::settings::Settings;

pub use crate::text::{TextPointer, TextRange};

pub use crate::runner::{SensorExecutor, SensorRegistry};

pub use crate::report::{AnalysisResults, SensorOutcome, SensorStatus};

pub use crate::report::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::duplication::{DuplicationConfig, DuplicationEngine, DuplicationGroup};

pub use crate::testkit::{SensorContextTester, TestInputFile};
