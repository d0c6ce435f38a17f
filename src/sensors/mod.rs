//! Built-in sensors.
//!
//! These are working sensors, not demos: `sensorkit analyze` runs them by
//! default, and between them they exercise measures, issues, token streams
//! and coverage against real project files.

pub mod cpd;
pub mod lcov_coverage;
pub mod line_metrics;
pub mod todos;

pub use cpd::CpdSensor;
pub use lcov_coverage::{LcovCoverageSensor, LCOV_PATH_KEY};
pub use line_metrics::LineMetricsSensor;
pub use todos::TodoSensor;

use crate::rule::{ActiveRule, ActiveRules, RuleKey, Severity};
use crate::runner::SensorRegistry;

/// Repository the built-in issue rules live under.
pub const RULE_REPOSITORY: &str = "sensorkit";

/// Add every built-in sensor to a registry, in the order they should run.
pub fn register_builtin_sensors(registry: SensorRegistry) -> SensorRegistry {
    registry
        .register(LineMetricsSensor)
        .register(TodoSensor)
        .register(CpdSensor)
        .register(LcovCoverageSensor)
}

/// The rule profile used when the project config activates nothing.
pub fn default_active_rules() -> ActiveRules {
    ActiveRules::builder()
        .activate(
            ActiveRule::new(RuleKey::new(RULE_REPOSITORY, "todo-comment"))
                .with_severity(Severity::Info),
        )
        .activate(
            ActiveRule::new(RuleKey::new(RULE_REPOSITORY, "fixme-comment"))
                .with_severity(Severity::Minor),
        )
        .build()
}
