//! Project configuration loaded from `.sensorkit.toml`.
//!
//! The file is optional. Every section is optional too, so a missing or
//! partial file degrades to defaults instead of failing the run.

pub mod loader;

pub use loader::{load_config, load_config_file, parse_config};

use crate::duplication::DuplicationConfig;
use crate::rule::{ActiveRule, ActiveRules, RuleKey, Severity};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONFIG_FILE_NAME: &str = ".sensorkit.toml";

/// Root configuration structure for sensorkit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// File indexing options
    #[serde(default)]
    pub analysis: Option<IndexingConfig>,

    /// Duplication detection thresholds
    #[serde(default)]
    pub duplication: Option<DuplicationThresholds>,

    /// Free-form properties exposed to sensors through `Settings`
    #[serde(default)]
    pub properties: Option<BTreeMap<String, String>>,

    /// Rule activations for this project
    #[serde(default)]
    pub rules: Vec<RuleActivation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexingConfig {
    /// Glob patterns marking files as test code, e.g. `tests/**`
    #[serde(default)]
    pub test_patterns: Vec<String>,

    /// Glob patterns excluded from indexing entirely
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Index hidden files and directories (default: skip them)
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DuplicationThresholds {
    pub min_tokens: Option<u32>,
    pub min_lines: Option<u32>,
}

impl DuplicationThresholds {
    /// Reject thresholds the duplication engine cannot work with.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(min_tokens) = self.min_tokens {
            if min_tokens < 2 {
                return Err(format!("min_tokens must be at least 2, got {min_tokens}"));
            }
        }
        if let Some(min_lines) = self.min_lines {
            if min_lines < 1 {
                return Err(format!("min_lines must be at least 1, got {min_lines}"));
            }
        }
        Ok(())
    }
}

/// One `[[rules]]` table: the rule to activate, with optional severity
/// override and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleActivation {
    pub key: String,

    #[serde(default)]
    pub severity: Option<Severity>,

    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl AnalysisConfig {
    /// Indexing options, defaulted when the `[analysis]` section is absent.
    pub fn indexing(&self) -> IndexingConfig {
        self.analysis.clone().unwrap_or_default()
    }

    /// Build the settings handed to sensors: the `[properties]` table plus
    /// `[duplication]` thresholds mapped onto their property keys.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::new();
        if let Some(properties) = &self.properties {
            for (key, value) in properties {
                settings.set(key.clone(), value.clone());
            }
        }
        if let Some(duplication) = &self.duplication {
            if let Some(min_tokens) = duplication.min_tokens {
                settings.set(DuplicationConfig::MIN_TOKENS_KEY, min_tokens.to_string());
            }
            if let Some(min_lines) = duplication.min_lines {
                settings.set(DuplicationConfig::MIN_LINES_KEY, min_lines.to_string());
            }
        }
        settings
    }

    /// Build the active-rule profile from the `[[rules]]` tables.
    ///
    /// Entries with malformed keys are warned about and skipped so one typo
    /// does not take down the whole profile.
    pub fn active_rules(&self) -> ActiveRules {
        let mut builder = ActiveRules::builder();
        for activation in &self.rules {
            let key: RuleKey = match activation.key.parse() {
                Ok(key) => key,
                Err(e) => {
                    log::warn!("Skipping rule activation: {e}");
                    continue;
                }
            };
            let mut rule = ActiveRule::new(key);
            if let Some(severity) = activation.severity {
                rule = rule.with_severity(severity);
            }
            for (name, value) in &activation.params {
                rule = rule.with_param(name.clone(), value.clone());
            }
            builder = builder.activate(rule);
        }
        builder.build()
    }
}

/// Commented starter config written by `sensorkit init`.
pub fn default_config_toml() -> &'static str {
    r#"# Sensorkit Configuration

[analysis]
# Files matching these globs are indexed as test code
test_patterns = ["tests/**", "**/*_test.*", "**/test_*.py"]
# Files matching these globs are not indexed at all
exclude_patterns = ["target/**", "node_modules/**", "vendor/**"]
# include_hidden = false

[duplication]
# Smallest token window reported as duplicated
min_tokens = 50
# Both sides of a duplication must span at least this many lines
min_lines = 5

[properties]
# Free-form settings readable by sensors, e.g.:
# "sensorkit.coverage.lcov_path" = "coverage/lcov.info"

# Activate rules for issue-raising sensors:
[[rules]]
key = "sensorkit:todo-comment"
severity = "info"

[[rules]]
key = "sensorkit:fixme-comment"
severity = "minor"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            [analysis]
            test_patterns = ["tests/**"]
            exclude_patterns = ["target/**"]
            include_hidden = true

            [duplication]
            min_tokens = 30
            min_lines = 3

            [properties]
            "sensorkit.coverage.lcov_path" = "lcov.info"

            [[rules]]
            key = "sensorkit:todo-comment"
            severity = "minor"

            [rules.params]
            markers = "TODO"
            "#,
        )
        .unwrap();

        let indexing = config.indexing();
        assert_eq!(indexing.test_patterns, vec!["tests/**"]);
        assert!(indexing.include_hidden);

        let settings = config.settings();
        assert_eq!(
            settings.get("sensorkit.coverage.lcov_path"),
            Some("lcov.info")
        );
        assert_eq!(settings.get_int(DuplicationConfig::MIN_TOKENS_KEY).unwrap(), Some(30));

        let rules = config.active_rules();
        let key = RuleKey::new("sensorkit", "todo-comment");
        let rule = rules.find(&key).unwrap();
        assert_eq!(rule.severity(), Severity::Minor);
        assert_eq!(rule.param("markers"), Some("TODO"));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: AnalysisConfig = toml::from_str("").unwrap();
        assert!(config.indexing().test_patterns.is_empty());
        assert!(config.active_rules().is_empty());
        assert!(config.settings().is_empty());
    }

    #[test]
    fn test_malformed_rule_key_skipped() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            [[rules]]
            key = "no-colon-here"

            [[rules]]
            key = "sensorkit:fixme-comment"
            "#,
        )
        .unwrap();
        let rules = config.active_rules();
        assert_eq!(rules.len(), 1);
        assert!(rules.is_active(&RuleKey::new("sensorkit", "fixme-comment")));
    }

    #[test]
    fn test_threshold_validation() {
        let bad = DuplicationThresholds {
            min_tokens: Some(1),
            min_lines: None,
        };
        assert!(bad.validate().is_err());

        let good = DuplicationThresholds {
            min_tokens: Some(2),
            min_lines: Some(1),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_default_config_round_trips() {
        let config: AnalysisConfig = toml::from_str(default_config_toml()).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert!(config.duplication.unwrap().validate().is_ok());
    }
}
