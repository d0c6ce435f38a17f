//! Rule keys and the active-rule profile for one analysis.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifies a rule as `repository:rule`, e.g. `style:todo-marker`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    repository: String,
    rule: String,
}

impl RuleKey {
    pub fn new(repository: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            rule: rule.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.rule)
    }
}

impl FromStr for RuleKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((repository, rule)) if !repository.is_empty() && !rule.is_empty() => {
                Ok(Self::new(repository, rule))
            }
            _ => Err(Error::validation(format!(
                "rule key {s:?} is not of the form repository:rule"
            ))),
        }
    }
}

// Keys travel as `repository:rule` strings in reports and configuration.
impl Serialize for RuleKey {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuleKey {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Minor,
    #[default]
    Major,
    Critical,
    Blocker,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
            Severity::Blocker => "blocker",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "minor" => Ok(Severity::Minor),
            "major" => Ok(Severity::Major),
            "critical" => Ok(Severity::Critical),
            "blocker" => Ok(Severity::Blocker),
            _ => Err(Error::validation(format!("unknown severity {s:?}"))),
        }
    }
}

/// One rule enabled in the current profile, with its effective severity and
/// any parameter overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveRule {
    key: RuleKey,
    severity: Severity,
    #[serde(default)]
    params: HashMap<String, String>,
}

impl ActiveRule {
    pub fn new(key: RuleKey) -> Self {
        Self {
            key,
            severity: Severity::default(),
            params: HashMap::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> &RuleKey {
        &self.key
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// The set of rules active for this analysis. Issues raised against rules
/// outside this set are dropped at save time.
#[derive(Clone, Debug, Default)]
pub struct ActiveRules {
    rules: HashMap<RuleKey, Arc<ActiveRule>>,
}

impl ActiveRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ActiveRulesBuilder {
        ActiveRulesBuilder::default()
    }

    pub fn find(&self, key: &RuleKey) -> Option<&ActiveRule> {
        self.rules.get(key).map(Arc::as_ref)
    }

    pub fn is_active(&self, key: &RuleKey) -> bool {
        self.rules.contains_key(key)
    }

    pub fn find_by_repository<'a>(
        &'a self,
        repository: &'a str,
    ) -> impl Iterator<Item = &'a ActiveRule> {
        self.rules
            .values()
            .filter(move |rule| rule.key().repository() == repository)
            .map(Arc::as_ref)
    }

    /// Repositories with at least one active rule, sorted for stable output.
    pub fn repositories(&self) -> BTreeSet<&str> {
        self.rules.keys().map(RuleKey::repository).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveRule> {
        self.rules.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Default)]
pub struct ActiveRulesBuilder {
    rules: HashMap<RuleKey, Arc<ActiveRule>>,
}

impl ActiveRulesBuilder {
    /// Last activation of a key wins, matching profile override semantics.
    pub fn activate(mut self, rule: ActiveRule) -> Self {
        self.rules.insert(rule.key().clone(), Arc::new(rule));
        self
    }

    pub fn activate_key(self, key: RuleKey) -> Self {
        self.activate(ActiveRule::new(key))
    }

    pub fn build(self) -> ActiveRules {
        ActiveRules { rules: self.rules }
    }
}
