//! Issues raised by sensors against files or the project.
//!
//! An issue only reaches storage when its rule is active in the current
//! profile and no suppression marker covers its line. Both drops are silent
//! apart from a debug log, and [`NewIssue::save`] reports them by returning
//! `Ok(false)`.

use crate::errors::{Error, Result};
use crate::fs::{InputComponent, InputFile};
use crate::rule::{ActiveRules, RuleKey, Severity};
use crate::sensor::storage::SensorStorage;
use crate::suppression;
use crate::text::TextRange;
use serde::Serialize;

/// A saved issue. Severity is already resolved: the builder override if one
/// was given, otherwise the active rule's severity.
#[derive(Clone, Debug, Serialize)]
pub struct Issue {
    rule: RuleKey,
    component: InputComponent,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<TextRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effort: Option<f64>,
}

impl Issue {
    pub fn rule(&self) -> &RuleKey {
        &self.rule
    }

    pub fn component(&self) -> &InputComponent {
        &self.component
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn range(&self) -> Option<&TextRange> {
        self.range.as_ref()
    }

    pub fn effort(&self) -> Option<f64> {
        self.effort
    }
}

/// Builder for one issue, obtained from the sensor context.
pub struct NewIssue<'a> {
    storage: &'a mut dyn SensorStorage,
    active_rules: &'a ActiveRules,
    file: Option<&'a InputFile>,
    on_project: bool,
    rule: Option<RuleKey>,
    line: Option<u32>,
    range: Option<TextRange>,
    message: Option<String>,
    severity: Option<Severity>,
    effort: Option<f64>,
}

impl<'a> NewIssue<'a> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage, active_rules: &'a ActiveRules) -> Self {
        Self {
            storage,
            active_rules,
            file: None,
            on_project: false,
            rule: None,
            line: None,
            range: None,
            message: None,
            severity: None,
            effort: None,
        }
    }

    pub fn for_rule(mut self, rule: RuleKey) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn on_file(mut self, file: &'a InputFile) -> Self {
        self.file = Some(file);
        self.on_project = false;
        self
    }

    pub fn on_project(mut self) -> Self {
        self.on_project = true;
        self.file = None;
        self
    }

    /// Anchor the issue to a whole line, 1-based.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Anchor the issue to an exact range. Overrides [`Self::at_line`].
    pub fn at_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the severity of the active rule for this one issue.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Remediation effort in minutes.
    pub fn effort(mut self, minutes: f64) -> Self {
        self.effort = Some(minutes);
        self
    }

    /// Validate and store the issue. Returns `Ok(false)` when the issue was
    /// dropped, either because its rule is not active or because the target
    /// line carries a suppression marker.
    pub fn save(self) -> Result<bool> {
        let rule = self
            .rule
            .ok_or_else(|| Error::validation("issue is missing a rule key"))?;
        let message = match self.message {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(Error::validation(format!("issue for {rule} has no message"))),
        };

        let (component, line, range) = match self.file {
            Some(file) => {
                let range = match self.range {
                    Some(range) => {
                        file.validate_range(&range)?;
                        Some(range)
                    }
                    None => None,
                };
                let line = match range {
                    Some(ref r) => Some(r.start.line),
                    None => match self.line {
                        Some(line) => {
                            file.validate_line(line)?;
                            Some(line)
                        }
                        None => None,
                    },
                };
                (InputComponent::file(file), line, range)
            }
            None if self.on_project => {
                if self.line.is_some() || self.range.is_some() {
                    return Err(Error::validation(format!(
                        "issue for {rule} targets the project but has a line anchor"
                    )));
                }
                (InputComponent::Project, None, None)
            }
            None => {
                return Err(Error::validation(format!(
                    "issue for {rule} has no component"
                )))
            }
        };

        let active = match self.active_rules.find(&rule) {
            Some(active) => active,
            None => {
                log::debug!("dropping issue for inactive rule {rule} on {component}");
                return Ok(false);
            }
        };

        if let (Some(file), Some(line)) = (self.file, line) {
            if suppression::is_line_suppressed(file, line) {
                log::debug!("issue for {rule} suppressed at {component}:{line}");
                self.storage.note_suppressed_issue(&rule, &component, line);
                return Ok(false);
            }
        }

        let severity = self.severity.unwrap_or_else(|| active.severity());
        self.storage.store_issue(Issue {
            rule,
            component,
            severity,
            message,
            line,
            range,
            effort: self.effort,
        })?;
        Ok(true)
    }
}
