//! Marker-comment sensor: raises issues for TODO-style markers.

use crate::errors::Result;
use crate::fs::{FilePredicate, InputFile};
use crate::rule::RuleKey;
use crate::sensor::{Sensor, SensorContext, SensorDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::RULE_REPOSITORY;

static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(TODO|FIXME|HACK|XXX|BUG):\s*(.*)").unwrap());

pub struct TodoSensor;

impl Sensor for TodoSensor {
    fn describe(&self) -> SensorDescriptor {
        SensorDescriptor::new("todos").creates_issues_for([RULE_REPOSITORY])
    }

    fn execute(&self, context: &mut SensorContext<'_>) -> Result<()> {
        let files: Vec<Arc<InputFile>> = context
            .file_system()
            .files(&FilePredicate::main_files())
            .cloned()
            .collect();

        for file in &files {
            for found in find_markers(file.contents()) {
                context
                    .new_issue()
                    .on_file(file)
                    .for_rule(found.rule())
                    .at_line(found.line)
                    .message(found.message())
                    .save()?;
            }
        }
        Ok(())
    }
}

/// One marker comment found in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerComment {
    pub line: u32,
    pub marker: String,
    pub text: String,
}

impl MarkerComment {
    fn rule(&self) -> RuleKey {
        let rule = match self.marker.as_str() {
            "TODO" => "todo-comment",
            _ => "fixme-comment",
        };
        RuleKey::new(RULE_REPOSITORY, rule)
    }

    fn message(&self) -> String {
        if self.text.is_empty() {
            format!("Take care of this {} comment", self.marker)
        } else {
            format!("{}: {}", self.marker, self.text)
        }
    }
}

/// Scan contents for marker comments, one entry per matching line.
pub fn find_markers(contents: &str) -> Vec<MarkerComment> {
    let mut found = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if let Some(captures) = MARKER_PATTERN.captures(line) {
            let marker = captures[1].to_uppercase();
            let text = captures[2].trim().to_string();
            found.push(MarkerComment {
                line: index as u32 + 1,
                marker,
                text,
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, FileType, Language};
    use crate::sensor::{InMemorySensorStorage, SensorContext};
    use crate::settings::Settings;

    #[test]
    fn test_find_markers() {
        let found = find_markers("fn f() {}\n// TODO: retry on timeout\n// fixme: off by one\n");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].marker, "TODO");
        assert_eq!(found[0].text, "retry on timeout");
        assert_eq!(found[1].marker, "FIXME");
    }

    #[test]
    fn test_marker_without_colon_ignored() {
        assert!(find_markers("// TODO do it later\n").is_empty());
        assert!(find_markers("let total = 1; // not a marker\n").is_empty());
    }

    #[test]
    fn test_empty_text_gets_fallback_message() {
        let found = find_markers("// HACK:\n");
        assert_eq!(found[0].message(), "Take care of this HACK comment");
        assert_eq!(found[0].rule(), RuleKey::new("sensorkit", "fixme-comment"));
    }

    #[test]
    fn test_execute_raises_issues_for_active_rules() {
        let file = Arc::new(InputFile::new(
            "src/lib.rs",
            "/proj/src/lib.rs",
            "// TODO: tighten bounds\n// XXX: racy\n",
            Language::Rust,
            FileType::Main,
        ));
        let fs = FileSystem::new("/proj", vec![file]);
        let settings = Settings::new();
        let rules = super::super::default_active_rules();
        let mut storage = InMemorySensorStorage::new();

        let mut context = SensorContext::new(&settings, &fs, &rules, &mut storage);
        TodoSensor.execute(&mut context).unwrap();

        assert_eq!(storage.issues().len(), 2);
        assert_eq!(
            storage.issues()[0].rule(),
            &RuleKey::new("sensorkit", "todo-comment")
        );
        assert_eq!(storage.issues()[0].line(), Some(1));
        assert_eq!(storage.issues()[1].line(), Some(2));
    }

    #[test]
    fn test_execute_drops_issues_when_rule_inactive() {
        let file = Arc::new(InputFile::new(
            "src/lib.rs",
            "/proj/src/lib.rs",
            "// TODO: later\n",
            Language::Rust,
            FileType::Main,
        ));
        let fs = FileSystem::new("/proj", vec![file]);
        let settings = Settings::new();
        let rules = crate::rule::ActiveRules::new();
        let mut storage = InMemorySensorStorage::new();

        let mut context = SensorContext::new(&settings, &fs, &rules, &mut storage);
        TodoSensor.execute(&mut context).unwrap();
        assert!(storage.issues().is_empty());
    }
}
