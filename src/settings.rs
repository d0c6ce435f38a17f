//! Analysis properties exposed to sensors.
//!
//! A `Settings` value is an immutable snapshot of string properties for one
//! analysis run, with typed getters on top. Snapshots are backed by a
//! persistent map, so cloning one for a context or the testkit is cheap.

use crate::errors::{Error, Result};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Settings {
    properties: im::HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let mut settings = Self::new();
        for (key, value) in properties {
            settings.set(key.clone(), value.clone());
        }
        settings
    }

    /// Overlay `SENSORKIT_`-prefixed environment variables on top of the
    /// file-provided properties. `SENSORKIT_COVERAGE__LCOV_PATH` becomes
    /// `sensorkit.coverage.lcov_path`: the prefix is replaced by `sensorkit.`
    /// and each double underscore becomes a dot.
    pub fn with_env_overrides(mut self) -> Self {
        for (name, value) in std::env::vars() {
            if let Some(rest) = name.strip_prefix("SENSORKIT_") {
                if rest.is_empty() || rest == "QUIET" {
                    continue;
                }
                let key = format!("sensorkit.{}", rest.to_lowercase().replace("__", "."));
                self.set(key, value);
            }
        }
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.parse_with(key, |raw| match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.parse_with(key, |raw| raw.parse().ok())
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.parse_with(key, |raw| raw.parse().ok())
    }

    /// Comma-separated list, entries trimmed, empties dropped
    pub fn get_string_array(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn parse_with<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse(raw.trim()).map(Some).ok_or_else(|| {
                Error::Configuration(format!(
                    "property {key} has malformed value {raw:?}"
                ))
            }),
        }
    }
}
