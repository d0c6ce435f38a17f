//! Typed measures reported against files or the whole project.
//!
//! A [`Metric`] carries its value type as a parameter, so a sensor writing
//! `new_measure().for_metric(&metrics::LINES)` can only pass an integer
//! value. The open set of value kinds is closed behind [`MeasureValue`],
//! which only the four supported primitives implement.

use crate::errors::{Error, Result};
use crate::fs::{InputComponent, InputFile};
use crate::sensor::storage::SensorStorage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    Bool,
    String,
}

/// A measure payload, together with which primitive it holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for String {}
}

/// Primitive types a measure can carry. Sealed: exactly `i64`, `f64`,
/// `bool` and `String`.
pub trait MeasureValue: sealed::Sealed + Clone {
    const TYPE: ValueType;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

impl MeasureValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl MeasureValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl MeasureValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl MeasureValue for String {
    const TYPE: ValueType = ValueType::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// A metric definition. Declared as consts, one per measurable quantity.
pub struct Metric<T: MeasureValue> {
    key: &'static str,
    name: &'static str,
    _value: PhantomData<T>,
}

impl<T: MeasureValue> Metric<T> {
    pub const fn new(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value_type(&self) -> ValueType {
        T::TYPE
    }
}

impl<T: MeasureValue> fmt::Debug for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("key", &self.key)
            .field("type", &T::TYPE)
            .finish()
    }
}

/// Metrics every analysis understands. Sensors may define their own consts
/// alongside these.
pub mod metrics {
    use super::Metric;

    pub const LINES: Metric<i64> = Metric::new("lines", "Lines");
    pub const NCLOC: Metric<i64> = Metric::new("ncloc", "Lines of Code");
    pub const COMMENT_LINES: Metric<i64> = Metric::new("comment_lines", "Comment Lines");
    pub const BLANK_LINES: Metric<i64> = Metric::new("blank_lines", "Blank Lines");
    pub const FILES: Metric<i64> = Metric::new("files", "Files");
    pub const COMPLEXITY: Metric<i64> = Metric::new("complexity", "Complexity");
    pub const COVERAGE: Metric<f64> = Metric::new("coverage", "Coverage");
    pub const LINES_TO_COVER: Metric<i64> = Metric::new("lines_to_cover", "Lines to Cover");
    pub const UNCOVERED_LINES: Metric<i64> = Metric::new("uncovered_lines", "Uncovered Lines");
    pub const DUPLICATED_BLOCKS: Metric<i64> =
        Metric::new("duplicated_blocks", "Duplicated Blocks");
    pub const DUPLICATED_LINES: Metric<i64> = Metric::new("duplicated_lines", "Duplicated Lines");
    pub const DUPLICATED_FILES: Metric<i64> = Metric::new("duplicated_files", "Duplicated Files");
    pub const TESTS: Metric<i64> = Metric::new("tests", "Unit Tests");
    pub const SKIPPED_TESTS: Metric<i64> = Metric::new("skipped_tests", "Skipped Unit Tests");
    pub const TEST_FAILURES: Metric<i64> = Metric::new("test_failures", "Unit Test Failures");
    pub const TEST_ERRORS: Metric<i64> = Metric::new("test_errors", "Unit Test Errors");
    pub const TEST_EXECUTION_TIME: Metric<i64> =
        Metric::new("test_execution_time", "Unit Test Duration");
}

/// A saved measure: one metric value on one component.
#[derive(Clone, Debug, Serialize)]
pub struct Measure {
    component: InputComponent,
    metric_key: &'static str,
    value: Value,
}

impl Measure {
    pub(crate) fn new(component: InputComponent, metric_key: &'static str, value: Value) -> Self {
        Self {
            component,
            metric_key,
            value,
        }
    }

    pub fn component(&self) -> &InputComponent {
        &self.component
    }

    pub fn metric_key(&self) -> &'static str {
        self.metric_key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Typed read-back, `None` when `T` does not match the stored kind.
    pub fn value_as<T: MeasureValue>(&self) -> Option<T> {
        T::from_value(&self.value)
    }
}

/// Builder for one measure. Obtained from the sensor context, consumed by
/// [`NewMeasure::save`].
pub struct NewMeasure<'a, T: MeasureValue> {
    storage: &'a mut dyn SensorStorage,
    component: Option<InputComponent>,
    metric_key: Option<&'static str>,
    value: Option<T>,
}

impl<'a, T: MeasureValue> NewMeasure<'a, T> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage) -> Self {
        Self {
            storage,
            component: None,
            metric_key: None,
            value: None,
        }
    }

    pub fn on_file(mut self, file: &InputFile) -> Self {
        self.component = Some(InputComponent::file(file));
        self
    }

    pub fn on_project(mut self) -> Self {
        self.component = Some(InputComponent::Project);
        self
    }

    pub fn for_metric(mut self, metric: &Metric<T>) -> Self {
        self.metric_key = Some(metric.key());
        self
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn save(self) -> Result<()> {
        let component = self
            .component
            .ok_or_else(|| Error::validation("measure is missing a component"))?;
        let metric_key = self
            .metric_key
            .ok_or_else(|| Error::validation("measure is missing a metric"))?;
        let value = self
            .value
            .ok_or_else(|| Error::validation(format!("measure {metric_key} has no value")))?;
        self.storage.store_measure(Measure {
            component,
            metric_key,
            value: value.into_value(),
        })
    }
}
