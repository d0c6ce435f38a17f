//! Sensor registration and execution.

pub mod executor;

pub use executor::SensorExecutor;

use crate::sensor::{Sensor, SensorDescriptor};

/// Ordered collection of sensors for one analysis. Sensors run in the order
/// they were registered.
#[derive(Default)]
pub struct SensorRegistry {
    sensors: Vec<Box<dyn Sensor>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: Sensor + 'static>(mut self, sensor: S) -> Self {
        self.sensors.push(Box::new(sensor));
        self
    }

    pub fn register_boxed(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Sensor> {
        self.sensors.iter().map(Box::as_ref)
    }

    pub fn descriptors(&self) -> Vec<SensorDescriptor> {
        self.sensors.iter().map(|s| s.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::sensor::SensorContext;

    struct Noop(&'static str);

    impl Sensor for Noop {
        fn describe(&self) -> SensorDescriptor {
            SensorDescriptor::new(self.0)
        }

        fn execute(&self, _context: &mut SensorContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = SensorRegistry::new()
            .register(Noop("first"))
            .register(Noop("second"));
        let names: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(registry.len(), 2);
    }
}
