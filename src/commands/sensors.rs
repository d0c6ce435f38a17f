use crate::runner::SensorRegistry;
use crate::sensor::SensorDescriptor;
use crate::sensors;

/// Print the registered sensors in execution order.
pub fn list_sensors() {
    let registry = sensors::register_builtin_sensors(SensorRegistry::new());
    for descriptor in registry.descriptors() {
        println!("{}", describe_line(&descriptor));
    }
}

fn describe_line(descriptor: &SensorDescriptor) -> String {
    let languages = if descriptor.languages().is_empty() {
        "any language".to_string()
    } else {
        descriptor
            .languages()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut line = format!("{:<16} {languages}", descriptor.name());
    if !descriptor.repositories().is_empty() {
        line.push_str(&format!(
            ", needs active rules of: {}",
            descriptor.repositories().join(", ")
        ));
    }
    line
}
