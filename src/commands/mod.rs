//! CLI command implementations.
//!
//! Each submodule handles one subcommand with its configuration and
//! execution logic:
//! - **analyze**: index a project and run the registered sensors over it
//! - **sensors**: list the registered sensors and their activation rules
//! - **init**: write a starter configuration file

pub mod analyze;
pub mod init;
pub mod sensors;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use init::init_config;
pub use sensors::list_sensors;
