//! Testing harness for sensor authors.
//!
//! Writing a sensor means writing tests against a context, and setting up a
//! real project on disk for every test is slow and brittle. This module
//! provides in-memory stand-ins:
//!
//! - **[`TestInputFile`]**: build an [`InputFile`](crate::fs::InputFile)
//!   from a string, no filesystem involved
//! - **[`SensorContextTester`]**: canned settings, files and active rules
//!   around a real storage; hand its [`context()`](SensorContextTester::context)
//!   to the sensor under test, then inspect what was saved
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sensorkit::testkit::{SensorContextTester, TestInputFile};
//!
//! #[test]
//! fn test_my_sensor_counts_lines() {
//!     let mut tester = SensorContextTester::new("/proj")
//!         .with_file(TestInputFile::new("src/lib.rs", "fn f() {}\n").build());
//!
//!     MySensor.execute(&mut tester.context()).unwrap();
//!
//!     let file = tester.component("src/lib.rs");
//!     assert!(tester.measure(&file, "lines").is_some());
//! }
//! ```
//!
//! Everything going through the tester obeys the same save-time rules as a
//! production run: inactive rules drop issues, duplicate saves fail, ranges
//! are validated against the in-memory file.

pub mod context;
pub mod input_file;

pub use context::SensorContextTester;
pub use input_file::TestInputFile;
