//! Coverage import from LCOV reports.
//!
//! Runs only when `sensorkit.coverage.lcov_path` is set. Report paths are
//! matched against indexed files exactly first, then by path suffix in both
//! directions, since LCOV writers disagree on whether paths are absolute.
//! Source files the report mentions but the index does not are skipped.

use crate::errors::{Error, Result};
use crate::fs::{FileSystem, InputFile};
use crate::measure::metrics;
use crate::sensor::{Sensor, SensorContext, SensorDescriptor};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const LCOV_PATH_KEY: &str = "sensorkit.coverage.lcov_path";

pub struct LcovCoverageSensor;

impl Sensor for LcovCoverageSensor {
    fn describe(&self) -> SensorDescriptor {
        SensorDescriptor::new("lcov-coverage")
    }

    fn execute(&self, context: &mut SensorContext<'_>) -> Result<()> {
        let Some(report) = context.settings().get_string(LCOV_PATH_KEY) else {
            log::debug!("{LCOV_PATH_KEY} not set, skipping coverage import");
            return Ok(());
        };

        let report_path = if Path::new(&report).is_absolute() {
            PathBuf::from(&report)
        } else {
            context.file_system().base_dir().join(&report)
        };
        let summaries = parse_report(&report_path)?;
        log::info!(
            "imported coverage for {} files from {}",
            summaries.len(),
            report_path.display()
        );

        for summary in summaries {
            let file = match find_input_file(context.file_system(), &summary.file) {
                Some(file) => Arc::clone(file),
                None => {
                    log::debug!(
                        "coverage for {} matches no indexed file",
                        summary.file.display()
                    );
                    continue;
                }
            };
            context
                .new_measure()
                .on_file(&file)
                .for_metric(&metrics::LINES_TO_COVER)
                .with_value(summary.lines_to_cover())
                .save()?;
            context
                .new_measure()
                .on_file(&file)
                .for_metric(&metrics::UNCOVERED_LINES)
                .with_value(summary.uncovered_lines())
                .save()?;
            context
                .new_measure()
                .on_file(&file)
                .for_metric(&metrics::COVERAGE)
                .with_value(summary.coverage_percent())
                .save()?;
        }
        Ok(())
    }
}

/// Per-file line hit counts aggregated from one report.
#[derive(Clone, Debug)]
pub struct FileCoverage {
    file: PathBuf,
    line_hits: BTreeMap<u32, u64>,
}

impl FileCoverage {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn lines_to_cover(&self) -> i64 {
        self.line_hits.len() as i64
    }

    pub fn uncovered_lines(&self) -> i64 {
        self.line_hits.values().filter(|count| **count == 0).count() as i64
    }

    pub fn coverage_percent(&self) -> f64 {
        let total = self.lines_to_cover();
        if total == 0 {
            return 0.0;
        }
        let covered = total - self.uncovered_lines();
        covered as f64 / total as f64 * 100.0
    }
}

/// Parse an LCOV report into per-file summaries. Sections repeating a
/// source file (merged reports) accumulate their hit counts.
pub fn parse_report(path: &Path) -> Result<Vec<FileCoverage>> {
    use lcov::{Reader, Record};

    let reader = Reader::open_file(path)
        .map_err(|e| Error::Coverage(format!("failed to open {}: {e}", path.display())))?;

    let mut by_file: BTreeMap<PathBuf, BTreeMap<u32, u64>> = BTreeMap::new();
    let mut current: Option<(PathBuf, BTreeMap<u32, u64>)> = None;

    for record in reader {
        let record = record.map_err(|e| {
            Error::Coverage(format!("malformed record in {}: {e}", path.display()))
        })?;
        match record {
            Record::SourceFile { path } => {
                flush(&mut by_file, &mut current);
                current = Some((path, BTreeMap::new()));
            }
            Record::LineData { line, count, .. } => {
                if let Some((_, lines)) = current.as_mut() {
                    *lines.entry(line).or_insert(0) += count;
                }
            }
            Record::EndOfRecord => flush(&mut by_file, &mut current),
            _ => {}
        }
    }
    flush(&mut by_file, &mut current);

    Ok(by_file
        .into_iter()
        .map(|(file, line_hits)| FileCoverage { file, line_hits })
        .collect())
}

fn flush(
    by_file: &mut BTreeMap<PathBuf, BTreeMap<u32, u64>>,
    current: &mut Option<(PathBuf, BTreeMap<u32, u64>)>,
) {
    if let Some((file, lines)) = current.take() {
        let merged = by_file.entry(file).or_default();
        for (line, count) in lines {
            *merged.entry(line).or_insert(0) += count;
        }
    }
}

fn find_input_file<'a>(
    file_system: &'a FileSystem,
    lcov_path: &Path,
) -> Option<&'a Arc<InputFile>> {
    let normalized = normalize(lcov_path, file_system.base_dir());
    if let Some(file) = file_system.input_file_at(&normalized) {
        return Some(file);
    }
    file_system.iter().find(|file| {
        lcov_path.ends_with(file.relative_path()) || file.relative_path().ends_with(&normalized)
    })
}

fn normalize(lcov_path: &Path, base_dir: &Path) -> PathBuf {
    let stripped = lcov_path.strip_prefix(base_dir).unwrap_or(lcov_path);
    stripped
        .strip_prefix("./")
        .unwrap_or(stripped)
        .to_path_buf()
}
