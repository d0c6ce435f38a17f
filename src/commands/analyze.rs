use crate::config::{self, AnalysisConfig};
use crate::fs::{FileIndexer, FileSystem};
use crate::progress::{ProgressConfig, ProgressManager};
use crate::report::output::{JsonWriter, MarkdownWriter, OutputFormat, OutputWriter};
use crate::report::AnalysisResults;
use crate::rule::ActiveRules;
use crate::runner::{SensorExecutor, SensorRegistry};
use crate::sensors;
use crate::settings::Settings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: crate::cli::OutputFormat,
    pub output: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub coverage_file: Option<PathBuf>,
    pub fail_fast: bool,
    pub jobs: Option<usize>,
    pub quiet: bool,
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let root = config
        .path
        .canonicalize()
        .with_context(|| format!("Cannot analyze {}", config.path.display()))?;

    ProgressManager::init_global(ProgressConfig::from_env(config.quiet));
    configure_thread_pool(config.jobs.unwrap_or(0));

    let analysis_config = match &config.config_file {
        Some(path) => config::load_config_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => config::load_config(&root),
    };

    let file_system = index_project(&root, &analysis_config)?;
    let settings = build_settings(&analysis_config, config.coverage_file.as_deref());
    let active_rules = resolve_active_rules(&analysis_config);

    let registry = sensors::register_builtin_sensors(SensorRegistry::new());
    let results = SensorExecutor::new(registry)
        .fail_fast(config.fail_fast)
        .execute(&settings, &file_system, &active_rules)?;

    write_results(&results, config.format.into(), config.output.as_deref())
}

fn index_project(root: &Path, config: &AnalysisConfig) -> Result<FileSystem> {
    let indexing = config.indexing();
    let file_system = FileIndexer::new(root)
        .with_test_patterns(&indexing.test_patterns)?
        .with_exclude_patterns(&indexing.exclude_patterns)?
        .with_include_hidden(indexing.include_hidden)
        .index()?;
    if file_system.is_empty() {
        log::warn!("No analyzable files found under {}", root.display());
    }
    Ok(file_system)
}

fn build_settings(config: &AnalysisConfig, coverage_file: Option<&Path>) -> Settings {
    let mut settings = config.settings();
    if let Some(path) = coverage_file {
        settings.set(sensors::LCOV_PATH_KEY, path.to_string_lossy());
    }
    settings.with_env_overrides()
}

/// Rules from the configuration, or the default profile when it activates
/// none.
fn resolve_active_rules(config: &AnalysisConfig) -> ActiveRules {
    let rules = config.active_rules();
    if rules.is_empty() {
        sensors::default_active_rules()
    } else {
        rules
    }
}

fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new();

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        // Already configured - this is fine, just ignore
        log::debug!("Thread pool already configured: {e}");
    }
}

/// Number of worker threads an analysis will use
pub fn worker_count(jobs: Option<usize>) -> usize {
    match jobs {
        Some(jobs) if jobs > 0 => jobs,
        _ => num_cpus::get(),
    }
}

fn write_results(
    results: &AnalysisResults,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<()> {
    match output_file {
        Some(path) => {
            let mut buffer = Vec::new();
            // A color terminal rendering does not belong in a file
            match format {
                OutputFormat::Json => JsonWriter::new(&mut buffer).write_results(results)?,
                OutputFormat::Markdown | OutputFormat::Terminal => {
                    MarkdownWriter::new(&mut buffer).write_results(results)?
                }
            }
            std::fs::write(path, buffer)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => {
            let mut writer = crate::report::output::create_writer(format);
            writer.write_results(results)?;
        }
    }
    Ok(())
}
