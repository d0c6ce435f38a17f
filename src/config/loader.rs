use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::{AnalysisConfig, CONFIG_FILE_NAME};

/// Read a config file's contents without interpreting them.
pub(crate) fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML string into an `AnalysisConfig`, normalizing sections the
/// rest of the pipeline cannot work with.
pub fn parse_config(contents: &str) -> Result<AnalysisConfig, String> {
    let mut config = toml::from_str::<AnalysisConfig>(contents)
        .map_err(|e| format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))?;

    if let Some(ref duplication) = config.duplication {
        if let Err(e) = duplication.validate() {
            eprintln!("Warning: Invalid duplication thresholds: {e}. Using defaults.");
            config.duplication = None;
        }
    }

    Ok(config)
}

/// Load and parse the config at an explicit path. Unlike discovery, a broken
/// file given explicitly is an error, not a warning.
pub fn load_config_file(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let contents = read_config_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    parse_config(&contents).map_err(|e| anyhow::anyhow!(e))
}

fn try_load_config_from_path(config_path: &Path) -> Option<AnalysisConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: {e}. Using defaults.");
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Discover `.sensorkit.toml` by walking up from `start`. Absence is normal
/// and yields the default configuration.
pub fn load_config(start: &Path) -> AnalysisConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            AnalysisConfig::default()
        })
}
