use crate::config::{self, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use std::path::Path;

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    let config_path = path.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    std::fs::write(&config_path, config::default_config_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {} configuration file", config_path.display());

    Ok(())
}
