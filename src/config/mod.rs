// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::io;
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = read_config_file(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    from_contents(path, &contents)
}

/// Like [`load_config`], but a file that does not exist yields the built-in
/// defaults. Any other read failure is still an error.
pub async fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    match read_config_file(path).await {
        Ok(contents) => from_contents(path, &contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("Config file {} not found, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
        }
    }
}

async fn read_config_file(path: &Path) -> io::Result<String> {
    tokio::fs::read_to_string(path).await
}

fn from_contents(path: &Path, contents: &str) -> Result<Config> {
    let config = parse_config(path, contents)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let ext = path.extension().and_then(|s| s.to_str());
    let config = if matches!(ext, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}
