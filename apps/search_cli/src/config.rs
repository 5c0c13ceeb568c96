use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use shared::domain::MovieRecord;

pub const DEFAULT_CONFIG_PATH: &str = "search_cli.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub query: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/catalog.json"),
            query: String::new(),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then the TOML file at `path` (if present), then environment
/// variables. A config file that exists but does not parse is an error.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;

    if let Some(v) = file_cfg.get("catalog_path") {
        settings.catalog_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("query") {
        settings.query = v.clone();
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }

    Ok(())
}

fn apply_env_overrides<F>(settings: &mut Settings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("SEARCH_CLI_CATALOG") {
        settings.catalog_path = PathBuf::from(v);
    }
    if let Some(v) = var("APP__CATALOG_PATH") {
        settings.catalog_path = PathBuf::from(v);
    }

    if let Some(v) = var("SEARCH_CLI_QUERY") {
        settings.query = v;
    }
    if let Some(v) = var("APP__QUERY") {
        settings.query = v;
    }

    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<MovieRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read movie catalog '{}'", path.display()))?;
    let records: Vec<MovieRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("movie catalog '{}' is not valid JSON", path.display()))?;
    Ok(records)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
