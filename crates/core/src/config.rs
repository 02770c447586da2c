//! Layered application configuration.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file under the
//! user's config directory, then `INVENTORY_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::search::DEFAULT_CURRENCY;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "inventory";

const DEFAULT_CONFIG: &str = r#"# Inventory configuration.
# Every key may also be set through INVENTORY_<KEY> environment variables.

# JSON catalog, rewritten after every change.
catalog_path = "products.json"

# Destination of the CSV export.
export_path = "products.csv"

# Suffix appended to prices in the product table.
currency_symbol = "€"

# Directory receiving inventory.log.
log_dir = "logs"

# Seed an empty catalog when catalog_path does not exist yet.
create_missing_catalog = true
"#;

/// Runtime settings shared by the core and its frontends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Persisted catalog file.
    pub catalog_path: PathBuf,
    /// CSV export destination.
    pub export_path: PathBuf,
    /// Suffix for rendered prices.
    pub currency_symbol: String,
    /// Log file directory.
    pub log_dir: PathBuf,
    /// Whether to seed an empty catalog before the first load.
    pub create_missing_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("products.json"),
            export_path: PathBuf::from("products.csv"),
            currency_symbol: DEFAULT_CURRENCY.to_string(),
            log_dir: PathBuf::from("logs"),
            create_missing_catalog: true,
        }
    }
}

impl AppConfig {
    /// Default location of the config file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join("config.toml")
    }

    /// Load from the default file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("INVENTORY").try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Write the commented default config file unless one exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}
