//! Provisioner configuration (`quickprov.config.json`).
//!
//! Every field has a default so a partial (or absent) file still yields a
//! usable configuration:
//!
//! ```json
//! {
//!   "templates_dir": "templates",
//!   "devices_dir": "devices",
//!   "directory_file": "directory.json",
//!   "cache_templates": true,
//!   "server": { "host": "10.0.0.5", "port": "5060", "https": false }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};
use crate::lookup::ServerInfo;

/// Default file name for the provisioner configuration.
pub const CONFIG_FILE: &str = "quickprov.config.json";

/// Top-level provisioner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Directory holding one `<model>.json` driver per handset model.
    pub templates_dir: PathBuf,
    /// Directory holding one `<MAC>.json` device record per handset.
    pub devices_dir: PathBuf,
    /// Extension directory used for SIP secret and display-name lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_file: Option<PathBuf>,
    /// Keep parsed drivers in memory between renders.
    pub cache_templates: bool,
    pub server: ServerInfo,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            devices_dir: PathBuf::from("devices"),
            directory_file: None,
            cache_templates: true,
            server: ServerInfo::default(),
        }
    }
}

impl ProvisionerConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| ProvisionError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load a configuration file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ProvisionError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the configured directories relative to `base` (usually the
    /// directory the config file lives in). Absolute paths are left alone.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.templates_dir = base.join(&self.templates_dir);
        self.devices_dir = base.join(&self.devices_dir);
        self.directory_file = self.directory_file.map(|p| base.join(p));
        self
    }
}
