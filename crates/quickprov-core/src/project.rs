//! Provisioning root creation and loading.
//!
//! Used by `quickprov init` to scaffold a new root, and by the other commands
//! to open an existing one.
//!
//! ## Directory layout
//!
//! ```text
//! <root>/
//! ├── quickprov.config.json     # ProvisionerConfig
//! ├── directory.json            # extension secrets and caller-id names
//! ├── templates/<model>.json    # handset drivers
//! └── devices/<MAC>.json        # device records
//! ```

use std::path::{Path, PathBuf};

use crate::config::{ProvisionerConfig, CONFIG_FILE};
use crate::device::DeviceDirectory;
use crate::error::{ProvisionError, Result};
use crate::lookup::{PlatformLookup, ServerInfo, StaticDirectory};
use crate::provision::Provisioner;
use crate::store::TemplateStore;
use crate::templates::embedded;

pub const DIRECTORY_FILE: &str = "directory.json";

/// Create a provisioning root with the sample driver, device and directory.
///
/// Returns the path of the written config file.
pub fn create_project(root: &Path, server: ServerInfo) -> Result<PathBuf> {
    if root.exists() {
        return Err(ProvisionError::ProjectExists(root.to_path_buf()));
    }

    let config = ProvisionerConfig {
        directory_file: Some(PathBuf::from(DIRECTORY_FILE)),
        server,
        ..Default::default()
    };

    std::fs::create_dir_all(root.join(&config.templates_dir))?;
    std::fs::create_dir_all(root.join(&config.devices_dir))?;

    TemplateStore::uncached(root.join(&config.templates_dir)).import(embedded::SAMPLE_DRIVER)?;
    std::fs::write(
        root.join(&config.devices_dir)
            .join(format!("{}.json", embedded::SAMPLE_DEVICE_MAC)),
        embedded::SAMPLE_DEVICE,
    )?;
    std::fs::write(root.join(DIRECTORY_FILE), embedded::SAMPLE_DIRECTORY)?;

    let config_path = root.join(CONFIG_FILE);
    config.save(&config_path)?;
    tracing::info!("created provisioning root at {}", root.display());
    Ok(config_path)
}

/// Load a config file and resolve its paths against the file's directory.
/// A missing file yields the defaults, rooted at the same place.
pub fn load_config(config_path: &Path) -> Result<ProvisionerConfig> {
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(ProvisionerConfig::load_or_default(config_path)?.resolve_paths(base))
}

/// Build the extension lookup a resolved config describes.
pub fn open_lookup(config: &ProvisionerConfig) -> Result<Box<dyn PlatformLookup>> {
    let lookup = match &config.directory_file {
        Some(path) => StaticDirectory::load(path, config.server.clone())?,
        None => StaticDirectory::new(config.server.clone()),
    };
    Ok(Box::new(lookup))
}

impl Provisioner {
    /// Wire up a provisioner from a config whose paths are already resolved.
    pub fn from_config(config: &ProvisionerConfig) -> Result<Self> {
        let store = if config.cache_templates {
            TemplateStore::new(&config.templates_dir)
        } else {
            TemplateStore::uncached(&config.templates_dir)
        };
        Ok(Self::new(
            store,
            DeviceDirectory::new(&config.devices_dir),
            open_lookup(config)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("prov");
        let config_path = create_project(&root, ServerInfo::default()).unwrap();

        assert_eq!(config_path, root.join(CONFIG_FILE));
        assert!(root.join("templates/yealink_t48g.json").is_file());
        assert!(root.join("devices/001565AABBCC.json").is_file());
        assert!(root.join(DIRECTORY_FILE).is_file());
    }

    #[test]
    fn test_create_project_refuses_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = create_project(tmp.path(), ServerInfo::default()).unwrap_err();
        assert!(matches!(err, ProvisionError::ProjectExists(_)));
    }

    #[test]
    fn test_scaffolded_project_provisions() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("prov");
        let server = ServerInfo {
            host: "pbx.example.com".into(),
            ..Default::default()
        };
        let config_path = create_project(&root, server).unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.templates_dir, root.join("templates"));
        let provisioner = Provisioner::from_config(&config).unwrap();
        let rendered = provisioner.provision("00:15:65:aa:bb:cc").unwrap();

        assert_eq!(rendered.filename, "001565AABBCC.cfg");
        assert!(rendered.body.contains("account.1.password = change-me\n"));
        assert!(rendered.body.contains("account.1.display_name = Front Desk 200\n"));
        assert!(rendered
            .body
            .contains("account.1.sip_server.1.address = pbx.example.com\n"));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.devices_dir, tmp.path().join("devices"));
        assert_eq!(config.directory_file, None);
    }

    #[test]
    fn test_missing_directory_file_is_an_error() {
        let config = ProvisionerConfig {
            directory_file: Some(PathBuf::from("/tmp/nonexistent_quickprov/directory.json")),
            ..Default::default()
        };
        assert!(matches!(
            Provisioner::from_config(&config),
            Err(ProvisionError::ConfigNotFound { .. })
        ));
    }
}
