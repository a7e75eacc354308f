//! CLI command implementations for quickprov.
//!
//! Each module corresponds to a subcommand (`quickprov <command>`).

pub mod device;
pub mod driver;
pub mod init;
pub mod preview;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};

use quickprov_core::project;
use quickprov_core::provision::Provisioner;

/// Load the config and build a provisioner from it.
pub(crate) fn open(config_path: &Path) -> Result<Provisioner> {
    let config = project::load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    Ok(Provisioner::from_config(&config)?)
}
