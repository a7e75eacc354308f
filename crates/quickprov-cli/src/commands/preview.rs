use std::path::Path;

use anyhow::{Context, Result};

use quickprov_core::device::DeviceRecord;

use crate::output;

/// Render a device file that is not (yet) in the device directory.
pub async fn run(config_path: &Path, device_path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(device_path)
        .await
        .with_context(|| format!("reading {}", device_path.display()))?;
    let device = DeviceRecord::from_json(&contents)
        .with_context(|| format!("parsing {}", device_path.display()))?;

    if let Err(e) = device.validate() {
        output::print_warning(&e.to_string());
    }

    let provisioner = super::open(config_path)?;
    let rendered = provisioner.render_device(&device)?;
    print!("{}", rendered.body);
    Ok(())
}
