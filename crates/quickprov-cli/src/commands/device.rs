use std::path::Path;

use anyhow::{bail, Context, Result};

use quickprov_core::device::{DeviceDirectory, DeviceRecord};
use quickprov_core::project;
use quickprov_core::store::TemplateStore;

use crate::output;
use crate::DeviceCommand;

pub async fn run(config_path: &Path, cmd: DeviceCommand) -> Result<()> {
    let config = project::load_config(config_path)?;

    match cmd {
        DeviceCommand::List => {
            let directory = DeviceDirectory::new(&config.devices_dir);
            let devices = directory.list()?;
            if devices.is_empty() {
                output::print_warning(&format!("no devices in {}", directory.dir().display()));
            }
            for device in devices {
                println!("{}\t{}\t{}", device.mac, device.model, device.extension);
            }
        }
        DeviceCommand::Check { file } => {
            let contents = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let device = DeviceRecord::from_json(&contents)
                .with_context(|| format!("parsing {}", file.display()))?;
            device.validate()?;

            let store = TemplateStore::uncached(&config.templates_dir);
            match store.get(&device.model) {
                Ok(driver) => {
                    if let Some(max) = driver
                        .max_line_keys
                        .filter(|&max| device.keys.len() > max as usize)
                    {
                        bail!(
                            "{} keys defined but {} supports {max}",
                            device.keys.len(),
                            driver.label()
                        );
                    }
                }
                Err(e) => output::print_warning(&e.to_string()),
            }

            output::print_success(&format!("{} is valid", file.display()));
            output::print_key_value("MAC", &device.normalized_mac());
            output::print_key_value("Model", &device.model);
            output::print_key_value("Keys", &device.keys.len().to_string());
            output::print_key_value("Contacts", &device.contacts.len().to_string());
        }
    }

    Ok(())
}
