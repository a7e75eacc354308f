use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::Confirm;

use quickprov_core::project;
use quickprov_core::store::TemplateStore;

use crate::output;
use crate::DriverCommand;

/// Manage the driver store configured in `config_path`.
pub async fn run(config_path: &Path, cmd: DriverCommand) -> Result<()> {
    let config = project::load_config(config_path)?;
    let store = TemplateStore::uncached(&config.templates_dir);

    match cmd {
        DriverCommand::Import { file } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let model = store.import(&json)?;
            output::print_success(&format!("Imported driver {model}"));
            output::print_key_value("Stored at", &store.dir().join(format!("{model}.json")).display().to_string());
        }
        DriverCommand::List => {
            let drivers = store.list()?;
            if drivers.is_empty() {
                output::print_warning(&format!("no drivers in {}", store.dir().display()));
            }
            for driver in drivers {
                println!("{}\t{}", driver.model, driver.display_name);
            }
        }
        DriverCommand::Show { model } => {
            println!("{}", store.get_raw(&model)?);
        }
        DriverCommand::Delete { model, yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete driver {model}?"))
                    .default(false)
                    .interact()?;
            if !confirmed {
                output::print_warning("aborted");
                return Ok(());
            }
            store.delete(&model)?;
            output::print_success(&format!("Deleted driver {model}"));
        }
    }

    Ok(())
}
