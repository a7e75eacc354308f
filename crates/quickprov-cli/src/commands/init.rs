use std::path::Path;

use anyhow::Result;

use quickprov_core::lookup::ServerInfo;
use quickprov_core::project;
use quickprov_core::provision::Provisioner;
use quickprov_core::templates::embedded;

use crate::output;

/// Create a provisioning root.
///
/// Writes the config, the sample Yealink driver, a sample device record and an
/// extension directory. Refuses to touch an existing directory.
pub async fn run(dir: &Path, host: String, port: String) -> Result<()> {
    output::print_header(&format!("quickprov init: {}", dir.display()));

    let server = ServerInfo {
        host,
        port,
        ..Default::default()
    };

    output::print_step(1, 2, "Writing config and sample files");
    let config_path = project::create_project(dir, server)?;

    output::print_step(2, 2, "Checking the sample device renders");
    let config = project::load_config(&config_path)?;
    let provisioner = Provisioner::from_config(&config)?;
    match provisioner.provision(embedded::SAMPLE_DEVICE_MAC) {
        Ok(rendered) => output::print_key_value("Sample config", &rendered.filename),
        Err(e) => output::print_warning(&format!("sample device does not render: {e}")),
    }

    output::print_success(&format!("Provisioning root created at {}", dir.display()));
    eprintln!();
    eprintln!("  Next steps:");
    eprintln!("    cd {}", dir.display());
    eprintln!("    edit directory.json with your extension secrets");
    eprintln!("    quickprov render {}", embedded::SAMPLE_DEVICE_MAC);
    eprintln!();

    Ok(())
}
