use std::path::Path;

use anyhow::Result;

use crate::output;

/// Provision a handset by MAC.
///
/// Without `--out` the config is printed to stdout as-is, so it can be piped
/// or served. With `--out` it is written to `<dir>/<filename>` and a summary
/// is printed instead.
pub async fn run(config_path: &Path, mac: &str, out_dir: Option<&Path>) -> Result<()> {
    let provisioner = super::open(config_path)?;
    let rendered = provisioner.provision(mac)?;

    let Some(out_dir) = out_dir else {
        print!("{}", rendered.body);
        return Ok(());
    };

    output::print_header(&format!("quickprov render: {mac}"));
    tokio::fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(&rendered.filename);
    tokio::fs::write(&path, rendered.as_bytes()).await?;

    output::print_success("Config rendered");
    output::print_rendered(&rendered, &path);

    Ok(())
}
