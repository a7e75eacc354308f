//! quickprov CLI: render and manage boot-time configs for VoIP handsets.
//!
//! Commands cover the provisioning root (`init`), rendering (`render`,
//! `preview`), the driver store (`driver ...`) and device records
//! (`device ...`). All of them delegate to `quickprov_core`.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quickprov",
    about = "Render boot-time configuration files for VoIP handsets",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to quickprov.config.json
    #[arg(
        long,
        global = true,
        env = "QUICKPROV_CONFIG",
        default_value = quickprov_core::config::CONFIG_FILE
    )]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new provisioning root with sample files
    Init {
        /// Directory to create
        dir: PathBuf,

        /// SIP server address written into the config
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// SIP server port
        #[arg(long, default_value = "5060")]
        port: String,
    },

    /// Render the config file for a handset by MAC address
    Render {
        /// MAC address in any common notation (001565AABBCC, 00:15:65:aa:bb:cc, ...)
        mac: String,

        /// Write `<dir>/<filename>` instead of printing the config
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Render a device record file without storing it
    Preview {
        /// Path to a device JSON file
        device: PathBuf,
    },

    /// Manage handset drivers in the template store
    #[command(subcommand)]
    Driver(DriverCommand),

    /// Inspect device records
    #[command(subcommand)]
    Device(DeviceCommand),
}

#[derive(Subcommand)]
pub enum DriverCommand {
    /// Import a driver JSON file (the model id is read from the file)
    Import { file: PathBuf },

    /// List stored drivers
    List,

    /// Print a stored driver document
    Show { model: String },

    /// Delete a stored driver
    Delete {
        model: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum DeviceCommand {
    /// List device records
    List,

    /// Validate a device JSON file
    Check { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { dir, host, port } => {
            commands::init::run(&dir, host, port).await?;
        }
        Commands::Render { mac, out } => {
            commands::render::run(&cli.config, &mac, out.as_deref()).await?;
        }
        Commands::Preview { device } => {
            commands::preview::run(&cli.config, &device).await?;
        }
        Commands::Driver(cmd) => {
            commands::driver::run(&cli.config, cmd).await?;
        }
        Commands::Device(cmd) => {
            commands::device::run(&cli.config, cmd).await?;
        }
    }

    Ok(())
}
