mod commands;

use clap::{Args, Parser, Subcommand};
use hostprep_ui as ui;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hostprep",
    version,
    about = "Provision a fresh server: toolchain, Docker, Nginx, PM2 and a firewall"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every provisioning step in order, stopping at the first failure
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// nvm release to install (e.g. v0.39.7)
        #[arg(long, env = "HOSTPREP_NVM_VERSION")]
        nvm_version: Option<String>,
    },

    /// Report which managed tools are present and whether the firewall is active
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Which host to provision and for whom.
#[derive(Args)]
pub struct TargetArgs {
    /// Provision a remote host over SSH as root instead of this machine
    #[arg(long, requires = "key")]
    pub host: Option<String>,

    /// Private key for root SSH access to --host
    #[arg(long, requires = "host")]
    pub key: Option<PathBuf>,

    /// User added to the docker group and owning the PM2 boot service
    /// [default: $SUDO_USER, then $USER; root for --host]
    #[arg(long)]
    pub user: Option<String>,

    /// Home directory of that user (nvm and PM2 live here)
    /// [default: /home/<user> when switching users, otherwise $HOME]
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Executable search path handed to every command [default: $PATH]
    #[arg(long)]
    pub path: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            target,
            nvm_version,
        } => commands::run(target, nvm_version).await,
        Commands::Status { target } => commands::status(target).await,
    };

    if let Err(e) = result {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
