//! Idempotent provisioning of a fresh Debian/Ubuntu server.
//!
//! [`run`] executes nine steps in a fixed order. Every step probes before it
//! installs, and the first failing command aborts the whole run.

pub mod commands;
mod docker;
pub mod firewall;
pub mod host;
mod nginx;
mod nodejs;
mod pm2;
pub mod presence;
mod system;
mod tools;

#[cfg(test)]
mod testing;

pub use host::{Host, LocalHost, SshHost};

use hostprep_core::{AppError, ProvisionConfig};
use hostprep_ui as ui;
use presence::Scope;

pub const TOTAL_STEPS: usize = 9;

/// Every tool the pipeline manages, in install order, with where it resolves.
pub const MANAGED_TOOLS: &[(&str, Scope)] = &[
    ("curl", Scope::System),
    ("wget", Scope::System),
    ("git", Scope::System),
    ("nvm", Scope::Nvm),
    ("node", Scope::Nvm),
    ("yarn", Scope::Nvm),
    ("docker", Scope::System),
    ("nginx", Scope::System),
    ("pm2", Scope::Nvm),
    ("ufw", Scope::System),
];

/// The host being provisioned and the inputs describing its user.
pub struct ProvisionContext<'a> {
    pub host: &'a dyn Host,
    pub config: &'a ProvisionConfig,
}

impl<'a> ProvisionContext<'a> {
    pub fn new(host: &'a dyn Host, config: &'a ProvisionConfig) -> Self {
        Self { host, config }
    }
}

/// Run all provisioning steps in order, stopping at the first failure.
pub async fn run(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    ui::info(&format!(
        "Provisioning {} for user '{}'",
        ctx.host.describe(),
        ctx.config.user
    ));

    ui::step(1, TOTAL_STEPS, "Updating system packages...");
    system::provision(ctx).await?;

    ui::step(2, TOTAL_STEPS, "Installing baseline tools (curl, wget, git)...");
    tools::provision(ctx).await?;

    ui::step(3, TOTAL_STEPS, "Installing nvm...");
    nodejs::provision_nvm(ctx).await?;

    ui::step(4, TOTAL_STEPS, "Installing Node.js LTS...");
    nodejs::provision_node(ctx).await?;

    ui::step(5, TOTAL_STEPS, "Installing Yarn...");
    nodejs::provision_yarn(ctx).await?;

    ui::step(6, TOTAL_STEPS, "Installing Docker...");
    docker::provision(ctx).await?;

    ui::step(7, TOTAL_STEPS, "Installing Nginx...");
    nginx::provision(ctx).await?;

    ui::step(8, TOTAL_STEPS, "Installing PM2...");
    pm2::provision(ctx).await?;

    ui::step(9, TOTAL_STEPS, "Configuring firewall...");
    firewall::provision(ctx).await?;

    println!();
    ui::success("Server provisioning complete");
    Ok(())
}

/// Presence of one managed tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub tools: Vec<ToolStatus>,
    /// `None` when ufw is missing or its status could not be read.
    pub firewall_active: Option<bool>,
}

/// Probe every managed tool without changing anything on the host.
pub async fn status(ctx: &ProvisionContext<'_>) -> Result<StatusReport, AppError> {
    let mut tools = Vec::with_capacity(MANAGED_TOOLS.len());
    for &(name, scope) in MANAGED_TOOLS {
        let path = presence::resolve(ctx, name, scope).await?;
        tools.push(ToolStatus { name, path });
    }

    let ufw_present = tools.iter().any(|t| t.name == "ufw" && t.path.is_some());
    let firewall_active = if ufw_present {
        let out = ctx
            .host
            .run(&format!("{}ufw status", ctx.config.sudo_prefix()))
            .await?;
        out.success().then(|| firewall::is_active(&out.stdout))
    } else {
        None
    };

    Ok(StatusReport {
        tools,
        firewall_active,
    })
}
