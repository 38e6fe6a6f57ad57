use crate::TargetArgs;
use anyhow::{Context, Result};
use hostprep_core::config::default_home;
use hostprep_core::ProvisionConfig;
use hostprep_provision::{Host, LocalHost, ProvisionContext, SshHost};
use hostprep_ui as ui;

/// Config for a remote host. The local environment says nothing about the
/// target, so only explicit values count; SSH sessions run as root.
fn remote_config(target: &TargetArgs) -> Result<ProvisionConfig> {
    let user = target.user.clone().unwrap_or_else(|| "root".into());
    let home = target.home.clone().unwrap_or_else(|| default_home(&user));
    let mut config =
        ProvisionConfig::resolve_with(Some(user), Some(home), target.path.clone(), |_| None)?;
    config.switch_user = config.user != "root";
    config.sudo = false;
    Ok(config)
}

/// Resolve the config and the host it applies to.
fn prepare(target: TargetArgs) -> Result<(Box<dyn Host>, ProvisionConfig)> {
    let mut config = if target.host.is_some() {
        remote_config(&target)?
    } else {
        ProvisionConfig::resolve(target.user.clone(), target.home.clone(), target.path.clone())?
    };

    let host: Box<dyn Host> = match (target.host, target.key) {
        (Some(ip), Some(key)) => Box::new(SshHost::new(ip, key)),
        _ => {
            config.sudo = !is_root();
            Box::new(LocalHost::new(&config.path).context("Cannot run local commands")?)
        }
    };

    Ok((host, config))
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

pub async fn run(target: TargetArgs, nvm_version: Option<String>) -> Result<()> {
    let (host, mut config) = prepare(target)?;
    if let Some(version) = nvm_version.filter(|v| !v.trim().is_empty()) {
        config.nvm_version = version;
    }
    if config.sudo {
        ui::warn("Not running as root; privileged commands will use sudo");
    }

    let ctx = ProvisionContext::new(host.as_ref(), &config);
    hostprep_provision::run(&ctx)
        .await
        .context("Provisioning aborted")?;
    Ok(())
}

pub async fn status(target: TargetArgs) -> Result<()> {
    let (host, config) = prepare(target)?;
    let ctx = ProvisionContext::new(host.as_ref(), &config);

    ui::info(&format!("Checking {}...", host.describe()));
    let report = hostprep_provision::status(&ctx).await?;

    println!();
    println!("  {:<10}  {}", "Tool", "Location");
    println!("  {}", "-".repeat(50));
    for tool in &report.tools {
        println!(
            "  {:<10}  {}",
            tool.name,
            tool.path.as_deref().unwrap_or("not installed")
        );
    }
    let firewall = match report.firewall_active {
        Some(true) => "active",
        Some(false) => "inactive",
        None => "unknown",
    };
    println!("\n  Firewall: {firewall}");

    let installed = report.tools.iter().filter(|t| t.path.is_some()).count();
    println!("  Installed: {installed}/{} tool(s)", report.tools.len());
    Ok(())
}
