use crate::commands::user_nvm;
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::AppError;
use hostprep_ssh::shell_escape;
use hostprep_ui as ui;
use std::path::Path;

/// Step 8: install pm2, register it with systemd for the invoking user and
/// save the current process list so it is resurrected on boot.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "pm2", Scope::Nvm).await? {
        ui::info("PM2 is already installed, skipping");
        return Ok(());
    }

    let cfg = ctx.config;
    ctx.check("PM2 installation", &user_nvm(cfg, "npm install -g pm2")).await?;

    // The startup entry runs outside nvm, so it needs pm2's absolute path
    // and node's bin directory on PATH.
    let pm2_path = match presence::resolve(ctx, "pm2", Scope::Nvm).await? {
        Some(path) if Path::new(&path).is_absolute() => path,
        _ => {
            ui::error("pm2 not found in PATH after installation");
            return Err(AppError::NotInPath("pm2".into()));
        }
    };
    let bin_dir = Path::new(&pm2_path)
        .parent()
        .map(|p| p.display().to_string())
        .ok_or_else(|| AppError::NotInPath("pm2".into()))?;

    let startup = format!(
        "{sudo}env PATH={path} {pm2} startup systemd -u {user} --hp {home}",
        sudo = cfg.sudo_prefix(),
        path = shell_escape(&format!("{}:{bin_dir}", cfg.path)),
        pm2 = shell_escape(&pm2_path),
        user = shell_escape(&cfg.user),
        home = shell_escape(&cfg.home.display().to_string()),
    );
    ctx.check("PM2 boot-start registration", &startup).await?;

    ctx.check("PM2 process list save", &user_nvm(cfg, "pm2 save")).await?;
    Ok(())
}
