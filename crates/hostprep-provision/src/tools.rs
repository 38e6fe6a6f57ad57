use crate::commands::apt_install;
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::config::BASELINE_TOOLS;
use hostprep_core::AppError;
use hostprep_ui as ui;

/// Step 2: make sure curl, wget and git are present, then confirm git runs.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    for tool in BASELINE_TOOLS {
        if presence::is_present(ctx, tool, Scope::System).await? {
            ui::info(&format!("{tool} is already installed, skipping"));
            continue;
        }
        ui::info(&format!("Installing {tool}..."));
        ctx.check(&format!("{tool} installation"), &apt_install(ctx.config, tool))
            .await?;
    }

    let version = ctx.check("git verification", "git --version").await?;
    ui::info(version.trim());
    Ok(())
}
