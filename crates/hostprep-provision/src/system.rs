use crate::commands::apt_update;
use crate::ProvisionContext;
use hostprep_core::AppError;

/// Step 1: refresh the package index and upgrade everything installed.
/// Always runs; there is nothing to probe.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    ctx.check("Package index refresh", &apt_update(ctx.config)).await?;
    ctx.check(
        "System package upgrade",
        &format!(
            "{}DEBIAN_FRONTEND=noninteractive apt-get upgrade -y",
            ctx.config.sudo_prefix()
        ),
    )
    .await?;
    Ok(())
}
