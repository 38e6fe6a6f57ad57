use crate::commands::{apt_install, apt_update};
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::AppError;
use hostprep_ui as ui;

const PREREQUISITES: &str = "curl gnupg2 ca-certificates lsb-release";
const KEYRING: &str = "/usr/share/keyrings/nginx-archive-keyring.gpg";
const SOURCE_LIST: &str = "/etc/apt/sources.list.d/nginx.list";

/// Step 7: install nginx from the nginx.org stable repository and start it
/// at boot.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "nginx", Scope::System).await? {
        ui::info("Nginx is already installed, skipping");
        return Ok(());
    }

    let cfg = ctx.config;
    let sudo = cfg.sudo_prefix();

    ctx.check("Nginx prerequisites installation", &apt_install(cfg, PREREQUISITES))
        .await?;

    let add_key = format!(
        "curl -fsSL https://nginx.org/keys/nginx_signing.key | \
         {sudo}gpg --dearmor --yes -o {KEYRING}"
    );
    ctx.check("Nginx signing key registration", &add_key).await?;

    let add_repo = format!(
        "echo \"deb [signed-by={KEYRING}] \
         http://nginx.org/packages/$(. /etc/os-release && echo \"$ID\") $(lsb_release -cs) nginx\" | \
         {sudo}tee {SOURCE_LIST} > /dev/null"
    );
    ctx.check("Nginx repository registration", &add_repo).await?;

    ctx.check("Package index refresh", &apt_update(cfg)).await?;
    ctx.check("Nginx installation", &apt_install(cfg, "nginx")).await?;
    ctx.check(
        "Nginx boot-start registration",
        &format!("{sudo}systemctl enable nginx"),
    )
    .await?;
    Ok(())
}
