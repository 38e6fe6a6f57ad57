use crate::commands::{apt_install, apt_update};
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::AppError;
use hostprep_ui as ui;

const PREREQUISITES: &str =
    "apt-transport-https ca-certificates curl software-properties-common gnupg";
const KEYRING: &str = "/etc/apt/keyrings/docker.gpg";
const SOURCE_LIST: &str = "/etc/apt/sources.list.d/docker.list";

/// Step 6: install Docker CE from Docker's apt repository, let the invoking
/// user talk to the daemon, and start it at boot.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "docker", Scope::System).await? {
        ui::info("Docker is already installed, skipping");
        return Ok(());
    }

    let cfg = ctx.config;
    let sudo = cfg.sudo_prefix();

    ctx.check("Docker prerequisites installation", &apt_install(cfg, PREREQUISITES))
        .await?;

    let add_key = format!(
        "{sudo}install -m 0755 -d /etc/apt/keyrings && \
         curl -fsSL \"https://download.docker.com/linux/$(. /etc/os-release && echo \"$ID\")/gpg\" | \
         {sudo}gpg --dearmor --yes -o {KEYRING} && \
         {sudo}chmod a+r {KEYRING}"
    );
    ctx.check("Docker signing key registration", &add_key).await?;

    let add_repo = format!(
        "echo \"deb [arch=$(dpkg --print-architecture) signed-by={KEYRING}] \
         https://download.docker.com/linux/$(. /etc/os-release && echo \"$ID $VERSION_CODENAME\") stable\" | \
         {sudo}tee {SOURCE_LIST} > /dev/null"
    );
    ctx.check("Docker repository registration", &add_repo).await?;

    ctx.check("Package index refresh", &apt_update(cfg)).await?;
    ctx.check(
        "Docker installation",
        &apt_install(cfg, "docker-ce docker-ce-cli containerd.io"),
    )
    .await?;

    ctx.check(
        "docker group membership",
        &format!("{sudo}usermod -aG docker {}", cfg.user),
    )
    .await?;
    ui::info(&format!(
        "{} can run docker without sudo after the next login",
        cfg.user
    ));

    ctx.check(
        "Docker boot-start registration",
        &format!("{sudo}systemctl enable docker"),
    )
    .await?;
    Ok(())
}
