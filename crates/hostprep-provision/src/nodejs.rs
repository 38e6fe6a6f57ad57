use crate::commands::{as_user, user_nvm};
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::AppError;
use hostprep_ssh::shell_escape;
use hostprep_ui as ui;

/// Step 3: install nvm into `<home>/.nvm`.
pub async fn provision_nvm(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "nvm", Scope::Nvm).await? {
        ui::info("nvm is already installed, skipping");
        return Ok(());
    }

    let cfg = ctx.config;
    let install = format!(
        "export HOME={home} NVM_DIR={nvm_dir} && mkdir -p \"$NVM_DIR\" && \
         curl -fsSL https://raw.githubusercontent.com/nvm-sh/nvm/{version}/install.sh | bash",
        home = shell_escape(&cfg.home.display().to_string()),
        nvm_dir = shell_escape(&cfg.nvm_dir().display().to_string()),
        version = cfg.nvm_version,
    );
    ctx.check("nvm installation", &as_user(cfg, &install))
        .await?;

    // The installer only edits shell profiles; prove the script actually loads.
    ctx.check("nvm verification", &user_nvm(cfg, "command -v nvm")).await?;
    Ok(())
}

/// Step 4: install the latest LTS Node.js through nvm and make it the default.
pub async fn provision_node(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "node", Scope::Nvm).await? {
        ui::info("Node.js is already installed, skipping");
        return Ok(());
    }

    ctx.check(
        "Node.js LTS installation",
        &user_nvm(ctx.config, "nvm install --lts && nvm alias default 'lts/*'"),
    )
    .await?;

    let version = ctx
        .check("Node.js verification", &user_nvm(ctx.config, "node --version"))
        .await?;
    ui::info(&format!("Node.js {}", version.trim()));
    Ok(())
}

/// Step 5: install yarn globally with npm.
pub async fn provision_yarn(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    if presence::is_present(ctx, "yarn", Scope::Nvm).await? {
        ui::info("Yarn is already installed, skipping");
        return Ok(());
    }

    ctx.check("Yarn installation", &user_nvm(ctx.config, "npm install -g yarn"))
        .await?;
    ctx.check("Yarn verification", &user_nvm(ctx.config, "yarn --version"))
        .await?;
    Ok(())
}
