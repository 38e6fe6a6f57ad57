use crate::ProvisionContext;
use hostprep_core::{AppError, ProvisionConfig};
use hostprep_ssh::shell_escape;
use hostprep_ui as ui;

impl ProvisionContext<'_> {
    /// Run a script and fail the whole pipeline if it exits non-zero.
    ///
    /// Logs one SUCCESS or ERROR line naming `step`. Returns the captured
    /// stdout on success.
    pub async fn check(&self, step: &str, script: &str) -> Result<String, AppError> {
        let out = self.host.run(script).await?;
        if !out.success() {
            ui::error(&format!("{step} failed (exit status {})", out.status));
            return Err(AppError::StepFailed {
                step: step.to_string(),
                status: out.status,
                stderr: out.stderr.trim().to_string(),
            });
        }
        ui::success(&format!("{step} succeeded"));
        Ok(out.stdout)
    }
}

/// Prefix `script` with the nvm environment so node, npm, yarn and pm2
/// resolve the same way they do in the user's login shell.
pub fn with_nvm(config: &ProvisionConfig, script: &str) -> String {
    let nvm_dir = config.nvm_dir().display().to_string();
    format!(
        "export NVM_DIR={}; [ -s \"$NVM_DIR/nvm.sh\" ] && . \"$NVM_DIR/nvm.sh\"; {script}",
        shell_escape(&nvm_dir)
    )
}

/// Run `script` as the configured user through a login shell, so HOME and
/// file ownership belong to that user. Unchanged when no switch is needed.
pub fn as_user(config: &ProvisionConfig, script: &str) -> String {
    if !config.switch_user {
        return script.to_string();
    }
    format!(
        "{}su - {} -c {}",
        config.sudo_prefix(),
        config.user,
        shell_escape(script)
    )
}

/// [`with_nvm`] run as the configured user.
pub fn user_nvm(config: &ProvisionConfig, script: &str) -> String {
    as_user(config, &with_nvm(config, script))
}

/// `apt-get update`
pub fn apt_update(config: &ProvisionConfig) -> String {
    format!("{}apt-get update", config.sudo_prefix())
}

/// Non-interactive `apt-get install -y <packages>`.
pub fn apt_install(config: &ProvisionConfig, packages: &str) -> String {
    format!(
        "{}DEBIAN_FRONTEND=noninteractive apt-get install -y {packages}",
        config.sudo_prefix()
    )
}
