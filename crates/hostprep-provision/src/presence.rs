use crate::commands::user_nvm;
use hostprep_core::config::SBIN_DIRS;
use crate::ProvisionContext;
use hostprep_core::AppError;

/// Where a tool becomes resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// On the plain search path.
    System,
    /// Only after the nvm environment is sourced.
    Nvm,
}

/// Absolute path (or function name, for nvm) of `tool`, if resolvable.
pub async fn resolve(
    ctx: &ProvisionContext<'_>,
    tool: &str,
    scope: Scope,
) -> Result<Option<String>, AppError> {
    let probe = format!("command -v {tool}");
    let script = match scope {
        Scope::System => format!("export PATH=\"$PATH:{SBIN_DIRS}\"; {probe}"),
        Scope::Nvm => user_nvm(ctx.config, &probe),
    };
    let out = ctx.host.run(&script).await?;
    if !out.success() {
        return Ok(None);
    }
    Ok(out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(str::to_string))
}

pub async fn is_present(
    ctx: &ProvisionContext<'_>,
    tool: &str,
    scope: Scope,
) -> Result<bool, AppError> {
    Ok(resolve(ctx, tool, scope).await?.is_some())
}
