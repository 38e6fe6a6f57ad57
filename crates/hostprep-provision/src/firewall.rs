use crate::commands::apt_install;
use crate::presence::{self, Scope};
use crate::ProvisionContext;
use hostprep_core::config::FIREWALL_SERVICES;
use hostprep_core::AppError;
use hostprep_ui as ui;

/// Step 9: deny inbound by default, allow ssh/http/https, enable ufw and
/// verify the result.
///
/// When ufw is already active the default policies are left alone and only
/// the allow rules are re-applied; ufw skips rules it already has.
pub async fn provision(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    let sudo = ctx.config.sudo_prefix();

    if !presence::is_present(ctx, "ufw", Scope::System).await? {
        ui::info("Installing ufw...");
        ctx.check("ufw installation", &apt_install(ctx.config, "ufw")).await?;
    }

    let status = ctx
        .check("Firewall status query", &format!("{sudo}ufw status"))
        .await?;

    if is_active(&status) {
        ui::info("Firewall is already active, updating rules");
        allow_services(ctx).await?;
    } else {
        ctx.check(
            "Default inbound policy",
            &format!("{sudo}ufw default deny incoming"),
        )
        .await?;
        ctx.check(
            "Default outbound policy",
            &format!("{sudo}ufw default allow outgoing"),
        )
        .await?;
        allow_services(ctx).await?;
        ctx.check("Firewall activation", &format!("{sudo}ufw --force enable"))
            .await?;

        let status = ctx
            .check("Firewall status query", &format!("{sudo}ufw status"))
            .await?;
        if !is_active(&status) {
            ui::error("ufw did not report itself active after enabling");
            return Err(AppError::FirewallVerification(
                "ufw is not active after enable".into(),
            ));
        }
    }

    verify(ctx).await
}

async fn allow_services(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    let sudo = ctx.config.sudo_prefix();
    for (service, _) in FIREWALL_SERVICES {
        ctx.check(
            &format!("Allow {service}"),
            &format!("{sudo}ufw allow {service}"),
        )
        .await?;
    }
    Ok(())
}

/// Confirm every expected port has a rule and inbound traffic is denied by
/// default. Each port is checked on its own.
async fn verify(ctx: &ProvisionContext<'_>) -> Result<(), AppError> {
    let sudo = ctx.config.sudo_prefix();
    let listing = ctx
        .check("Firewall rule listing", &format!("{sudo}ufw status numbered"))
        .await?;
    let verbose = ctx
        .check("Firewall policy query", &format!("{sudo}ufw status verbose"))
        .await?;

    let mut problems = Vec::new();
    let missing = missing_ports(&listing);
    if !missing.is_empty() {
        problems.push(format!("no rule for port(s) {}", missing.join(", ")));
    }
    if !denies_incoming(&verbose) {
        problems.push("default inbound policy is not deny".to_string());
    }

    if !problems.is_empty() {
        let detail = problems.join("; ");
        ui::error(&format!("Firewall rules not applied correctly: {detail}"));
        return Err(AppError::FirewallVerification(detail));
    }

    ui::success("Firewall rules verified: ssh (22), http (80), https (443) allowed, inbound denied");
    Ok(())
}

/// Whether `ufw status` output reports an active firewall.
pub fn is_active(status: &str) -> bool {
    status.lines().any(|l| l.trim() == "Status: active")
}

const ACTIONS: &[&str] = &["ALLOW", "DENY", "REJECT", "LIMIT"];

/// Ports opened by ALLOW rules in `ufw status numbered` output.
///
/// Each rule line is `[ n] <to> <action> [IN|OUT] <from>`. Only the first
/// token of the To column is read (`22/tcp`, `80,443/tcp`, `22 (v6)`), so
/// neither the rule index nor addresses in From count as ports.
pub fn allowed_ports(listing: &str) -> Vec<String> {
    let mut ports = Vec::new();
    for rule in listing
        .lines()
        .filter_map(|l| l.trim_start().strip_prefix('['))
        .filter_map(|l| l.split_once(']').map(|(_, rule)| rule))
    {
        let tokens: Vec<&str> = rule.split_whitespace().collect();
        let Some(action_at) = tokens.iter().position(|t| ACTIONS.contains(t)) else {
            continue;
        };
        if tokens[action_at] != "ALLOW" || action_at == 0 {
            continue;
        }
        let spec = tokens[0].split('/').next().unwrap_or_default();
        ports.extend(
            spec.split(',')
                .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
                .map(str::to_string),
        );
    }
    ports
}

/// Expected ports without an ALLOW rule in `ufw status numbered` output.
pub fn missing_ports(listing: &str) -> Vec<&'static str> {
    let allowed = allowed_ports(listing);
    FIREWALL_SERVICES
        .iter()
        .map(|(_, port)| *port)
        .filter(|port| !allowed.iter().any(|p| p == port))
        .collect()
}

/// Whether `ufw status verbose` output shows a default-deny inbound policy.
pub fn denies_incoming(verbose: &str) -> bool {
    verbose
        .lines()
        .filter_map(|l| l.trim().strip_prefix("Default:"))
        .any(|policies| policies.contains("deny (incoming)"))
}
