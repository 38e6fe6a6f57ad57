//! Scripted stand-in for a Debian host: tracks installed tools and ufw state
//! from the commands it receives.

use crate::host::Host;
use async_trait::async_trait;
use hostprep_core::{AppError, CommandOutput, ProvisionConfig};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Command fragments that install a tool.
const INSTALLS: &[(&str, &str)] = &[
    ("apt-get install -y curl", "curl"),
    ("apt-get install -y wget", "wget"),
    ("apt-get install -y git", "git"),
    ("nvm-sh/nvm/", "nvm"),
    ("nvm install --lts", "node"),
    ("npm install -g yarn", "yarn"),
    ("docker-ce", "docker"),
    ("apt-get install -y nginx", "nginx"),
    ("npm install -g pm2", "pm2"),
    ("apt-get install -y ufw", "ufw"),
];

pub fn test_config() -> ProvisionConfig {
    ProvisionConfig::resolve_with(
        Some("deploy".into()),
        Some(PathBuf::from("/home/deploy")),
        Some("/usr/local/bin:/usr/bin:/bin".into()),
        |_| None,
    )
    .unwrap()
}

#[derive(Default)]
struct State {
    installed: HashSet<String>,
    commands: Vec<String>,
    ufw_active: bool,
    default_incoming: String,
    rules: Vec<String>,
}

#[derive(Default)]
pub struct FakeHost {
    state: Mutex<State>,
    fail_on: Option<String>,
    ignore: Option<String>,
    hidden: HashSet<String>,
}

fn ok(stdout: impl Into<String>) -> Result<CommandOutput, AppError> {
    Ok(CommandOutput {
        status: 0,
        stdout: stdout.into(),
        stderr: String::new(),
    })
}

fn fail(status: i32, stderr: &str) -> Result<CommandOutput, AppError> {
    Ok(CommandOutput {
        status,
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

impl FakeHost {
    /// Nothing installed, firewall inactive with no rules.
    pub fn fresh() -> Self {
        let host = Self::default();
        host.state.lock().unwrap().default_incoming = "allow".into();
        host
    }

    pub fn with_installed(tools: &[&str]) -> Self {
        let host = Self::fresh();
        host.state
            .lock()
            .unwrap()
            .installed
            .extend(tools.iter().map(|t| t.to_string()));
        host
    }

    /// Firewall already enabled with default-deny inbound.
    pub fn with_active_firewall(self) -> Self {
        {
            let mut st = self.state.lock().unwrap();
            st.ufw_active = true;
            st.default_incoming = "deny".into();
        }
        self
    }

    /// Commands containing `pattern` exit with status 100.
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    /// Commands containing `pattern` succeed without any effect.
    pub fn ignoring(mut self, pattern: &str) -> Self {
        self.ignore = Some(pattern.to_string());
        self
    }

    /// `tool` installs but never becomes resolvable.
    pub fn hiding(mut self, tool: &str) -> Self {
        self.hidden.insert(tool.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn ran(&self, pattern: &str) -> bool {
        self.commands().iter().any(|c| c.contains(pattern))
    }

    pub fn is_installed(&self, tool: &str) -> bool {
        self.state.lock().unwrap().installed.contains(tool)
    }

    pub fn ufw_active(&self) -> bool {
        self.state.lock().unwrap().ufw_active
    }

    pub fn default_incoming(&self) -> String {
        self.state.lock().unwrap().default_incoming.clone()
    }

    pub fn firewall_rules(&self) -> Vec<String> {
        self.state.lock().unwrap().rules.clone()
    }

    fn ufw(&self, st: &mut State, args: &str) -> Result<CommandOutput, AppError> {
        let status_line = if st.ufw_active {
            "Status: active"
        } else {
            "Status: inactive"
        };
        match args {
            "status" => ok(format!("{status_line}\n")),
            "status numbered" => {
                let mut out = format!("{status_line}\n\n     To    Action    From\n");
                if st.ufw_active {
                    for (i, rule) in st.rules.iter().enumerate() {
                        out.push_str(&format!("[{:>2}] {rule}    ALLOW IN    Anywhere\n", i + 1));
                    }
                }
                ok(out)
            }
            "status verbose" => ok(format!(
                "{status_line}\nDefault: {} (incoming), allow (outgoing), disabled (routed)\n",
                st.default_incoming
            )),
            "default deny incoming" => {
                st.default_incoming = "deny".into();
                ok("Default incoming policy changed to 'deny'\n")
            }
            "default allow outgoing" => ok("Default outgoing policy changed to 'allow'\n"),
            "--force enable" => {
                st.ufw_active = true;
                ok("Firewall is active and enabled on system startup\n")
            }
            other => {
                let port = match other.strip_prefix("allow ") {
                    Some("ssh") => "22/tcp",
                    Some("http") => "80/tcp",
                    Some("https") => "443/tcp",
                    _ => return fail(1, &format!("ERROR: unsupported ufw command: {other}")),
                };
                if st.rules.iter().any(|r| r == port) {
                    return ok("Skipping adding existing rule\n");
                }
                st.rules.push(port.to_string());
                ok("Rule added\n")
            }
        }
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn run(&self, script: &str) -> Result<CommandOutput, AppError> {
        let mut st = self.state.lock().unwrap();
        st.commands.push(script.to_string());

        if self.fail_on.as_deref().is_some_and(|p| script.contains(p)) {
            return fail(100, "simulated failure");
        }
        if self.ignore.as_deref().is_some_and(|p| script.contains(p)) {
            return ok("");
        }

        // User-scoped scripts arrive wrapped as `su - <user> -c '<script>'`.
        let inner = script.trim_end_matches('\'');

        if let Some((_, tool)) = inner.rsplit_once("command -v ") {
            let tool = tool.trim();
            if st.installed.contains(tool) && !self.hidden.contains(tool) {
                return ok(format!("/usr/bin/{tool}\n"));
            }
            return fail(1, "");
        }

        let bare = script.strip_prefix("sudo ").unwrap_or(script);
        if let Some(args) = bare.strip_prefix("ufw ") {
            return self.ufw(&mut st, args);
        }

        for (pattern, tool) in INSTALLS {
            if script.contains(pattern) {
                st.installed.insert(tool.to_string());
            }
        }

        if inner.ends_with("--version") {
            return ok("1.0.0\n");
        }
        ok("")
    }

    fn describe(&self) -> String {
        "fake host".into()
    }
}
