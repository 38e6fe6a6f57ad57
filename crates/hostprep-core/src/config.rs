use crate::error::AppError;
use std::path::PathBuf;

/// nvm release fetched by the runtime version manager step.
pub const NVM_VERSION: &str = "v0.39.7";

/// Search path used when neither `--path` nor `PATH` is available.
pub const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Command-line tools every host gets, in install order.
pub const BASELINE_TOOLS: &[&str] = &["curl", "wget", "git"];

/// Directories appended to the search path for system-scope presence
/// checks; non-root `PATH`s on Debian omit them.
pub const SBIN_DIRS: &str = "/usr/local/sbin:/usr/sbin:/sbin";

/// Services opened in the firewall, paired with the port identifier that
/// must show up in the rule listing afterwards.
pub const FIREWALL_SERVICES: &[(&str, &str)] = &[("ssh", "22"), ("http", "80"), ("https", "443")];

/// Conventional home directory of `user`.
pub fn default_home(user: &str) -> PathBuf {
    if user == "root" {
        PathBuf::from("/root")
    } else {
        PathBuf::from("/home").join(user)
    }
}

/// Everything the pipeline needs to know about the invoking user and host.
///
/// These values used to be read straight from the environment; they are now
/// explicit inputs so a remote host can be provisioned for a named user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// User added to the docker group and owning the pm2 boot service.
    pub user: String,
    pub home: PathBuf,
    /// Search path handed to every command and to the pm2 startup entry.
    pub path: String,
    pub nvm_version: String,
    /// Prefix privileged commands with `sudo`.
    pub sudo: bool,
    /// Run user-scoped commands (nvm, npm, pm2 save) through `su - <user>`
    /// because the effective user is someone else.
    pub switch_user: bool,
}

impl ProvisionConfig {
    /// Resolve from explicit values, falling back to the process environment.
    pub fn resolve(
        user: Option<String>,
        home: Option<PathBuf>,
        path: Option<String>,
    ) -> Result<Self, AppError> {
        Self::resolve_with(user, home, path, |key| std::env::var(key).ok())
    }

    /// Same as [`resolve`](Self::resolve) with a custom environment lookup.
    pub fn resolve_with<F>(
        user: Option<String>,
        home: Option<PathBuf>,
        path: Option<String>,
        lookup: F,
    ) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let user = non_empty(user)
            .or_else(|| non_empty(lookup("SUDO_USER")))
            .or_else(|| non_empty(lookup("USER")))
            .ok_or(AppError::UserNotFound)?;

        // `USER` is the effective user; under sudo it is root while
        // SUDO_USER names the invoking user, and HOME may be root's.
        let switch_user = non_empty(lookup("USER")).as_deref() != Some(user.as_str());

        let home = match home.filter(|h| !h.as_os_str().is_empty()) {
            Some(h) => h,
            None if switch_user => default_home(&user),
            None => non_empty(lookup("HOME"))
                .map(PathBuf::from)
                .or_else(dirs::home_dir)
                .ok_or(AppError::HomeDirNotFound)?,
        };

        let path = non_empty(path)
            .or_else(|| non_empty(lookup("PATH")))
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        Ok(Self {
            user,
            home,
            path,
            nvm_version: NVM_VERSION.to_string(),
            sudo: false,
            switch_user,
        })
    }

    /// `<home>/.nvm`
    pub fn nvm_dir(&self) -> PathBuf {
        self.home.join(".nvm")
    }

    /// `"sudo "` when privileged commands need elevation, otherwise empty.
    pub fn sudo_prefix(&self) -> &'static str {
        if self.sudo {
            "sudo "
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn explicit_values_win() {
        let cfg = ProvisionConfig::resolve_with(
            Some("deploy".into()),
            Some(PathBuf::from("/srv/deploy")),
            Some("/opt/bin:/usr/bin".into()),
            env(&[("SUDO_USER", "alice"), ("HOME", "/root"), ("PATH", "/bin")]),
        )
        .unwrap();
        assert_eq!(cfg.user, "deploy");
        assert_eq!(cfg.home, PathBuf::from("/srv/deploy"));
        assert_eq!(cfg.path, "/opt/bin:/usr/bin");
        assert_eq!(cfg.nvm_version, NVM_VERSION);
        assert!(!cfg.sudo);
    }

    #[test]
    fn sudo_user_takes_precedence_over_user() {
        let cfg = ProvisionConfig::resolve_with(
            None,
            None,
            None,
            env(&[("SUDO_USER", "alice"), ("USER", "root"), ("HOME", "/home/alice")]),
        )
        .unwrap();
        assert_eq!(cfg.user, "alice");
        assert_eq!(cfg.home, PathBuf::from("/home/alice"));
        assert!(cfg.switch_user);
    }

    #[test]
    fn sudo_home_is_derived_from_invoking_user() {
        let cfg = ProvisionConfig::resolve_with(
            None,
            None,
            None,
            env(&[("SUDO_USER", "alice"), ("USER", "root"), ("HOME", "/root")]),
        )
        .unwrap();
        assert_eq!(cfg.user, "alice");
        assert_eq!(cfg.home, PathBuf::from("/home/alice"));
        assert!(cfg.switch_user);
    }

    #[test]
    fn same_user_keeps_home_and_does_not_switch() {
        let cfg = ProvisionConfig::resolve_with(
            None,
            None,
            None,
            env(&[("USER", "ops"), ("HOME", "/srv/ops")]),
        )
        .unwrap();
        assert_eq!(cfg.home, PathBuf::from("/srv/ops"));
        assert!(!cfg.switch_user);
    }

    #[test]
    fn root_default_home() {
        assert_eq!(default_home("root"), PathBuf::from("/root"));
        assert_eq!(default_home("deploy"), PathBuf::from("/home/deploy"));
    }

    #[test]
    fn falls_back_to_user_and_default_path() {
        let cfg = ProvisionConfig::resolve_with(
            None,
            None,
            None,
            env(&[("USER", "ubuntu"), ("HOME", "/home/ubuntu"), ("SUDO_USER", "")]),
        )
        .unwrap();
        assert_eq!(cfg.user, "ubuntu");
        assert_eq!(cfg.path, DEFAULT_PATH);
    }

    #[test]
    fn missing_user_is_an_error() {
        let err = ProvisionConfig::resolve_with(None, None, None, env(&[("HOME", "/root")]))
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[test]
    fn nvm_dir_and_sudo_prefix() {
        let mut cfg = ProvisionConfig::resolve_with(
            Some("ops".into()),
            Some(PathBuf::from("/home/ops")),
            None,
            env(&[]),
        )
        .unwrap();
        assert_eq!(cfg.nvm_dir(), PathBuf::from("/home/ops/.nvm"));
        assert_eq!(cfg.sudo_prefix(), "");
        cfg.sudo = true;
        assert_eq!(cfg.sudo_prefix(), "sudo ");
    }
}
