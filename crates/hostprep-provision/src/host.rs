use async_trait::async_trait;
use hostprep_core::{AppError, CommandOutput};
use std::path::PathBuf;
use std::process::Stdio;

/// A machine the pipeline can run shell scripts on.
#[async_trait]
pub trait Host: Send + Sync {
    /// Run `script` under bash and capture its output. A non-zero exit is
    /// reported through [`CommandOutput::status`], not as an error.
    async fn run(&self, script: &str) -> Result<CommandOutput, AppError>;

    /// Human-readable name for log lines.
    fn describe(&self) -> String;
}

/// The machine hostprep itself runs on.
pub struct LocalHost {
    shell: PathBuf,
    path: String,
}

impl LocalHost {
    /// Locate bash and export `path` as `PATH` to every command.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let cwd = std::env::current_dir()?;
        let shell = which::which_in("bash", Some(path), cwd)
            .or_else(|_| which::which("bash"))
            .map_err(|e| AppError::ShellNotFound(e.to_string()))?;
        Ok(Self {
            shell,
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl Host for LocalHost {
    async fn run(&self, script: &str) -> Result<CommandOutput, AppError> {
        let output = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .env("PATH", &self.path)
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn describe(&self) -> String {
        "local host".into()
    }
}

/// A remote machine reached over SSH as root.
pub struct SshHost {
    ip: String,
    key: PathBuf,
}

impl SshHost {
    pub fn new(ip: impl Into<String>, key: impl Into<PathBuf>) -> Self {
        Self {
            ip: ip.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl Host for SshHost {
    async fn run(&self, script: &str) -> Result<CommandOutput, AppError> {
        let ip = self.ip.clone();
        let key = self.key.clone();
        let script = script.to_string();
        tokio::task::spawn_blocking(move || hostprep_ssh::exec(&ip, &key, &script))
            .await
            .map_err(|e| AppError::Ssh(format!("spawn_blocking join: {e}")))?
    }

    fn describe(&self) -> String {
        format!("root@{}", self.ip)
    }
}
