use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{step} failed with exit status {status}: {stderr}")]
    StepFailed {
        step: String,
        status: i32,
        stderr: String,
    },

    #[error("{0} not found in PATH")]
    NotInPath(String),

    #[error("Firewall verification failed: {0}")]
    FirewallVerification(String),

    #[error("Could not determine the invoking user (set --user or SUDO_USER)")]
    UserNotFound,

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("No shell available to run commands: {0}")]
    ShellNotFound(String),

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
