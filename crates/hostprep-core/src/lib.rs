pub mod config;
pub mod error;
pub mod output;

pub use config::ProvisionConfig;
pub use error::AppError;
pub use output::CommandOutput;
