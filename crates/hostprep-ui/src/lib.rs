//! Log lines for the provisioning pipeline.
//!
//! Every line goes to stdout as `[timestamp] [LEVEL] message`. The level tag
//! is colored when stdout is a terminal; `console` drops the escapes
//! otherwise, so piped output stays plain.

use chrono::{DateTime, Local, TimeZone};
use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Render one log line without printing it.
pub fn format_line<Tz: TimeZone>(level: Level, at: &DateTime<Tz>, msg: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let tag = format!("[{}]", level.tag());
    let tag = match level {
        Level::Info => style(tag).blue(),
        Level::Success => style(tag).green(),
        Level::Warn => style(tag).yellow(),
        Level::Error => style(tag).red().bold(),
    };
    format!("[{}] {tag} {msg}", at.format("%Y-%m-%d %H:%M:%S"))
}

pub fn log(level: Level, msg: &str) {
    println!("{}", format_line(level, &Local::now(), msg));
}

pub fn info(msg: &str) {
    log(Level::Info, msg);
}

pub fn success(msg: &str) {
    log(Level::Success, msg);
}

pub fn warn(msg: &str) {
    log(Level::Warn, msg);
}

pub fn error(msg: &str) {
    log(Level::Error, msg);
}

/// Print a step heading, e.g. `[Step 3/9] Installing nvm...`.
pub fn step(index: usize, total: usize, title: &str) {
    println!();
    info(&format!(
        "{} {title}",
        style(format!("[Step {index}/{total}]")).cyan().bold()
    ));
}
