//! Logging configuration.
//!
//! Interactive runs log to the terminal at `debug`. Detached runs (service
//! managers, `nohup`, redirected output) log to a file at `info` without
//! ANSI colours. `RUST_LOG` overrides either default level.

use std::{
    fs::{File, OpenOptions},
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "guessbot.log";

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Console,
    File(PathBuf),
}

impl LogTarget {
    /// Console when stdout is a terminal, otherwise a file in `log_dir`
    pub fn detect(log_dir: &Path) -> Self {
        Self::choose(io::stdout().is_terminal(), log_dir)
    }

    pub fn choose(interactive: bool, log_dir: &Path) -> Self {
        if interactive {
            LogTarget::Console
        } else {
            LogTarget::File(log_dir.join(LOG_FILE_NAME))
        }
    }

    fn default_directive(&self) -> &'static str {
        match self {
            LogTarget::Console => "debug",
            LogTarget::File(_) => "info",
        }
    }
}

/// Open the log file for appending, creating it and its directory
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging for `target`. Records from the `log` facade used by
/// the moderator library are collected as well.
///
/// # Example
///
/// ```no_run
/// use gm_bot::logging::{self, LogTarget};
/// use std::path::Path;
///
/// logging::init(&LogTarget::detect(Path::new("."))).unwrap();
/// tracing::info!("Bot starting");
/// ```
pub fn init(target: &LogTarget) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(target.default_directive()));

    match target {
        LogTarget::Console => {
            // stdout belongs to the console chat transport
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }

    tracing::info!("Logging initialized ({target:?})");
    Ok(())
}

/// Echo a received chat line, used in live mode
pub fn log_chat_line(channel: &str, author: &str, text: &str) {
    tracing::info!(channel = channel, author = author, "Received {author}: {text}");
}
