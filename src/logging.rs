use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::Level;

/// Default filter when neither the config nor `RUST_LOG` set one
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax, e.g. `"sdf_render=debug"`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub log_file: Option<PathBuf>,
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are no-ops.
///
/// Lines go to stderr and, when configured, are appended to the log file.
pub fn init(config: LoggingConfig) -> Result<()> {
    let file = match &config.log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?,
        ),
        None => None,
    };

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.parse_filters(DEFAULT_FILTER);
        }

        let file = file.map(Mutex::new);
        builder.format(move |buf, record| {
            let line = format_line(Local::now(), record.level(), &record.args().to_string());
            if let Some(file) = &file {
                write_to_file(file, &line);
            }
            writeln!(buf, "{line}")
        });

        // Another logger may already be installed (tests, embedding)
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });

    Ok(())
}

/// `[2024-01-31 12:00:00]  STATUS: message`
pub fn format_line(time: DateTime<Local>, level: Level, message: &str) -> String {
    format!("[{}] {:>7}: {}", time.format("%Y-%m-%d %X"), level_label(level), message)
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "STATUS",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn write_to_file(file: &Mutex<File>, line: &str) {
    if let Ok(mut file) = file.lock() {
        // A failing log file must not take the renderer down
        let _ = writeln!(file, "{line}");
    }
}
