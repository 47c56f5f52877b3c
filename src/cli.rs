// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sdf-render")]
#[command(about = "Interactive SDF renderer with depth of field", long_about = None)]
pub struct Cli {
    /// Disable the on-screen overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also append log lines to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial depth-of-field sample count
    #[arg(long)]
    pub samples: Option<u32>,
}
