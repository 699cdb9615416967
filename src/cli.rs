//! Command-line arguments

use crate::state::ThemeKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cmm-ide", version, about = "Terminal editor and runner for C-- scripts")]
pub struct Cli {
    /// Script to open (or run with --run)
    pub file: Option<PathBuf>,

    /// Colour theme
    #[arg(long, value_enum, default_value_t = ThemeKind::Light)]
    pub theme: ThemeKind,

    /// Write diagnostics to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Level for --log-file (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: LevelFilter,

    /// Run FILE against stdin/stdout without opening the editor
    #[arg(long, requires = "file")]
    pub run: bool,
}
