use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config;

const FILTER_ENV: &str = "TTTUI_LOG";

/// Send `tracing` output to `<config dir>/tttui/tttui.log`.
///
/// The prompts own the terminal, so nothing is ever written to stdout or
/// stderr. If the log file cannot be opened logging stays off.
pub fn init() {
    let Ok(dir) = config::root_path() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tttui.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
