use crate::config;
use std::{fs, io, path::PathBuf};

/// Resolves a possibly relative path against the current directory.
fn absolute(p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// Data directory (absolute), from `config::data_dir()`.
pub fn data_dir() -> PathBuf {
    absolute(PathBuf::from(config::data_dir()))
}

/// Log directory (absolute), from `config::log_dir()`.
pub fn log_dir() -> PathBuf {
    absolute(PathBuf::from(config::log_dir()))
}

/// Creates the log directory if needed and returns it.
pub fn ensure_log_dir() -> io::Result<PathBuf> {
    let dir = log_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Host list file (absolute), from `config::servers_config()`.
pub fn servers_config_path() -> PathBuf {
    absolute(PathBuf::from(config::servers_config()))
}

/// {DATA_DIR}/views.json
pub fn views_path() -> PathBuf {
    data_dir().join("views.json")
}
