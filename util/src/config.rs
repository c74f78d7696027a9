//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub host: String,
    pub port: u16,
    pub servers_config: String,
    pub data_dir: String,
    pub poll_interval_minutes: u64,
    pub ssh_username: Option<String>,
    pub ssh_key_path: Option<String>,
    pub ssh_program: String,
    pub ssh_connect_timeout_secs: u64,
    pub ssh_session_timeout_secs: u64,
    pub gpu_data_rate_limit: u32,
    pub gpu_data_rate_window_ms: u64,
    pub views_throttle_ms: u64,
    pub agent_host: String,
    pub agent_port: u16,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every key has a default, so this never panics. Numeric keys that fail
    /// to parse fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "gpu-monitor".into()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "api=info,telemetry=info,agent=info".into()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "collector.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parsed("PORT", 3001),
            servers_config: env::var("SERVERS_CONFIG").unwrap_or_else(|_| "config.json".into()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            poll_interval_minutes: parsed("POLL_INTERVAL_MINUTES", 10),
            ssh_username: optional("SSH_USERNAME"),
            ssh_key_path: optional("SSH_KEY_PATH"),
            ssh_program: env::var("SSH_PROGRAM").unwrap_or_else(|_| "ssh".into()),
            ssh_connect_timeout_secs: parsed("SSH_CONNECT_TIMEOUT_SECS", 5),
            ssh_session_timeout_secs: parsed("SSH_SESSION_TIMEOUT_SECS", 15),
            gpu_data_rate_limit: parsed("GPU_DATA_RATE_LIMIT", 100),
            gpu_data_rate_window_ms: parsed("GPU_DATA_RATE_WINDOW_MS", 5000),
            views_throttle_ms: parsed("VIEWS_THROTTLE_MS", 3000),
            agent_host: env::var("AGENT_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            agent_port: parsed("AGENT_PORT", 3000),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_servers_config(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.servers_config = value.into());
    }

    pub fn set_data_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.data_dir = value.into());
    }

    pub fn set_log_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_dir = value.into());
    }

    pub fn set_ssh_program(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.ssh_program = value.into());
    }

    pub fn set_gpu_data_rate_limit(value: u32) {
        AppConfig::set_field(|cfg| cfg.gpu_data_rate_limit = value);
    }

    pub fn set_views_throttle_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.views_throttle_ms = value);
    }
}

// --- Free accessors, mirroring the field names ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_dir() -> String {
    AppConfig::global().log_dir.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn servers_config() -> String {
    AppConfig::global().servers_config.clone()
}

pub fn data_dir() -> String {
    AppConfig::global().data_dir.clone()
}

pub fn poll_interval_minutes() -> u64 {
    AppConfig::global().poll_interval_minutes
}

pub fn ssh_username() -> Option<String> {
    AppConfig::global().ssh_username.clone()
}

pub fn ssh_key_path() -> Option<String> {
    AppConfig::global().ssh_key_path.clone()
}

pub fn ssh_program() -> String {
    AppConfig::global().ssh_program.clone()
}

pub fn ssh_connect_timeout_secs() -> u64 {
    AppConfig::global().ssh_connect_timeout_secs
}

pub fn ssh_session_timeout_secs() -> u64 {
    AppConfig::global().ssh_session_timeout_secs
}

pub fn gpu_data_rate_limit() -> u32 {
    AppConfig::global().gpu_data_rate_limit
}

pub fn gpu_data_rate_window_ms() -> u64 {
    AppConfig::global().gpu_data_rate_window_ms
}

pub fn views_throttle_ms() -> u64 {
    AppConfig::global().views_throttle_ms
}

pub fn agent_host() -> String {
    AppConfig::global().agent_host.clone()
}

pub fn agent_port() -> u16 {
    AppConfig::global().agent_port
}
