//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    /// Base URL of the external face/voice recognition service.
    pub recognition_service_url: String,
    /// Hard cap on any single recognition-service call, in seconds.
    pub recognition_timeout_seconds: u64,
    /// Minimum confidence the recognition service must report for a match.
    pub face_accept_threshold: f64,
    /// MSE cutoff for the local grey-vector fallback comparison.
    pub fallback_mse_threshold: f64,
    /// Minutes of presence (per 60-minute lecture) required for PRESENT.
    pub attendance_full_threshold_minutes: i64,
    /// Minutes of presence (per 60-minute lecture) required for LATE.
    pub attendance_partial_threshold_minutes: i64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing or improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "rollcall".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "logs/api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/rollcall.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .unwrap(),
            recognition_service_url: env::var("RECOGNITION_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            recognition_timeout_seconds: env::var("RECOGNITION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .unwrap(),
            face_accept_threshold: env::var("FACE_MATCH_THRESHOLD")
                .unwrap_or_else(|_| "0.5".into())
                .parse()
                .unwrap(),
            fallback_mse_threshold: env::var("FALLBACK_MSE_THRESHOLD")
                .unwrap_or_else(|_| "600.0".into())
                .parse()
                .unwrap(),
            attendance_full_threshold_minutes: env::var("ATTENDANCE_FULL_THRESHOLD_MINUTES")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .unwrap(),
            attendance_partial_threshold_minutes: env::var("ATTENDANCE_PARTIAL_THRESHOLD_MINUTES")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
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
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
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

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_recognition_service_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.recognition_service_url = value.into());
    }

    pub fn set_recognition_timeout_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.recognition_timeout_seconds = value);
    }

    pub fn set_face_accept_threshold(value: f64) {
        AppConfig::set_field(|cfg| cfg.face_accept_threshold = value);
    }

    pub fn set_fallback_mse_threshold(value: f64) {
        AppConfig::set_field(|cfg| cfg.fallback_mse_threshold = value);
    }

    pub fn set_attendance_full_threshold_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.attendance_full_threshold_minutes = value);
    }

    pub fn set_attendance_partial_threshold_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.attendance_partial_threshold_minutes = value);
    }
}
