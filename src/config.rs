use std::env;
use std::path::PathBuf;

pub const DEFAULT_STORE_PATH: &str = "disaster-risk-store.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MIN_HISTORY_RECORDS: usize = 10;

/// Application context. Built once in `main` and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; when absent the JSON file store is used
    pub database_url: Option<String>,
    /// Location of the JSON document used by the file store
    pub store_path: PathBuf,
    /// Key attached to simulated live readings
    pub weather_api_key: Option<String>,
    pub max_upload_bytes: u64,
    pub min_history_records: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            weather_api_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            min_history_records: DEFAULT_MIN_HISTORY_RECORDS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` (optional): Postgres connection string
    /// - `DISASTER_RISK_STORE` (optional, default: `disaster-risk-store.json`)
    /// - `WEATHER_API_KEY` (optional)
    /// - `DISASTER_RISK_MAX_UPLOAD_BYTES` (optional, default: 10 MiB)
    /// - `DISASTER_RISK_MIN_RECORDS` (optional, default: 10)
    pub fn from_env() -> Result<Self, String> {
        let defaults = AppConfig::default();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        let store_path = env::var("DISASTER_RISK_STORE")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);
        let weather_api_key = env::var("WEATHER_API_KEY").ok().filter(|v| !v.is_empty());
        let max_upload_bytes = match env::var("DISASTER_RISK_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| "DISASTER_RISK_MAX_UPLOAD_BYTES must be a byte count".to_string())?,
            Err(_) => defaults.max_upload_bytes,
        };
        let min_history_records = match env::var("DISASTER_RISK_MIN_RECORDS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| "DISASTER_RISK_MIN_RECORDS must be a positive integer".to_string())?,
            Err(_) => defaults.min_history_records,
        };

        Ok(AppConfig {
            database_url,
            store_path,
            weather_api_key,
            max_upload_bytes,
            min_history_records,
        })
    }

    pub fn import_limits(&self) -> ImportLimits {
        ImportLimits {
            max_bytes: self.max_upload_bytes,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            min_history_records: self.min_history_records,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImportLimits {
    pub max_bytes: u64,
}

impl Default for ImportLimits {
    fn default() -> Self {
        ImportLimits {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub min_history_records: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            min_history_records: DEFAULT_MIN_HISTORY_RECORDS,
        }
    }
}
