//! Engine configuration from `GAT_`-prefixed environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::use_cases::data_collection::{DataCollectionSettings, DeploymentMode};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE: &str = "data_collection.db";
const DEFAULT_WORKSPACE_DIR: &str = "workspace";
const DEFAULT_EXPERIMENT_DIR: &str = "experiments";
const DEFAULT_SESSION_LOG_DIR: &str = "output/domainSessions";
const DEFAULT_EXPORT_DIR: &str = "export";
const DEFAULT_MAX_PARTICIPANT_DATA_SIZE_MB: u64 = 1024;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub workspace_dir: PathBuf,
    /// Root of the course copies made for legacy data sets
    pub experiment_dir: PathBuf,
    pub session_log_dir: PathBuf,
    pub export_dir: PathBuf,
    pub data_collection: DataCollectionSettings,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            server_host: get("GAT_SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            server_port: parsed(&get, "GAT_SERVER_PORT", DEFAULT_PORT),
            database_path: get("GAT_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.into()),
            workspace_dir: get("GAT_WORKSPACE_DIR")
                .unwrap_or_else(|| DEFAULT_WORKSPACE_DIR.into())
                .into(),
            experiment_dir: get("GAT_EXPERIMENT_DIR")
                .unwrap_or_else(|| DEFAULT_EXPERIMENT_DIR.into())
                .into(),
            session_log_dir: get("GAT_SESSION_LOG_DIR")
                .unwrap_or_else(|| DEFAULT_SESSION_LOG_DIR.into())
                .into(),
            export_dir: get("GAT_EXPORT_DIR")
                .unwrap_or_else(|| DEFAULT_EXPORT_DIR.into())
                .into(),
            data_collection: DataCollectionSettings {
                deployment_mode: parsed(&get, "GAT_DEPLOYMENT_MODE", DeploymentMode::Desktop),
                max_participant_data_size_mb: parsed(
                    &get,
                    "GAT_MAX_PARTICIPANT_DATA_SIZE_MB",
                    DEFAULT_MAX_PARTICIPANT_DATA_SIZE_MB,
                ),
            },
        }
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(val) = get(key) else {
        return default;
    };
    match val.parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, val = %val, error = %e, "Invalid configuration value, using default");
            default
        }
    }
}
