use std::env;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::schedule::TotalSlotsPolicy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AUTH_TOKEN: &str = "changeme";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub auth_token: String,
    /// JSON file backing the store; in-memory when unset
    pub data_path: Option<PathBuf>,
    pub total_policy: TotalSlotsPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            data_path: None,
            total_policy: TotalSlotsPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the
    /// process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("SCHEDULE_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("SCHEDULE_PORT must be a port number, got {:?}", raw)))?,
            None => DEFAULT_PORT,
        };

        let auth_token = lookup("SCHEDULE_AUTH_TOKEN").unwrap_or_else(|| DEFAULT_AUTH_TOKEN.to_string());
        if auth_token.trim().is_empty() {
            return Err(AppError::Config("SCHEDULE_AUTH_TOKEN must not be empty".to_string()));
        }

        let data_path = lookup("SCHEDULE_DATA_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let total_policy = match lookup("SCHEDULE_TOTAL_POLICY") {
            Some(raw) => raw.parse::<TotalSlotsPolicy>().map_err(AppError::Config)?,
            None => TotalSlotsPolicy::default(),
        };

        Ok(Self {
            port,
            auth_token,
            data_path,
            total_policy,
        })
    }

    pub fn uses_default_token(&self) -> bool {
        self.auth_token == DEFAULT_AUTH_TOKEN
    }
}
