// src/config/db.rs
use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5433;
pub const DEFAULT_NAME: &str = "vigimanaus";

#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = get("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
        let password = get("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;
        let port = match get("DB_PORT") {
            Some(p) => p.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "DB_PORT",
                reason: format!("{p:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            host: get("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            name: get("DB_NAME").unwrap_or_else(|| DEFAULT_NAME.to_string()),
            user,
            password,
        })
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
