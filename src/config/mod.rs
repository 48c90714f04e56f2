// src/config/mod.rs
//! Process configuration. Resolved completely before any network or database work.

pub mod ai;
pub mod db;
pub mod pipeline;

pub use ai::ModelConfig;
pub use db::DbConfig;
pub use pipeline::PipelineConfig;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub db: DbConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Read from the process environment (call `dotenvy::dotenv()` first if wanted).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let model = ModelConfig::from_lookup(&get)?;
        let db = DbConfig::from_lookup(&get)?;
        let pipeline = PipelineConfig::load_with(get(pipeline::ENV_PATH))?;
        Ok(Self {
            model,
            db,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_api_key_is_reported_by_name() {
        let err = AppConfig::from_lookup(lookup(&[("DB_USER", "u"), ("DB_PASSWORD", "p")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GEMINI_API_KEY")));
    }

    #[test]
    fn blank_password_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DB_PASSWORD")));
    }

    #[test]
    fn db_defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "p"),
        ]))
        .unwrap();
        assert_eq!(cfg.db.host, db::DEFAULT_HOST);
        assert_eq!(cfg.db.port, db::DEFAULT_PORT);
        assert_eq!(cfg.db.name, db::DEFAULT_NAME);
        assert_eq!(cfg.model.model, crate::analyze::ai_adapter::DEFAULT_MODEL);
    }

    #[test]
    fn bad_port_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "p"),
            ("DB_PORT", "postgres"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_PORT", .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "super-secret"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(!dbg.contains("hunter2"));
    }
}
