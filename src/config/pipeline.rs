// src/config/pipeline.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::signal::LOCATION_MAX_CHARS;

pub const ENV_PATH: &str = "INGEST_CONFIG_PATH";
pub const DEFAULT_PATH: &str = "config/ingest.toml";

pub const DEFAULT_FEED_URL: &str =
    "https://portal.who.int/eios/API/News/Monitoring/getBoardRssFeed?queryId=1693";

/// Non-secret settings of one ingestion run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub reports_path: PathBuf,
    pub feed_url: String,
    pub request_delay_secs: u64,
    pub model_timeout_secs: u64,
    pub feed_timeout_secs: u64,
    pub db_statement_timeout_secs: u64,
    pub signal_table: String,
    pub location_max_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reports_path: PathBuf::from("gds-json-exemplos.json"),
            feed_url: DEFAULT_FEED_URL.to_string(),
            request_delay_secs: 10,
            model_timeout_secs: 60,
            feed_timeout_secs: 30,
            db_statement_timeout_secs: 30,
            signal_table: "sinal".to_string(),
            location_max_chars: LOCATION_MAX_CHARS,
        }
    }
}

impl PipelineConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
    pub fn db_statement_timeout(&self) -> Duration {
        Duration::from_secs(self.db_statement_timeout_secs)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: PipelineConfig = toml::from_str(s).map_err(|e| ConfigError::Invalid {
            key: "pipeline config",
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the settings file:
    /// 1) `$INGEST_CONFIG_PATH` (must exist)
    /// 2) `config/ingest.toml` if present
    /// 3) built-in defaults
    pub fn load_with(explicit: Option<String>) -> Result<Self, ConfigError> {
        if let Some(p) = explicit {
            return Self::load_from(Path::new(&p));
        }
        let default = Path::new(DEFAULT_PATH);
        if default.exists() {
            return Self::load_from(default);
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_plain_identifier(&self.signal_table) {
            return Err(ConfigError::Invalid {
                key: "signal_table",
                reason: format!("{:?} is not a plain SQL identifier", self.signal_table),
            });
        }
        if self.location_max_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "location_max_chars",
                reason: "must be positive".into(),
            });
        }
        if !(self.feed_url.starts_with("http://") || self.feed_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "feed_url",
                reason: format!("{:?} is not an http(s) URL", self.feed_url),
            });
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, optionally schema-qualified once.
fn is_plain_identifier(s: &str) -> bool {
    let part_ok = |p: &str| {
        let mut chars = p.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    match s.split_once('.') {
        Some((schema, table)) => part_ok(schema) && part_ok(table),
        None => part_ok(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
request_delay_secs = 2
signal_table = "public.sinais_dois"
"#,
        )
        .unwrap();
        assert_eq!(cfg.request_delay(), Duration::from_secs(2));
        assert_eq!(cfg.signal_table, "public.sinais_dois");
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
        assert_eq!(cfg.location_max_chars, LOCATION_MAX_CHARS);
    }

    #[test]
    fn rejects_injectable_table_name() {
        let err = PipelineConfig::from_toml_str(r#"signal_table = "sinal; DROP TABLE x""#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "signal_table", .. }));
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(PipelineConfig::from_toml_str("delay = 3").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = PipelineConfig::load_with(Some("/nonexistent/ingest.toml".into())).unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }
}
