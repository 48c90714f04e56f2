// src/config/ai.rs
use crate::analyze::ai_adapter::DEFAULT_MODEL;
use crate::error::ConfigError;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";

#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
}

impl ModelConfig {
    pub fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;
        let model = get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self { api_key, model })
    }
}

// Never print the key itself.
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key_len", &self.api_key.len())
            .field("model", &self.model)
            .finish()
    }
}
