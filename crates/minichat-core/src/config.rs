//! Global application configuration. Load from TOML or env.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global application configuration (gateway + responder). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown in the root envelope.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// LLM mode (e.g. "mock", "live").
    pub llm_mode: String,
    /// Path to the knowledge base JSON document driving the offline responder.
    pub knowledge_path: String,
    /// System message seeded into every new conversation.
    pub system_prompt: String,
}

impl CoreConfig {
    /// Load config from file and environment.
    /// Precedence: env `MINICHAT_CONFIG` path > `config/gateway.toml` > defaults,
    /// then `MINICHAT`-prefixed environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("MINICHAT_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "Minichat Gateway")?
            .set_default("port", 10000_i64)?
            .set_default("llm_mode", "mock")?
            .set_default("knowledge_path", "config/knowledge_base.json")?
            .set_default("system_prompt", "You are a helpful assistant.")?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("MINICHAT").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_backend() {
        // No config file, no env overrides in the test environment.
        let cfg = CoreConfig::load().expect("defaults should always build");
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.llm_mode, "mock");
        assert_eq!(cfg.system_prompt, "You are a helpful assistant.");
        assert!(cfg.knowledge_path.ends_with("knowledge_base.json"));
    }
}
