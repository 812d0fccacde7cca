//! Server configuration from the environment

use std::path::PathBuf;

use toolgraph_core::DEFAULT_MAX_CYCLES;
use toolgraph_runtime::{parse_var, DeepSeekConfig};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_cycles: usize,
    /// JSON prompt template replacing the built-in Chinese one
    pub prompt_file: Option<PathBuf>,
    pub deepseek: DeepSeekConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            max_cycles: parse_var(&lookup, "AGENT_MAX_CYCLES", DEFAULT_MAX_CYCLES),
            prompt_file: lookup("AGENT_PROMPT_FILE").map(PathBuf::from),
            deepseek: DeepSeekConfig::from_lookup(&lookup),
        }
    }
}
