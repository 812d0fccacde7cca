//! # toolgraph-runtime
//!
//! Runtime providers for toolgraph.
//!
//! ## Providers
//!
//! - **DeepSeek** (default): OpenAI-compatible chat completions over HTTPS.
//!   Any endpoint speaking the same protocol works by changing the base URL.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use toolgraph_runtime::DeepSeekProvider;
//!
//! let provider = DeepSeekProvider::from_env()?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

pub mod deepseek;

pub use deepseek::{parse_var, DeepSeekConfig, DeepSeekProvider};

// Re-export core types for convenience
pub use toolgraph_core::{
    Agent, AgentBuilder, AgentError, LlmProvider, Result, Tool, ToolRegistry,
};
