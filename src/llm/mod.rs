//! Text-generation boundary for assignplan
//!
//! The pipeline talks to the outside world only through [`TextGenerator`].

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::TextGenerator;
pub use client::mock::{MockGenerator, MockReply};
pub use error::LlmError;
pub use types::{CompletionRequest, Message, Role};

use crate::config::LlmConfig;

/// Create a generator based on the provider specified in config
///
/// A missing credential or unknown provider is reported as
/// [`LlmError::Unavailable`].
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient::from_config(config)?)),
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Unavailable(format!(
                "Unknown LLM provider: '{}'. Supported: anthropic",
                other
            )))
        }
    }
}
