//! TextGenerator trait definition

use async_trait::async_trait;

use super::{CompletionRequest, LlmError};

/// Stateless text generator - each call is independent
///
/// The decomposition pipeline depends only on this capability, so any
/// provider (or a scripted stub) can stand behind it.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single completion request and return the raw text
    ///
    /// Exactly one outbound attempt; the caller decides what to do on error.
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Deterministic stand-in for tests and offline runs
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// One scripted outcome of a mock call
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Text(String),
        Empty,
        Fail(String),
        Unavailable,
        /// Never resolves; exercises caller timeouts
        Hang,
    }

    /// Mock generator that replays scripted replies in order
    pub struct MockGenerator {
        replies: Vec<MockReply>,
        call_count: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl MockGenerator {
        pub fn new(replies: Vec<MockReply>) -> Self {
            debug!(reply_count = %replies.len(), "MockGenerator::new: called");
            Self {
                replies,
                call_count: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        /// Generator that always answers with the given text
        pub fn with_text(text: impl Into<String>) -> Self {
            Self::new(vec![MockReply::Text(text.into())])
        }

        /// Generator whose only call fails at the transport level
        pub fn failing(message: impl Into<String>) -> Self {
            Self::new(vec![MockReply::Fail(message.into())])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// The most recent request this mock received
        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.last_request.lock().ok().and_then(|guard| guard.clone())
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockGenerator::generate: called");
            if let Ok(mut guard) = self.last_request.lock() {
                *guard = Some(request);
            }

            let reply = self
                .replies
                .get(idx)
                .or_else(|| self.replies.last())
                .cloned()
                .ok_or_else(|| LlmError::InvalidResponse("No more mock responses".to_string()))?;

            match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Empty => Err(LlmError::Empty),
                MockReply::Fail(message) => Err(LlmError::InvalidResponse(message)),
                MockReply::Unavailable => Err(LlmError::Unavailable("mock has no credentials".to_string())),
                MockReply::Hang => {
                    std::future::pending::<()>().await;
                    Err(LlmError::Empty)
                }
            }
        }
    }

}
