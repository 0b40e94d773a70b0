//! Assistant Backend Traits
//!
//! Trait definition for the remote knowledge-assistant service. The chat
//! flow depends only on this seam; implementations handle transport
//! details (HTTP, auth headers, reply shapes).

use async_trait::async_trait;
use thiserror::Error;

/// A parsed assistant reply.
///
/// The service answers with `{"answer": string, "url": [string, ...]}`;
/// both fields are optional in practice, so absence is represented rather
/// than treated as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AskReply {
    /// The answer text, when the reply carried one
    pub answer: Option<String>,
    /// Reference links accompanying the answer (empty when absent)
    pub links: Vec<String>,
}

/// Errors that can occur while asking the assistant
#[derive(Debug, Error)]
pub enum AskError {
    /// The endpoint rejected the bearer credential (HTTP 401)
    #[error("assistant endpoint rejected the credential")]
    AuthRejected,

    /// The endpoint answered with a non-success status other than 401
    #[error("assistant endpoint returned HTTP {status}: {body}")]
    Endpoint {
        /// The HTTP status code
        status: u16,
        /// The response body, for logs
        body: String,
    },

    /// The request never produced a usable response (connect, IO, or
    /// body-parse failure)
    #[error("failed to reach the assistant endpoint: {0}")]
    Transport(String),
}

/// Assistant backend trait
///
/// Implement this trait to answer user questions from a different source.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Human-readable endpoint this backend talks to, used in
    /// connectivity-failure messages shown to the user.
    fn endpoint(&self) -> String;

    /// Submit one question under the given bearer credential and wait for
    /// the reply.
    ///
    /// # Errors
    ///
    /// Returns [`AskError`] on rejection, endpoint failure, or transport
    /// failure. Implementations do not retry.
    async fn ask(&self, query: &str, credential: &str) -> Result<AskReply, AskError>;
}
