//! Conversation History and the Send Flow
//!
//! Messages, the append-only conversation, and the one-at-a-time send
//! state machine: `idle -> sending -> (success | failed) -> idle`.
//!
//! # Design Philosophy
//!
//! The send is split in two so a UI surface can stay responsive:
//! [`Conversation::begin_send`] validates, appends the user message, and
//! raises the in-flight flag; [`Conversation::complete_send`] maps the
//! backend result to the reply message and always lowers the flag. The
//! composed [`Conversation::send_message`] drives both for headless use.
//! Every failure becomes a conversational assistant message; nothing here
//! returns an error to the caller.
//!
//! History lives for the lifetime of the conversation value and is never
//! persisted; a fresh mount starts from the greeting again.

use chrono::{DateTime, Local};

use crate::backend::{AskError, AskReply, AssistantBackend};
use crate::session::SessionStore;

/// Greeting shown as the first assistant message of every conversation.
pub const GREETING: &str = "Hello! I'm Sage, your knowledge assistant. Ask me anything about \
     products, documentation, or any specific topics you'd like to explore.";

/// Assistant message appended when the endpoint rejects the credential.
pub const AUTH_FAILED_REPLY: &str = "Authentication failed. Please sign in again.";

/// Assistant message substituted for a reply that carried no answer.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I couldn't process your request at the moment.";

/// Assistant message appended when the endpoint could not be reached.
#[must_use]
pub fn connection_trouble(endpoint: &str) -> String {
    format!(
        "I'm sorry, but I'm having trouble connecting to the server. \
         Please check if the API is running on {endpoint} and try again."
    )
}

/// Unique identifier for a message
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Author {
    /// The signed-in user
    User,
    /// The assistant
    Assistant,
}

/// A single conversation message. Immutable once appended.
#[derive(Clone, Debug)]
pub struct Message {
    /// Unique id, strictly increasing in creation order
    pub id: MessageId,
    /// Who wrote the message
    pub author: Author,
    /// The message text
    pub content: String,
    /// Reference links accompanying an assistant reply (empty otherwise)
    pub links: Vec<String>,
    /// Local wall-clock time the message was created
    pub sent_at: DateTime<Local>,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            author: Author::User,
            content: content.into(),
            links: Vec::new(),
            sent_at: Local::now(),
        }
    }

    /// Create an assistant message without links.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with_links(content, Vec::new())
    }

    /// Create an assistant message with reference links.
    #[must_use]
    pub fn assistant_with_links(content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            id: MessageId::new(),
            author: Author::Assistant,
            content: content.into(),
            links,
            sent_at: Local::now(),
        }
    }
}

/// Result of a completed (or refused) send
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty or another send was in flight; nothing happened
    Rejected,
    /// The reply was appended
    Succeeded,
    /// The endpoint rejected the credential; the session was torn down
    AuthRejected,
    /// The endpoint could not be reached or answered with an error
    Failed,
}

/// Append-only conversation with the one-at-a-time send state machine.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: bool,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation opened by the assistant greeting.
    #[must_use]
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            in_flight: false,
        }
    }

    /// All messages, in creation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    /// Start a send: validate the input, append the user message, and
    /// raise the in-flight flag.
    ///
    /// Returns the query to submit, or `None` when the input trims to
    /// empty or another send is in flight (in which case nothing changed).
    /// The appended content and the returned query are the raw input,
    /// whitespace intact.
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() || self.in_flight {
            return None;
        }

        self.messages.push(Message::user(input));
        self.in_flight = true;
        Some(input.to_string())
    }

    /// Finish a send: map the backend result to the reply message and
    /// lower the in-flight flag.
    ///
    /// A rejected credential appends [`AUTH_FAILED_REPLY`] and tears the
    /// session down; endpoint and transport failures append the
    /// connectivity message for `endpoint`; a reply without an answer falls
    /// back to [`FALLBACK_REPLY`]. The flag is lowered in every case.
    pub fn complete_send(
        &mut self,
        result: Result<AskReply, AskError>,
        session: &mut SessionStore,
        endpoint: &str,
    ) -> SendOutcome {
        let outcome = match result {
            Ok(reply) => {
                let content = reply
                    .answer
                    .unwrap_or_else(|| FALLBACK_REPLY.to_string());
                self.messages
                    .push(Message::assistant_with_links(content, reply.links));
                SendOutcome::Succeeded
            }
            Err(AskError::AuthRejected) => {
                tracing::info!("Assistant rejected the credential, signing out");
                self.messages.push(Message::assistant(AUTH_FAILED_REPLY));
                session.logout();
                SendOutcome::AuthRejected
            }
            Err(error) => {
                tracing::warn!(%error, "Assistant request failed");
                self.messages
                    .push(Message::assistant(connection_trouble(endpoint)));
                SendOutcome::Failed
            }
        };

        self.in_flight = false;
        outcome
    }

    /// Submit one question and wait for the reply.
    ///
    /// Composes [`Self::begin_send`] and [`Self::complete_send`] over the
    /// given backend, using the session's current credential.
    pub async fn send_message(
        &mut self,
        input: &str,
        session: &mut SessionStore,
        backend: &dyn AssistantBackend,
    ) -> SendOutcome {
        let Some(query) = self.begin_send(input) else {
            return SendOutcome::Rejected;
        };

        let credential = session.credential().unwrap_or_default().to_string();
        let result = backend.ask(&query, &credential).await;
        self.complete_send(result, session, &backend.endpoint())
    }
}
