//! Assistant Backend Integration
//!
//! This module provides abstracted access to the remote knowledge-assistant
//! service through a common trait interface, so the chat flow can be driven
//! against the real HTTP endpoint or a test double.
//!
//! # Usage
//!
//! ```ignore
//! use sage_core::backend::{AssistantBackend, RemoteAssistant};
//!
//! let backend = RemoteAssistant::new("http://127.0.0.1:8000");
//! let reply = backend.ask("What is Sage?", credential).await?;
//! ```

mod remote;
mod traits;

pub use remote::RemoteAssistant;
pub use traits::{AskError, AskReply, AssistantBackend};
