//! Sage Core - Headless Session and Chat Logic for Sage
//!
//! This crate provides the core logic for Sage, a chat front-end for a
//! remote knowledge-assistant service, completely independent of any UI
//! framework. It can drive a TUI, web UI, native GUI, or run headless for
//! testing/automation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                           │
//! │        ┌──────────────┐          ┌────────────────────┐      │
//! │        │ Sign-In View │          │     Chat View      │      │
//! │        └──────┬───────┘          └─────────┬──────────┘      │
//! │               │                            │                 │
//! └───────────────┼────────────────────────────┼─────────────────┘
//!                 │                            │
//! ┌───────────────┼────────────────────────────┼─────────────────┐
//! │               │        SAGE CORE           │                 │
//! │     ┌─────────┴────────┐         ┌─────────┴──────────┐      │
//! │     │ IdentityProvider │         │    Conversation    │      │
//! │     └─────────┬────────┘         └─────────┬──────────┘      │
//! │     ┌─────────┴────────┐         ┌─────────┴──────────┐      │
//! │     │   SessionStore   │◄────────│  AssistantBackend  │      │
//! │     └─────────┬────────┘         └────────────────────┘      │
//! │     ┌─────────┴────────┐                                     │
//! │     │     Storage      │                                     │
//! │     └──────────────────┘                                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SessionStore`]: Owns the authenticated identity and credential
//! - [`IdentityProvider`]: Capability interface over the sign-in provider
//! - [`AssistantBackend`]: Capability interface over the assistant service
//! - [`Conversation`]: Append-only message history with the send flow
//! - [`Storage`]: File-backed key-value store for session persistence
//! - [`Config`]: Static configuration (assistant URL, client id, paths)
//!
//! # Quick Start
//!
//! ```ignore
//! use sage_core::{
//!     backend::RemoteAssistant, chat::Conversation, config::Config,
//!     session::SessionStore, storage::Storage,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load().unwrap();
//!     let storage = Storage::open(&config.storage_dir).unwrap();
//!     let mut session = SessionStore::new(storage);
//!     session.restore();
//!
//!     let backend = RemoteAssistant::new(config.assistant_url.clone());
//!     let mut conversation = Conversation::with_greeting();
//!     conversation
//!         .send_message("What is Sage?", &mut session, &backend)
//!         .await;
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Assistant backend abstraction and the HTTP client
//! - [`chat`]: Messages, conversation history, and the send state machine
//! - [`config`]: Static configuration with an optional TOML override file
//! - [`identity`]: Signed-credential payload decoding
//! - [`provider`]: Identity provider capability interface and adapter
//! - [`session`]: Session store (restore / login / logout)
//! - [`storage`]: File-backed persistent string store
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. It's pure session and chat logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod identity;
pub mod provider;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use backend::{AskError, AskReply, AssistantBackend, RemoteAssistant};
pub use chat::{
    connection_trouble, Author, Conversation, Message, MessageId, SendOutcome, AUTH_FAILED_REPLY,
    FALLBACK_REPLY, GREETING,
};
pub use identity::{decode_identity, CredentialError, Identity};
pub use provider::{
    ButtonOptions, ButtonSlot, CredentialResponse, GoogleIdentity, IdentityProvider,
    ProviderConfig, ProviderError,
};
pub use session::{SessionStore, CREDENTIAL_KEY, IDENTITY_KEY};
pub use storage::{Storage, StorageError};

// Config exports
pub use config::{default_config_path, Config, ConfigError, ConfigSource};
