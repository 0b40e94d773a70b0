//! Sage TUI - Terminal interface for the Sage knowledge assistant
//!
//! This crate provides a full-screen terminal UI over the headless
//! `sage-core` crate: a sign-in screen driven by the identity provider
//! and a chat screen over the remote assistant.
//!
//! # Architecture
//!
//! - **App**: Event loop and screen switching on authentication state
//! - **Sign-In**: Provider lifecycle, button slot, credential entry
//! - **Chat**: Conversation rendering, input, scrollback
//! - **Theme**: Color palette shared by both screens

pub mod app;
pub mod chat;
pub mod signin;
pub mod theme;

pub use app::App;
