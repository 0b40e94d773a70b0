//! Identity Provider Integration
//!
//! This module provides abstracted access to the third-party sign-in
//! provider through a capability trait. The rest of the application never
//! touches the concrete provider: the session store and the sign-in surface
//! see only [`IdentityProvider`] and the small value types that cross it.
//!
//! # Usage
//!
//! ```ignore
//! use sage_core::provider::{ButtonOptions, ButtonSlot, GoogleIdentity, IdentityProvider, ProviderConfig};
//! use tokio::sync::mpsc;
//!
//! let provider = GoogleIdentity::new();
//! provider.load().await?;
//!
//! let (tx, mut rx) = mpsc::channel(4);
//! provider.initialize(ProviderConfig { client_id: "...".into() }, tx)?;
//!
//! let mut slot = ButtonSlot::new();
//! provider.render_button(&mut slot, &ButtonOptions::default())?;
//! ```

mod google;
mod traits;

pub use google::GoogleIdentity;
pub use traits::{
    ButtonOptions, ButtonSlot, CredentialResponse, IdentityProvider, ProviderConfig, ProviderError,
};
