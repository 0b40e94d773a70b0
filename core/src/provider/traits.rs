//! Identity Provider Traits
//!
//! Trait definition for third-party sign-in providers. This abstraction
//! keeps core logic away from provider-specific details: the session store
//! only ever asks a provider to stop auto-selecting accounts, and the
//! sign-in surface only drives the load/initialize/render lifecycle.
//!
//! # Design Philosophy
//!
//! The provider owns its hosted widget. The application offers a mount
//! point ([`ButtonSlot`]) and receives finished credentials over a channel;
//! it never fabricates the button content or inspects the sign-in flow.
//! Lifecycle calls made out of order are errors, mirroring a client library
//! that must be fetched before it can be configured.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while driving a provider client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The client library could not be fetched
    #[error("provider client failed to load: {0}")]
    LoadFailed(String),

    /// A call that requires a loaded client arrived before `load`
    #[error("provider client has not been loaded")]
    NotLoaded,

    /// A call that requires configuration arrived before `initialize`
    #[error("provider client has not been initialized")]
    NotInitialized,
}

/// Configuration handed to the provider client during initialization
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Application identifier registered with the provider
    pub client_id: String,
}

/// Credential delivered by the provider after a completed sign-in
#[derive(Clone, Debug)]
pub struct CredentialResponse {
    /// The opaque signed credential, forwarded verbatim to `login`
    pub credential: String,
    /// How the account was chosen (e.g. "user", "auto")
    pub select_by: String,
}

/// Options for the provider-rendered sign-in button
///
/// Field values follow the provider's widget vocabulary; unknown values
/// fall back to the provider's defaults.
#[derive(Clone, Debug)]
pub struct ButtonOptions {
    /// Button variant ("standard" or "icon")
    pub kind: String,
    /// Visual theme ("outline", "filled_blue", "filled_black")
    pub theme: String,
    /// Button size ("large", "medium", "small")
    pub size: String,
    /// Label text key ("signin_with", "signup_with", "continue_with")
    pub text: String,
    /// Corner shape ("rectangular", "pill", "circle", "square")
    pub shape: String,
    /// Button width in columns
    pub width: u16,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            kind: "standard".to_string(),
            theme: "outline".to_string(),
            size: "large".to_string(),
            text: "signin_with".to_string(),
            shape: "pill".to_string(),
            width: 30,
        }
    }
}

/// Mount point a surface offers to the provider for its button widget.
///
/// The provider writes its rendered affordance into the slot; a slot that
/// was never written means the button never appeared (e.g. the client
/// failed to load) and the surface shows nothing in its place.
#[derive(Clone, Debug, Default)]
pub struct ButtonSlot {
    label: Option<String>,
}

impl ButtonSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the provider has rendered into this slot.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.label.is_some()
    }

    /// The rendered affordance, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Place rendered content into the slot. Called by provider
    /// implementations only.
    pub fn place(&mut self, label: String) {
        self.label = Some(label);
    }

    /// Empty the slot (surface unmount).
    pub fn clear(&mut self) {
        self.label = None;
    }
}

/// Identity provider trait
///
/// Implement this trait to integrate a sign-in provider. All methods are
/// callable from any task; implementations guard their own state.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Load the provider's client library.
    ///
    /// Idempotent: loading an already-loaded client is a no-op. A failed
    /// load leaves the client unusable; callers log and stop (no retry).
    async fn load(&self) -> Result<(), ProviderError>;

    /// Whether the client library is currently loaded.
    fn is_loaded(&self) -> bool;

    /// Configure the loaded client with the application identity and the
    /// channel that receives completed sign-in credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotLoaded`] when called before a successful
    /// `load`.
    fn initialize(
        &self,
        config: ProviderConfig,
        credentials: mpsc::Sender<CredentialResponse>,
    ) -> Result<(), ProviderError>;

    /// Render the provider's own button into `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotLoaded`] or
    /// [`ProviderError::NotInitialized`] when the lifecycle has not reached
    /// the rendering stage.
    fn render_button(
        &self,
        slot: &mut ButtonSlot,
        options: &ButtonOptions,
    ) -> Result<(), ProviderError>;

    /// Ask the provider to stop auto-selecting the previously used account.
    ///
    /// Best-effort: a no-op when the client is not loaded.
    fn disable_auto_select(&self);

    /// Release the client library (surface unmount). Best-effort; absence
    /// of the client is not an error.
    fn unload(&self);
}
