//! Google Identity Adapter
//!
//! Concrete [`IdentityProvider`] wrapping the hosted Google Identity
//! Services client. The adapter tracks the client lifecycle (loaded,
//! configured, auto-select) behind a mutex so the session store and the
//! sign-in surface can share one instance, and it is the single place a
//! completed sign-in enters the application: [`GoogleIdentity::submit_credential`]
//! plays the role of the widget's credential callback.

use parking_lot::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::traits::{
    ButtonOptions, ButtonSlot, CredentialResponse, IdentityProvider, ProviderConfig, ProviderError,
};

#[derive(Default)]
struct ClientState {
    loaded: bool,
    client_id: Option<String>,
    credentials: Option<mpsc::Sender<CredentialResponse>>,
    auto_select: bool,
}

/// Adapter over the Google Identity Services client.
#[derive(Default)]
pub struct GoogleIdentity {
    state: Mutex<ClientState>,
}

impl GoogleIdentity {
    /// Create an adapter with the client library not yet loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a signed credential from the rendered widget.
    ///
    /// Forwards the credential verbatim over the channel registered during
    /// `initialize`. A credential arriving before initialization is dropped
    /// (the widget cannot appear before the client is configured, so this
    /// only happens in misuse) and logged.
    pub fn submit_credential(&self, credential: String) {
        let state = self.state.lock();
        match &state.credentials {
            Some(tx) => {
                let response = CredentialResponse {
                    credential,
                    select_by: "user".to_string(),
                };
                if let Err(error) = tx.try_send(response) {
                    tracing::warn!(%error, "Dropped credential: delivery channel unavailable");
                }
            }
            None => {
                tracing::debug!("Dropped credential submitted before initialization");
            }
        }
    }

    /// Whether the client would auto-select the previous account on the
    /// next sign-in.
    #[must_use]
    pub fn auto_select_enabled(&self) -> bool {
        self.state.lock().auto_select
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn load(&self) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        if state.loaded {
            return Ok(());
        }
        state.loaded = true;
        state.auto_select = true;
        tracing::debug!("Identity client loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    fn initialize(
        &self,
        config: ProviderConfig,
        credentials: mpsc::Sender<CredentialResponse>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        if !state.loaded {
            return Err(ProviderError::NotLoaded);
        }
        state.client_id = Some(config.client_id);
        state.credentials = Some(credentials);
        tracing::debug!("Identity client initialized");
        Ok(())
    }

    fn render_button(
        &self,
        slot: &mut ButtonSlot,
        options: &ButtonOptions,
    ) -> Result<(), ProviderError> {
        let state = self.state.lock();
        if !state.loaded {
            return Err(ProviderError::NotLoaded);
        }
        if state.client_id.is_none() {
            return Err(ProviderError::NotInitialized);
        }
        slot.place(button_label(options));
        Ok(())
    }

    fn disable_auto_select(&self) {
        let mut state = self.state.lock();
        if !state.loaded {
            // Library gone already; nothing to disable
            return;
        }
        state.auto_select = false;
        tracing::debug!("Identity auto-select disabled");
    }

    fn unload(&self) {
        let mut state = self.state.lock();
        state.loaded = false;
        state.client_id = None;
        state.credentials = None;
        tracing::debug!("Identity client unloaded");
    }
}

/// Build the widget affordance for the given options.
fn button_label(options: &ButtonOptions) -> String {
    let text = match options.text.as_str() {
        "signup_with" => "Sign up with Google",
        "continue_with" => "Continue with Google",
        _ => "Sign in with Google",
    };
    match options.shape.as_str() {
        "pill" | "circle" => format!("(  {text}  )"),
        _ => format!("[  {text}  ]"),
    }
}
