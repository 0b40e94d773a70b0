//! Session Store
//!
//! Owns the authenticated identity and bearer credential for the current
//! run, and mirrors them to persistent storage so a restart can pick the
//! session back up without re-authenticating.
//!
//! # Design Philosophy
//!
//! The identity/credential pair lives behind a single `Option`: the two are
//! set together on a successful login and cleared together on logout, so no
//! state can exist where one is present without the other. `restore`,
//! `login`, and `logout` are the only mutators. Every failure path is
//! swallowed and logged; callers observe outcomes only through
//! `is_authenticated`.

use std::sync::Arc;

use crate::identity::{decode_identity, Identity};
use crate::provider::IdentityProvider;
use crate::storage::Storage;

/// Storage key holding the raw bearer credential.
pub const CREDENTIAL_KEY: &str = "auth_token";

/// Storage key holding the serialized identity.
pub const IDENTITY_KEY: &str = "user_data";

/// The authenticated pair. Private so the set-together/clear-together
/// invariant holds by construction.
struct Account {
    identity: Identity,
    credential: String,
}

/// Holds the current session and its persistence.
pub struct SessionStore {
    account: Option<Account>,
    storage: Storage,
    provider: Option<Arc<dyn IdentityProvider>>,
}

impl SessionStore {
    /// Create an empty store over the given persistent storage.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            account: None,
            storage,
            provider: None,
        }
    }

    /// Attach the identity provider notified on logout.
    pub fn attach_provider(&mut self, provider: Arc<dyn IdentityProvider>) {
        self.provider = Some(provider);
    }

    /// Re-establish the previous session from persistent storage.
    ///
    /// Both entries must be present and the stored identity must
    /// deserialize; otherwise the session stays empty. Never touches the
    /// network.
    pub fn restore(&mut self) {
        let credential = match self.storage.get(CREDENTIAL_KEY) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "Could not read stored credential");
                None
            }
        };
        let identity_json = match self.storage.get(IDENTITY_KEY) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "Could not read stored identity");
                None
            }
        };

        match (credential, identity_json) {
            (Some(credential), Some(json)) => match serde_json::from_str::<Identity>(&json) {
                Ok(identity) => {
                    tracing::debug!(user = %identity.name, "Session restored from storage");
                    self.account = Some(Account {
                        identity,
                        credential,
                    });
                }
                Err(error) => {
                    tracing::warn!(%error, "Stored identity unreadable, leaving session empty");
                }
            },
            (None, None) => {}
            _ => {
                tracing::debug!("Partial session entries in storage, leaving session empty");
            }
        }
    }

    /// Establish a session from a signed credential.
    ///
    /// Decodes the display identity from the credential payload. On any
    /// decode failure the call logs and returns with no state change. On
    /// success the pair is held in memory and both storage entries are
    /// written; a storage failure is logged but does not tear the session
    /// back down.
    pub fn login(&mut self, raw_credential: &str) {
        let identity = match decode_identity(raw_credential) {
            Ok(identity) => identity,
            Err(error) => {
                tracing::warn!(%error, "Ignoring credential that could not be decoded");
                return;
            }
        };

        match serde_json::to_string(&identity) {
            Ok(json) => {
                if let Err(error) = self.storage.set(CREDENTIAL_KEY, raw_credential) {
                    tracing::warn!(%error, "Could not persist credential");
                }
                if let Err(error) = self.storage.set(IDENTITY_KEY, &json) {
                    tracing::warn!(%error, "Could not persist identity");
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Could not serialize identity for storage");
            }
        }

        tracing::info!(user = %identity.name, "Session established");
        self.account = Some(Account {
            identity,
            credential: raw_credential.to_string(),
        });
    }

    /// Tear down the session.
    ///
    /// Clears the in-memory pair, removes both storage entries, and asks
    /// the attached provider to stop auto-selecting the account.
    pub fn logout(&mut self) {
        self.account = None;

        if let Err(error) = self.storage.remove(CREDENTIAL_KEY) {
            tracing::warn!(%error, "Could not remove stored credential");
        }
        if let Err(error) = self.storage.remove(IDENTITY_KEY) {
            tracing::warn!(%error, "Could not remove stored identity");
        }

        if let Some(provider) = &self.provider {
            provider.disable_auto_select();
        }

        tracing::debug!("Session cleared");
    }

    /// Whether a session is currently established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.account.as_ref().map(|account| &account.identity)
    }

    /// The bearer credential of the current session, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.account
            .as_ref()
            .map(|account| account.credential.as_str())
    }
}
