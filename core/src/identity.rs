//! Signed-Credential Payload Decoding
//!
//! The identity provider hands the application an opaque signed credential:
//! three dot-separated segments, the middle one a base64-encoded JSON claims
//! document. The application never verifies the signature (the assistant
//! service does that on every request); it only decodes the claims to learn
//! who to greet.
//!
//! Tokens in the wild use the URL-safe unpadded alphabet. A padded standard
//! alphabet is accepted as a fallback so hand-crafted tokens in test rigs
//! keep working.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display identity extracted from a credential's claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name of the signed-in user
    pub name: String,
    /// Email address of the signed-in user
    pub email: String,
    /// URL of the user's profile picture
    pub picture: String,
}

/// Errors that can occur while decoding a credential
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential is not a three-segment token
    #[error("credential is not a three-segment token")]
    MalformedToken,

    /// The payload segment is not valid base64
    #[error("credential payload is not valid base64: {0}")]
    PayloadDecode(String),

    /// The decoded payload is missing required claims or is not JSON
    #[error("credential claims could not be parsed: {0}")]
    ClaimsParse(#[from] serde_json::Error),
}

/// Decode the display identity from a signed credential.
///
/// Splits the token on `.`, base64-decodes the middle segment, and parses
/// the `name`, `email`, and `picture` claims. Unknown claims are ignored.
///
/// # Errors
///
/// Returns [`CredentialError`] when the token does not have exactly three
/// segments, the payload does not base64-decode, or any required claim is
/// missing.
pub fn decode_identity(credential: &str) -> Result<Identity, CredentialError> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::MalformedToken);
    }

    let claims = URL_SAFE_NO_PAD
        .decode(segments[1])
        .or_else(|_| STANDARD.decode(segments[1]))
        .map_err(|e| CredentialError::PayloadDecode(e.to_string()))?;

    let identity: Identity = serde_json::from_slice(&claims)?;
    Ok(identity)
}
