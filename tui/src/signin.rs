//! Sign-In Screen
//!
//! Drives the identity provider lifecycle and renders the sign-in card.
//! The provider client is loaded and configured incrementally from the
//! frame tick so the UI stays responsive; the button slot only ever shows
//! what the provider rendered into it. When setup fails the slot simply
//! stays empty - no error banner, no retry.
//!
//! Credentials reach the session indirectly: the user activates the
//! button and pastes a signed credential, the provider delivers it over
//! the credential channel, and [`SignInScreen::poll`] forwards it to
//! [`SessionStore::login`] verbatim.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::Frame;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use sage_core::{
    ButtonOptions, ButtonSlot, CredentialResponse, GoogleIdentity, IdentityProvider,
    ProviderConfig, SessionStore,
};

use crate::theme::{DIM_GRAY, SAGE_ACCENT, USER_GREEN};

/// Capacity of the provider-to-surface credential channel
const CREDENTIAL_CHANNEL_CAPACITY: usize = 8;

/// Provider setup progress, advanced one step per frame tick
enum SetupPhase {
    /// The client library still has to be fetched
    NeedLoad,
    /// Loaded; initialize and render the button next
    NeedButton,
    /// The button is rendered and credentials can arrive
    Ready,
    /// Setup failed; the slot stays empty and nothing retries
    Halted,
}

/// The sign-in screen state
pub struct SignInScreen {
    /// The identity provider behind the button
    provider: Arc<GoogleIdentity>,
    /// Client id handed to the provider during initialization
    client_id: String,
    /// Where provider setup currently stands
    setup: SetupPhase,
    /// Mount point the provider renders its button into
    slot: ButtonSlot,
    /// Receives completed sign-in credentials from the provider
    credentials: Option<mpsc::Receiver<CredentialResponse>>,
    /// Whether the credential entry field is open
    entering: bool,
    /// Credential entry buffer
    credential_input: String,
}

impl SignInScreen {
    /// Create the screen. Provider setup starts on the next frame tick.
    pub fn new(provider: Arc<GoogleIdentity>, client_id: &str) -> Self {
        Self {
            provider,
            client_id: client_id.to_string(),
            setup: SetupPhase::NeedLoad,
            slot: ButtonSlot::new(),
            credentials: None,
            entering: false,
            credential_input: String::new(),
        }
    }

    /// Advance provider setup by one step.
    ///
    /// Called from the frame tick; each step is bounded by a short timeout
    /// so a slow load cannot freeze the UI. A failed step halts setup for
    /// good.
    pub async fn advance_setup(&mut self) {
        match self.setup {
            SetupPhase::NeedLoad => {
                match tokio::time::timeout(Duration::from_millis(50), self.provider.load()).await {
                    Ok(Ok(())) => self.setup = SetupPhase::NeedButton,
                    Ok(Err(error)) => {
                        tracing::warn!(%error, "Identity provider client failed to load");
                        self.setup = SetupPhase::Halted;
                    }
                    Err(_) => {
                        // Timeout - load is idempotent, retry next frame
                    }
                }
            }
            SetupPhase::NeedButton => {
                let (tx, rx) = mpsc::channel(CREDENTIAL_CHANNEL_CAPACITY);
                let config = ProviderConfig {
                    client_id: self.client_id.clone(),
                };

                if let Err(error) = self.provider.initialize(config, tx) {
                    tracing::warn!(%error, "Identity provider could not be initialized");
                    self.setup = SetupPhase::Halted;
                    return;
                }
                if let Err(error) = self
                    .provider
                    .render_button(&mut self.slot, &ButtonOptions::default())
                {
                    tracing::warn!(%error, "Sign-in button could not be rendered");
                    self.setup = SetupPhase::Halted;
                    return;
                }

                self.credentials = Some(rx);
                self.setup = SetupPhase::Ready;
            }
            SetupPhase::Ready | SetupPhase::Halted => {}
        }
    }

    /// Forward any delivered credentials to the session.
    pub fn poll(&mut self, session: &mut SessionStore) {
        if let Some(rx) = &mut self.credentials {
            while let Ok(response) = rx.try_recv() {
                session.login(&response.credential);
            }
        }
    }

    /// Handle a key press. Returns `true` when the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.entering {
            match key.code {
                KeyCode::Enter => {
                    let credential = std::mem::take(&mut self.credential_input);
                    self.entering = false;
                    if !credential.trim().is_empty() {
                        self.provider.submit_credential(credential);
                    }
                    true
                }
                KeyCode::Esc => {
                    self.credential_input.clear();
                    self.entering = false;
                    true
                }
                KeyCode::Backspace => {
                    self.credential_input.pop();
                    true
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.credential_input.push(c);
                    true
                }
                _ => false,
            }
        } else {
            match key.code {
                // The button only responds once the provider rendered it
                KeyCode::Enter if self.slot.is_rendered() => {
                    self.entering = true;
                    true
                }
                _ => false,
            }
        }
    }

    /// Release the provider client and the credential channel.
    ///
    /// Called when the screen is swapped out, mirroring a surface unmount.
    pub fn unmount(&mut self) {
        self.provider.unload();
        self.slot.clear();
        self.credentials = None;
    }

    /// Build the sign-in card lines, top to bottom.
    fn card_lines(&self, width: usize) -> Vec<(String, Style)> {
        let accent = Style::default().fg(SAGE_ACCENT);
        let dim = Style::default().fg(DIM_GRAY);
        let plain = Style::default();

        let mut lines: Vec<(String, Style)> = vec![
            ("Sage AI Assistant".to_string(), accent),
            (String::new(), plain),
            ("Welcome Back".to_string(), plain),
            (
                "Please sign in with Google to access the assistant".to_string(),
                dim,
            ),
            (String::new(), plain),
        ];

        // The button slot: only ever what the provider rendered
        match (&self.setup, self.slot.label()) {
            (_, Some(label)) => lines.push((label.to_string(), accent)),
            (SetupPhase::NeedLoad | SetupPhase::NeedButton, None) => {
                lines.push(("Loading sign-in...".to_string(), dim));
            }
            (SetupPhase::Ready | SetupPhase::Halted, None) => lines.push((String::new(), plain)),
        }
        lines.push((String::new(), plain));

        if self.entering {
            let mut entry = format!("Credential: {}_", self.credential_input);
            let over = entry.chars().count().saturating_sub(width);
            if over > 0 {
                entry = entry.chars().skip(over).collect();
            }
            lines.push((entry, Style::default().fg(USER_GREEN)));
            lines.push(("Enter to submit | Esc to cancel".to_string(), dim));
        } else {
            lines.push(("Secure Authentication".to_string(), plain));
            lines.push((
                "Your data is protected. We only access basic profile information.".to_string(),
                dim,
            ));
            lines.push((String::new(), plain));
            let hint = if self.slot.is_rendered() {
                "Enter to sign in | Esc to quit"
            } else {
                "Esc to quit"
            };
            lines.push((hint.to_string(), dim));
        }

        lines
    }

    /// Render the centered sign-in card.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let buf = frame.buffer_mut();

        let width = area.width.saturating_sub(4) as usize;
        if width < 20 || area.height < 8 {
            return;
        }

        let lines = self.card_lines(width);
        let top = area.height.saturating_sub(lines.len() as u16) / 2;

        for (i, (line, style)) in lines.iter().enumerate() {
            let y = top + i as u16;
            if y >= area.height {
                break;
            }
            let line_width = line.width().min(width) as u16;
            let x = area.width.saturating_sub(line_width) / 2;
            let display: String = line.chars().take(width).collect();
            buf.set_string(area.x + x, area.y + y, &display, *style);
        }
    }
}
