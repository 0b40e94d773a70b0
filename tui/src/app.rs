//! Main Application
//!
//! The App owns the session, the identity provider, and the assistant
//! client, and mounts exactly one screen on top of them:
//!
//! 1. Not authenticated: the sign-in screen drives the provider lifecycle
//! 2. Authenticated: the chat screen drives the conversation
//!
//! After every frame the mounted screen is synced against the session, so
//! a completed sign-in swaps the chat in and a sign-out (explicit or a
//! rejected credential) swaps it back out. Entering the chat always starts
//! a fresh conversation.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use sage_core::{Config, GoogleIdentity, RemoteAssistant, SessionStore, Storage};

use crate::chat::ChatScreen;
use crate::signin::SignInScreen;

/// The mounted screen
enum Screen {
    SignIn(SignInScreen),
    Chat(ChatScreen),
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Static configuration (endpoint, client id, storage dir)
    config: Config,
    /// The session and its persistence
    session: SessionStore,
    /// The identity provider behind the sign-in screen
    provider: Arc<GoogleIdentity>,
    /// Client for the remote assistant
    backend: RemoteAssistant,
    /// The currently mounted screen
    screen: Screen,
}

impl App {
    /// Create the app: load configuration, restore any stored session, and
    /// mount the screen matching the result.
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load()?;
        tracing::debug!(source = %config.source(), "Configuration resolved");

        let provider = Arc::new(GoogleIdentity::new());
        let mut session = SessionStore::new(Storage::open(&config.storage_dir)?);
        session.attach_provider(provider.clone());
        session.restore();

        let backend = RemoteAssistant::new(config.assistant_url.clone());

        let screen = if session.is_authenticated() {
            Screen::Chat(ChatScreen::new())
        } else {
            Screen::SignIn(SignInScreen::new(provider.clone(), &config.client_id))
        };

        Ok(Self {
            running: true,
            config,
            session,
            provider,
            backend,
            screen,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Frame cap for terminal rendering
        let frame_duration = Duration::from_millis(100);

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key);
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse),
                            _ => {}
                        }
                    }
                }

                // Frame tick - advance provider setup incrementally
                _ = tokio::time::sleep(Duration::from_millis(16)) => {
                    if let Screen::SignIn(signin) = &mut self.screen {
                        signin.advance_setup().await;
                    }
                }
            }

            // Pick up deliveries (credentials, assistant replies)
            self.poll_screen();

            // Swap screens when the authentication state moved
            self.sync_screen();

            // Render
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Let the mounted screen pick up pending deliveries.
    fn poll_screen(&mut self) {
        match &mut self.screen {
            Screen::SignIn(signin) => signin.poll(&mut self.session),
            Screen::Chat(chat) => chat.poll(&mut self.session, &self.backend),
        }
    }

    /// Mount the screen matching the authentication state.
    ///
    /// Swapping the sign-in screen out releases the provider client;
    /// swapping the chat screen in starts a fresh conversation.
    fn sync_screen(&mut self) {
        let next = match (&mut self.screen, self.session.is_authenticated()) {
            (Screen::SignIn(signin), true) => {
                signin.unmount();
                Some(Screen::Chat(ChatScreen::new()))
            }
            (Screen::Chat(_), false) => Some(Screen::SignIn(SignInScreen::new(
                self.provider.clone(),
                &self.config.client_id,
            ))),
            _ => None,
        };

        if let Some(screen) = next {
            self.screen = screen;
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: event::KeyEvent) {
        // The mounted screen gets the key first
        let consumed = match &mut self.screen {
            Screen::SignIn(signin) => signin.handle_key(key),
            Screen::Chat(chat) => chat.handle_key(key, &mut self.session, &self.backend),
        };
        if consumed {
            return;
        }

        match key.code {
            // Quit
            KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        if let Screen::Chat(chat) = &mut self.screen {
            match mouse.kind {
                MouseEventKind::ScrollUp => chat.scroll_up(3),
                MouseEventKind::ScrollDown => chat.scroll_down(3),
                _ => {}
            }
        }
    }

    /// Render the mounted screen
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| match &mut self.screen {
            Screen::SignIn(signin) => signin.render(frame),
            Screen::Chat(chat) => chat.render(frame, &self.session),
        })?;
        Ok(())
    }
}
