//! Chat Screen
//!
//! Renders the conversation, the input box, and the status bar, and
//! drives the send flow against the remote assistant.
//!
//! A submission is handed to a background task so the UI keeps rendering;
//! [`ChatScreen::poll`] picks the reply up on the frame tick and completes
//! the send, which also tears the session down when the assistant rejects
//! the credential. The conversation itself lives in `sage-core`; this
//! screen only draws it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Frame;
use tokio::sync::oneshot;

use sage_core::{
    AskError, AskReply, AssistantBackend, Author, Conversation, RemoteAssistant, SessionStore,
};

use crate::theme::{DIM_GRAY, LINK_BLUE, SAGE_ACCENT, USER_GREEN};

/// Input box height (lines) for text wrapping
const INPUT_HEIGHT: u16 = 5;

/// Hint shown in the empty input box
const INPUT_PLACEHOLDER: &str = "Ask me anything...";

/// The chat screen state
pub struct ChatScreen {
    /// The conversation, opened by the greeting
    conversation: Conversation,
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Conversation viewport height from the last render (for page keys)
    viewport_height: usize,
    /// Receiver for the in-flight assistant reply, if any
    pending: Option<oneshot::Receiver<Result<AskReply, AskError>>>,
}

impl ChatScreen {
    /// Create a fresh conversation screen.
    pub fn new() -> Self {
        Self {
            conversation: Conversation::with_greeting(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            viewport_height: 0,
            pending: None,
        }
    }

    /// Handle a key press. Returns `true` when the key was consumed.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        session: &mut SessionStore,
        backend: &RemoteAssistant,
    ) -> bool {
        match key.code {
            // Submit message
            KeyCode::Enter => {
                self.submit(session, backend);
                true
            }

            // Typing (locked while a send is in flight)
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if !self.conversation.is_sending() {
                    self.input_buffer.push(c);
                }
                true
            }
            KeyCode::Backspace => {
                if !self.conversation.is_sending() {
                    self.input_buffer.pop();
                }
                true
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = (self.viewport_height / 2).max(1);
                self.scroll_up(page);
                true
            }
            KeyCode::PageDown => {
                let page = (self.viewport_height / 2).max(1);
                self.scroll_down(page);
                true
            }

            // Sign out
            KeyCode::F(2) => {
                session.logout();
                true
            }

            _ => false,
        }
    }

    /// Start a send from the input buffer, if one can start.
    ///
    /// The ask runs on a background task; the reply arrives via `poll`.
    fn submit(&mut self, session: &SessionStore, backend: &RemoteAssistant) {
        let Some(query) = self.conversation.begin_send(&self.input_buffer) else {
            return;
        };
        self.input_buffer.clear();
        self.scroll_offset = 0;

        let credential = session.credential().unwrap_or_default().to_string();
        let backend = backend.clone();
        let (tx, rx) = oneshot::channel();
        self.pending = Some(rx);
        tokio::spawn(async move {
            let result = backend.ask(&query, &credential).await;
            let _ = tx.send(result);
        });
    }

    /// Complete the in-flight send if its reply has arrived.
    pub fn poll(&mut self, session: &mut SessionStore, backend: &RemoteAssistant) {
        let Some(rx) = &mut self.pending else {
            return;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.conversation
                    .complete_send(result, session, &backend.endpoint());
                self.scroll_offset = 0;
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                // The ask task was lost; complete as a transport failure so
                // the in-flight flag never sticks
                self.pending = None;
                self.conversation.complete_send(
                    Err(AskError::Transport("reply channel closed".to_string())),
                    session,
                    &backend.endpoint(),
                );
            }
        }
    }

    /// Scroll towards older lines.
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    /// Scroll towards the latest lines.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Render the conversation, input box, and status bar.
    pub fn render(&mut self, frame: &mut Frame, session: &SessionStore) {
        let area = frame.area();
        let buf = frame.buffer_mut();

        let input_and_status_height = INPUT_HEIGHT + 1;
        let width = area.width.saturating_sub(2) as usize;
        let height = area.height.saturating_sub(input_and_status_height) as usize;
        if width < 10 || height < 3 {
            return;
        }
        self.viewport_height = height;

        let all_lines = conversation_lines(&self.conversation, width);
        self.total_lines = all_lines.len();

        // Clamp scroll offset
        let max_scroll = self.total_lines.saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        // Calculate visible range
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        let has_content_above = visible_start > 0;
        let has_content_below = self.scroll_offset > 0;

        for (i, (line, style)) in all_lines
            .iter()
            .skip(visible_start)
            .take(height)
            .enumerate()
        {
            // Fade lines that continue past the viewport edge
            let final_style = if has_content_above && i < 2 {
                let shade = if i == 0 {
                    Color::Rgb(80, 80, 80)
                } else {
                    Color::Rgb(120, 120, 120)
                };
                Style::default().fg(shade)
            } else if has_content_below && i >= height.saturating_sub(2) {
                let dist_from_bottom = height.saturating_sub(1).saturating_sub(i);
                let shade = if dist_from_bottom == 0 {
                    Color::Rgb(80, 80, 80)
                } else {
                    Color::Rgb(120, 120, 120)
                };
                Style::default().fg(shade)
            } else {
                *style
            };

            let display: String = line.chars().take(area.width as usize).collect();
            buf.set_string(area.x, area.y + i as u16, &display, final_style);
        }

        self.render_input(buf, area);
        self.render_status(buf, area, session);
    }

    /// Render the input box (separator plus wrapped input lines).
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        let input_top = area.height.saturating_sub(INPUT_HEIGHT + 1);

        let separator = "-".repeat(area.width as usize);
        buf.set_string(
            area.x,
            area.y + input_top,
            &separator,
            Style::default().fg(Color::DarkGray),
        );

        let text_height = INPUT_HEIGHT.saturating_sub(1) as usize;
        let text_width = area.width.saturating_sub(1) as usize;
        if text_width < 5 {
            return;
        }

        if self.input_buffer.is_empty() && !self.conversation.is_sending() {
            buf.set_string(
                area.x,
                area.y + input_top + 1,
                "You: _",
                Style::default().fg(USER_GREEN),
            );
            buf.set_string(
                area.x + 7,
                area.y + input_top + 1,
                INPUT_PLACEHOLDER,
                Style::default().fg(DIM_GRAY),
            );
            return;
        }

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped_lines: Vec<String> = textwrap::wrap(&full_input, text_width)
            .iter()
            .map(|s| s.to_string())
            .collect();

        let visible_lines: Vec<&String> = if wrapped_lines.len() > text_height {
            wrapped_lines
                .iter()
                .skip(wrapped_lines.len() - text_height)
                .collect()
        } else {
            wrapped_lines.iter().collect()
        };

        for (i, line) in visible_lines.iter().enumerate() {
            let y = input_top + 1 + i as u16;
            if y < area.height.saturating_sub(1) {
                buf.set_string(area.x, area.y + y, line, Style::default().fg(USER_GREEN));
            }
        }

        if wrapped_lines.len() > text_height {
            buf.set_string(
                area.x + area.width.saturating_sub(3),
                area.y + input_top,
                "^",
                Style::default().fg(Color::Yellow),
            );
        }
    }

    /// Render the status bar.
    fn render_status(&self, buf: &mut Buffer, area: Rect, session: &SessionStore) {
        let state_str = if self.conversation.is_sending() {
            "Thinking..."
        } else {
            "Ready"
        };

        let status_style = if self.conversation.is_sending() {
            Style::default().fg(SAGE_ACCENT)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let user = session
            .identity()
            .map_or("signed out", |identity| identity.name.as_str());

        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines - PgDn to scroll]", self.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(
            " {state_str} | {user} | PgUp/PgDn scroll{scroll_info} | F2 sign out | Esc to quit"
        );
        buf.set_string(
            area.x,
            area.y + area.height.saturating_sub(1),
            &status,
            status_style,
        );
    }
}

impl Default for ChatScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the styled conversation lines, wrapped to `width`.
///
/// Each message becomes its prefixed content, its reference links, and a
/// dim timestamp; while a send is in flight a thinking line trails the
/// history.
fn conversation_lines(conversation: &Conversation, width: usize) -> Vec<(String, Style)> {
    let mut lines: Vec<(String, Style)> = Vec::new();

    for msg in conversation.messages() {
        let (prefix, style) = match msg.author {
            Author::User => ("You: ", Style::default().fg(USER_GREEN)),
            Author::Assistant => ("Sage: ", Style::default().fg(SAGE_ACCENT)),
        };

        let content = format!("{prefix}{}", msg.content);
        for line in textwrap::wrap(&content, width) {
            lines.push((line.to_string(), style));
        }

        for url in &msg.links {
            lines.push((format!("  -> {url}"), Style::default().fg(LINK_BLUE)));
        }

        lines.push((
            format!("  {}", msg.sent_at.format("%H:%M")),
            Style::default().fg(DIM_GRAY),
        ));
        lines.push((String::new(), Style::default()));
    }

    if conversation.is_sending() {
        lines.push((
            "Sage: Thinking...".to_string(),
            Style::default().fg(DIM_GRAY),
        ));
        lines.push((String::new(), Style::default()));
    }

    lines
}
