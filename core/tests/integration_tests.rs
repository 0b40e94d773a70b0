//! Integration Tests for the Session and Chat Flow
//!
//! These tests drive the full headless flow: sign-in through the identity
//! provider, persistence across store instances, and the chat send loop
//! against a mock assistant backend.
//!
//! # Test Coverage
//!
//! 1. **Session Lifecycle**: login / restore / logout round trips
//! 2. **Credential Handling**: malformed tokens never disturb state
//! 3. **Chat Flow**: replies, fallbacks, failures, and the 401 teardown
//! 4. **Ordering**: one in-flight send, append order equals submission order
//! 5. **Provider Handshake**: credentials flow from widget to session
//!
//! # Mock Backend
//!
//! We use a configurable mock assistant that:
//! - Tracks the number of requests made
//! - Records the query and credential of every request
//! - Returns scripted replies or injected failures in order

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use sage_core::{
    backend::{AskError, AskReply, AssistantBackend},
    chat::{Author, Conversation, SendOutcome, AUTH_FAILED_REPLY, FALLBACK_REPLY},
    provider::{ButtonOptions, ButtonSlot, GoogleIdentity, IdentityProvider, ProviderConfig},
    session::{SessionStore, CREDENTIAL_KEY, IDENTITY_KEY},
    storage::Storage,
};

// ============================================================================
// Helpers
// ============================================================================

/// Build a well-formed three-segment credential carrying the given claims.
fn make_credential(name: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "iss": "https://accounts.example.com",
            "sub": "1234567890",
            "name": name,
            "email": email,
            "picture": format!("https://example.com/{name}.png"),
        })
        .to_string(),
    );
    format!("{header}.{payload}.test-signature")
}

fn fresh_session() -> (TempDir, SessionStore) {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path().join("sessions")).unwrap();
    (dir, SessionStore::new(storage))
}

fn signed_in_session() -> (TempDir, SessionStore, String) {
    let (dir, mut session) = fresh_session();
    let credential = make_credential("Ada", "ada@example.com");
    session.login(&credential);
    assert!(session.is_authenticated());
    (dir, session, credential)
}

// ============================================================================
// Configurable Mock Assistant
// ============================================================================

/// A scripted assistant backend.
///
/// Replies are served in the order they were queued; when the script runs
/// dry, further requests answer with a plain "ok".
struct MockAssistant {
    request_count: AtomicUsize,
    replies: Mutex<VecDeque<Result<AskReply, AskError>>>,
    seen: Mutex<Vec<(String, String)>>,
}

impl MockAssistant {
    fn new() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            replies: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn with_reply(self, reply: Result<AskReply, AskError>) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    fn answering(answer: &str, links: &[&str]) -> Self {
        Self::new().with_reply(Ok(AskReply {
            answer: Some(answer.to_string()),
            links: links.iter().map(ToString::to_string).collect(),
        }))
    }

    fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The (query, credential) pairs seen, in arrival order.
    fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl AssistantBackend for MockAssistant {
    fn endpoint(&self) -> String {
        "http://assistant.test:8000".to_string()
    }

    async fn ask(&self, query: &str, credential: &str) -> Result<AskReply, AskError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push((query.to_string(), credential.to_string()));

        self.replies.lock().pop_front().unwrap_or_else(|| {
            Ok(AskReply {
                answer: Some("ok".to_string()),
                links: Vec::new(),
            })
        })
    }
}

// ============================================================================
// Session Lifecycle
// ============================================================================

#[tokio::test]
async fn login_then_restore_returns_same_session() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("sessions");
    let credential = make_credential("Ada", "ada@example.com");

    {
        let mut session = SessionStore::new(Storage::open(&root).unwrap());
        session.login(&credential);
    }

    let mut restored = SessionStore::new(Storage::open(&root).unwrap());
    restored.restore();

    assert!(restored.is_authenticated());
    assert_eq!(restored.identity().unwrap().name, "Ada");
    assert_eq!(restored.identity().unwrap().email, "ada@example.com");
    assert_eq!(restored.credential(), Some(credential.as_str()));
}

#[tokio::test]
async fn logout_clears_everything() {
    let (dir, mut session, _credential) = signed_in_session();

    session.logout();

    assert!(!session.is_authenticated());

    // A fresh store over the same directory restores nothing
    let storage = Storage::open(session_root(&dir)).unwrap();
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
    assert_eq!(storage.get(IDENTITY_KEY).unwrap(), None);

    let mut later = SessionStore::new(storage);
    later.restore();
    assert!(!later.is_authenticated());
}

fn session_root(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("sessions")
}

#[tokio::test]
async fn malformed_credential_never_authenticates() {
    let (_dir, mut session) = fresh_session();

    session.login("not-a-token");
    assert!(!session.is_authenticated());

    session.login("two.segments");
    assert!(!session.is_authenticated());

    session.login("a.!!bad-base64!!.c");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn malformed_credential_preserves_stored_session() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("sessions");
    let good = make_credential("Ada", "ada@example.com");

    let mut session = SessionStore::new(Storage::open(&root).unwrap());
    session.login(&good);
    session.login("broken.token.anyway!");

    // In-memory session untouched
    assert!(session.is_authenticated());
    assert_eq!(session.credential(), Some(good.as_str()));

    // Stored session untouched too
    let mut restored = SessionStore::new(Storage::open(&root).unwrap());
    restored.restore();
    assert_eq!(restored.credential(), Some(good.as_str()));
}

#[tokio::test]
async fn partial_storage_restores_empty() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("sessions");

    let storage = Storage::open(&root).unwrap();
    storage.set(CREDENTIAL_KEY, "abc.def.ghi").unwrap();
    // No identity entry written

    let mut session = SessionStore::new(storage);
    session.restore();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn logout_disables_provider_auto_select() {
    let (_dir, mut session) = fresh_session();
    let provider = Arc::new(GoogleIdentity::new());
    provider.load().await.unwrap();
    session.attach_provider(provider.clone());

    session.login(&make_credential("Ada", "ada@example.com"));
    assert!(provider.auto_select_enabled());

    session.logout();
    assert!(!provider.auto_select_enabled());
}

// ============================================================================
// Chat Flow
// ============================================================================

#[tokio::test]
async fn send_appends_user_then_assistant() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::answering("X", &["https://a"]);
    let mut conversation = Conversation::new();

    let outcome = conversation
        .send_message("What is Sage?", &mut session, &backend)
        .await;

    assert_eq!(outcome, SendOutcome::Succeeded);
    assert_eq!(conversation.messages().len(), 2);

    let user = &conversation.messages()[0];
    assert_eq!(user.author, Author::User);
    assert_eq!(user.content, "What is Sage?");

    let reply = &conversation.messages()[1];
    assert_eq!(reply.author, Author::Assistant);
    assert_eq!(reply.content, "X");
    assert_eq!(reply.links, vec!["https://a".to_string()]);
}

#[tokio::test]
async fn request_carries_query_and_credential() {
    let (_dir, mut session, credential) = signed_in_session();
    let backend = MockAssistant::new();
    let mut conversation = Conversation::new();

    conversation
        .send_message("exact query text", &mut session, &backend)
        .await;

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "exact query text");
    assert_eq!(seen[0].1, credential);
}

#[tokio::test]
async fn reply_without_answer_falls_back_to_apology() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::new().with_reply(Ok(AskReply {
        answer: None,
        links: vec!["https://still-here".to_string()],
    }));
    let mut conversation = Conversation::new();

    let outcome = conversation
        .send_message("anything", &mut session, &backend)
        .await;

    assert_eq!(outcome, SendOutcome::Succeeded);
    let reply = conversation.messages().last().unwrap();
    assert_eq!(reply.content, FALLBACK_REPLY);
    assert_eq!(reply.links, vec!["https://still-here".to_string()]);
}

#[tokio::test]
async fn auth_rejection_appends_notice_and_signs_out() {
    let (dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::new().with_reply(Err(AskError::AuthRejected));
    let mut conversation = Conversation::new();

    let outcome = conversation
        .send_message("still there?", &mut session, &backend)
        .await;

    assert_eq!(outcome, SendOutcome::AuthRejected);
    assert_eq!(
        conversation.messages().last().unwrap().content,
        AUTH_FAILED_REPLY
    );
    assert!(!session.is_authenticated());

    // Teardown reached persistent storage as well
    let storage = Storage::open(session_root(&dir)).unwrap();
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
    assert_eq!(storage.get(IDENTITY_KEY).unwrap(), None);
}

#[tokio::test]
async fn auth_rejection_reaches_provider() {
    let (_dir, mut session) = fresh_session();
    let provider = Arc::new(GoogleIdentity::new());
    provider.load().await.unwrap();
    session.attach_provider(provider.clone());
    session.login(&make_credential("Ada", "ada@example.com"));

    let backend = MockAssistant::new().with_reply(Err(AskError::AuthRejected));
    let mut conversation = Conversation::new();
    conversation
        .send_message("hello", &mut session, &backend)
        .await;

    assert!(!provider.auto_select_enabled());
}

#[tokio::test]
async fn endpoint_failure_appends_connectivity_notice() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::new().with_reply(Err(AskError::Endpoint {
        status: 503,
        body: "overloaded".to_string(),
    }));
    let mut conversation = Conversation::new();

    let outcome = conversation
        .send_message("busy?", &mut session, &backend)
        .await;

    assert_eq!(outcome, SendOutcome::Failed);
    let reply = conversation.messages().last().unwrap();
    assert!(reply.content.contains("http://assistant.test:8000"));

    // Session untouched by non-auth failures
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn transport_failure_keeps_session() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend =
        MockAssistant::new().with_reply(Err(AskError::Transport("connection refused".to_string())));
    let mut conversation = Conversation::new();

    let outcome = conversation
        .send_message("anyone home?", &mut session, &backend)
        .await;

    assert_eq!(outcome, SendOutcome::Failed);
    assert!(session.is_authenticated());
    assert!(!conversation.is_sending());
}

#[tokio::test]
async fn blank_input_never_reaches_backend() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::new();
    let mut conversation = Conversation::new();

    let outcome = conversation.send_message("", &mut session, &backend).await;
    assert_eq!(outcome, SendOutcome::Rejected);

    let outcome = conversation
        .send_message("   \t  ", &mut session, &backend)
        .await;
    assert_eq!(outcome, SendOutcome::Rejected);

    assert!(conversation.messages().is_empty());
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn second_send_refused_while_in_flight() {
    let (_dir, _session, _credential) = signed_in_session();
    let mut conversation = Conversation::new();

    assert!(conversation.begin_send("first").is_some());
    assert!(conversation.begin_send("second").is_none());

    // Only the first user message was appended
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].content, "first");
}

#[tokio::test]
async fn sequential_sends_preserve_order() {
    let (_dir, mut session, _credential) = signed_in_session();
    let backend = MockAssistant::new()
        .with_reply(Ok(AskReply {
            answer: Some("first answer".to_string()),
            links: Vec::new(),
        }))
        .with_reply(Ok(AskReply {
            answer: Some("second answer".to_string()),
            links: Vec::new(),
        }));
    let mut conversation = Conversation::with_greeting();

    conversation
        .send_message("first question", &mut session, &backend)
        .await;
    conversation
        .send_message("second question", &mut session, &backend)
        .await;

    let contents: Vec<&str> = conversation
        .messages()
        .iter()
        .skip(1) // greeting
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec![
            "first question",
            "first answer",
            "second question",
            "second answer",
        ]
    );

    // Ids are unique across the whole conversation
    let mut ids: Vec<_> = conversation
        .messages()
        .iter()
        .map(|m| m.id.clone())
        .collect();
    ids.sort_by(|a, b| a.0.cmp(&b.0));
    ids.dedup();
    assert_eq!(ids.len(), conversation.messages().len());
}

// ============================================================================
// Provider Handshake
// ============================================================================

#[tokio::test]
async fn credential_flows_from_widget_to_session() {
    let (_dir, mut session) = fresh_session();
    let provider = Arc::new(GoogleIdentity::new());

    // The sign-in surface lifecycle
    provider.load().await.unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    provider
        .initialize(
            ProviderConfig {
                client_id: "25036282439-test.apps.googleusercontent.com".to_string(),
            },
            tx,
        )
        .unwrap();

    let mut slot = ButtonSlot::new();
    provider
        .render_button(&mut slot, &ButtonOptions::default())
        .unwrap();
    assert!(slot.is_rendered());

    // The user completes the widget flow
    let credential = make_credential("Grace", "grace@example.com");
    provider.submit_credential(credential.clone());

    // The surface forwards the delivery verbatim
    let response = rx.recv().await.unwrap();
    assert_eq!(response.credential, credential);
    session.login(&response.credential);

    assert!(session.is_authenticated());
    assert_eq!(session.identity().unwrap().name, "Grace");
}

#[tokio::test]
async fn unrendered_button_after_failed_lifecycle() {
    let provider = GoogleIdentity::new();
    let mut slot = ButtonSlot::new();

    // Skipping load means the button never renders and the slot stays empty
    let result = provider.render_button(&mut slot, &ButtonOptions::default());
    assert!(result.is_err());
    assert!(!slot.is_rendered());
    assert_eq!(slot.label(), None);
}
