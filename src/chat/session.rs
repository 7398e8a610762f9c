use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::turn::Turn;
use crate::runtime::SessionRef;

/// Per-browser chat state: who we are to the runtime and what has been shown.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub user_id: String,
    pub runtime_session_id: Option<String>,
    pub turns: Vec<Turn>,
    /// One-shot message shown above the form, cleared once rendered.
    pub notice: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            user_id: format!("user-{}", Uuid::new_v4()),
            runtime_session_id: None,
            turns: Vec::new(),
            notice: None,
            last_seen: Utc::now(),
        }
    }

    pub fn runtime_target(&self) -> Option<SessionRef> {
        self.runtime_session_id.as_ref().map(|session_id| SessionRef {
            user_id: self.user_id.clone(),
            session_id: session_id.clone(),
        })
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

pub fn new_session_id() -> String {
    let suffix = Uuid::new_v4().as_simple().to_string();
    format!("session-{}-{}", Utc::now().timestamp(), &suffix[..8])
}

/// All live chat sessions, keyed by the client id stored in the browser cookie.
pub struct SessionStore {
    sessions: DashMap<String, ChatSession>,
    history_limit: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(history_limit: usize, idle_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            history_limit: history_limit.max(1),
            idle_timeout: Duration::seconds(idle_secs.min(u64::from(u32::MAX)) as i64),
        }
    }

    pub fn generate_client_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Make sure a session exists for `client_id` and mark it as active.
    pub fn ensure(&self, client_id: &str) {
        self.sessions
            .entry(client_id.to_string())
            .or_insert_with(ChatSession::new)
            .last_seen = Utc::now();
    }

    /// Drop sessions idle for longer than the configured timeout. Returns how
    /// many were removed.
    pub fn evict_idle(&self) -> usize {
        let cutoff = Utc::now() - self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_seen > cutoff);
        before.saturating_sub(self.sessions.len())
    }

    /// Run `f` against the session without cloning it. The map guard is held
    /// only for the duration of `f`, so `f` must not await.
    pub fn with_session<R>(&self, client_id: &str, f: impl FnOnce(&ChatSession) -> R) -> Option<R> {
        self.sessions.get(client_id).map(|entry| f(entry.value()))
    }

    pub fn user_id(&self, client_id: &str) -> Option<String> {
        self.with_session(client_id, |s| s.user_id.clone())
    }

    pub fn runtime_target(&self, client_id: &str) -> Option<SessionRef> {
        self.sessions
            .get(client_id)
            .and_then(|entry| entry.value().runtime_target())
    }

    /// Attach a freshly created runtime session. Starting over clears the
    /// displayed history.
    pub fn start_runtime_session(&self, client_id: &str, session_id: String, clear_history: bool) {
        let mut entry = self
            .sessions
            .entry(client_id.to_string())
            .or_insert_with(ChatSession::new);
        let session = entry.value_mut();
        session.last_seen = Utc::now();
        session.runtime_session_id = Some(session_id);
        if clear_history {
            session.turns.clear();
        }
    }

    pub fn record_turn(&self, client_id: &str, turn: Turn) {
        let mut entry = self
            .sessions
            .entry(client_id.to_string())
            .or_insert_with(ChatSession::new);
        let session = entry.value_mut();
        session.last_seen = Utc::now();
        let turns = &mut session.turns;
        turns.push(turn);
        if turns.len() > self.history_limit {
            let excess = turns.len() - self.history_limit;
            turns.drain(0..excess);
        }
    }

    pub fn set_notice(&self, client_id: &str, notice: impl Into<String>) {
        if let Some(mut entry) = self.sessions.get_mut(client_id) {
            entry.value_mut().notice = Some(notice.into());
        }
    }

    pub fn take_notice(&self, client_id: &str) -> Option<String> {
        self.sessions
            .get_mut(client_id)
            .and_then(|mut entry| entry.value_mut().notice.take())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::turn::{TurnInput, TurnResponse};

    fn reply(prompt: &str) -> Turn {
        Turn::new(TurnInput::text(prompt), TurnResponse::Reply("ok".to_string()))
    }

    #[test]
    fn runtime_target_requires_a_session_id() {
        let store = SessionStore::new(10, 3600);
        store.ensure("c1");
        assert!(store.runtime_target("c1").is_none());

        store.start_runtime_session("c1", "session-1".to_string(), false);
        let target = store.runtime_target("c1").unwrap();
        assert_eq!(target.session_id, "session-1");
        assert!(target.user_id.starts_with("user-"));
    }

    #[test]
    fn history_is_bounded_oldest_first() {
        let store = SessionStore::new(2, 3600);
        for prompt in ["one", "two", "three"] {
            store.record_turn("c1", reply(prompt));
        }
        let prompts = store
            .with_session("c1", |s| s.turns.iter().map(|t| t.prompt.clone()).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(prompts, vec!["two", "three"]);
    }

    #[test]
    fn new_runtime_session_can_clear_history() {
        let store = SessionStore::new(10, 3600);
        store.record_turn("c1", reply("one"));
        store.start_runtime_session("c1", "session-2".to_string(), true);
        assert_eq!(store.with_session("c1", |s| s.turns.len()), Some(0));
    }

    #[test]
    fn notice_is_shown_once() {
        let store = SessionStore::new(10, 3600);
        store.ensure("c1");
        store.set_notice("c1", "Upload a JPG or PNG file");
        assert_eq!(store.take_notice("c1").as_deref(), Some("Upload a JPG or PNG file"));
        assert!(store.take_notice("c1").is_none());
    }

    #[test]
    fn idle_sessions_are_evicted() {
        let store = SessionStore::new(10, 3600);
        store.ensure("c1");
        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.len(), 1);

        let store = SessionStore::new(10, 0);
        store.ensure("c1");
        store.record_turn("c2", reply("one"));
        assert_eq!(store.evict_idle(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn session_ids_are_distinct_within_a_second() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("session-"));
        assert_ne!(a, b);
    }
}
