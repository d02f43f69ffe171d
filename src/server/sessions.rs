use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ChatMessage, QuizQuestion};

/// Sessions older than this are invisible and dropped on the next insert.
const SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct QuizSession {
    pub questions: Vec<QuizQuestion>,
    /// Keyed by zero-based question index.
    pub answers: BTreeMap<usize, String>,
    pub submitted: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            answers: BTreeMap::new(),
            submitted: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
}

struct Entry<T> {
    value: T,
    created_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.created_at > now - Duration::hours(SESSION_TTL_HOURS)
    }
}

/// In-memory, per-visitor state keyed by an opaque session id.
pub struct SessionStore<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
}

impl<T> Default for SessionStore<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone> SessionStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, value: T) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        if entries.len() < before {
            log::debug!("🧹 Expired {} sessions", before - entries.len());
        }
        entries.insert(id.clone(), Entry { value, created_at: now });
        id
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .get(id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Runs `f` against the session under the write lock. `None` if the id is unknown or expired.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries
            .get_mut(id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| f(&mut entry.value))
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

pub type QuizSessions = SessionStore<QuizSession>;
pub type ChatSessions = SessionStore<ChatSession>;
