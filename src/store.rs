//! In-process entity store: the generic create/update/list/filter contract
//! over the four record kinds. No transactional guarantees, no deletes.
//!
//! Messages get a store-assigned monotonic `seq` so ordering within a session
//! is stable even when two writes land on the same timestamp.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{ChatMessage, ChatSession, Quiz, QuizAttempt, Role};
use crate::error::TutorError;

/// Fields of a session that mutate after an exchange.
#[derive(Debug, Clone)]
pub struct SessionPatch {
    pub last_message: String,
    pub message_count: u32,
}

#[derive(Default)]
pub struct EntityStore {
    sessions: RwLock<HashMap<String, ChatSession>>,
    messages: RwLock<HashMap<String, ChatMessage>>,
    quizzes: RwLock<HashMap<String, Quiz>>,
    attempts: RwLock<HashMap<String, QuizAttempt>>,
    msg_seq: AtomicU64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- ChatSession ---

    #[instrument(level = "debug", skip(self, title), fields(%student_id, %topic))]
    pub async fn create_session(&self, student_id: &str, topic: &str, title: &str) -> ChatSession {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            topic: topic.to_string(),
            title: title.to_string(),
            last_message: "Started new conversation".into(),
            message_count: 0,
            created_at: Utc::now(),
        };
        self.sessions.write().await.insert(session.id.clone(), session.clone());
        session
    }

    pub async fn get_session(&self, id: &str) -> Option<ChatSession> {
        self.sessions.read().await.get(id).cloned()
    }

    #[instrument(level = "debug", skip(self, patch), fields(%id))]
    pub async fn update_session(&self, id: &str, patch: SessionPatch) -> Result<(), TutorError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| TutorError::NotFound {
            kind: "session",
            id: id.to_string(),
        })?;
        session.last_message = patch.last_message;
        session.message_count = patch.message_count;
        Ok(())
    }

    /// Sessions owned by a student, newest first, optionally limited.
    pub async fn sessions_for_student(&self, student_id: &str, limit: Option<usize>) -> Vec<ChatSession> {
        let sessions = self.sessions.read().await;
        let mut out: Vec<ChatSession> = sessions
            .values()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(n) = limit {
            out.truncate(n);
        }
        out
    }

    // --- ChatMessage ---

    #[instrument(level = "debug", skip(self, content), fields(%session_id, role = ?role))]
    pub async fn create_message(&self, session_id: &str, role: Role, content: &str) -> ChatMessage {
        let msg = ChatMessage {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            seq: self.msg_seq.fetch_add(1, Ordering::SeqCst),
            created_at: Utc::now(),
        };
        self.messages.write().await.insert(msg.id.clone(), msg.clone());
        msg
    }

    /// All messages of a session in creation order.
    pub async fn messages_for_session(&self, session_id: &str) -> Vec<ChatMessage> {
        let messages = self.messages.read().await;
        let mut out: Vec<ChatMessage> = messages
            .values()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| m.seq);
        out
    }

    // --- Quiz ---

    #[instrument(level = "debug", skip(self, quiz), fields(id = %quiz.id, topic = %quiz.topic))]
    pub async fn insert_quiz(&self, quiz: Quiz) {
        self.quizzes.write().await.insert(quiz.id.clone(), quiz);
    }

    pub async fn get_quiz(&self, id: &str) -> Option<Quiz> {
        self.quizzes.read().await.get(id).cloned()
    }

    /// All quizzes, newest first. Quizzes are shared; no owner filter.
    pub async fn list_quizzes(&self, limit: Option<usize>) -> Vec<Quiz> {
        let quizzes = self.quizzes.read().await;
        let mut out: Vec<Quiz> = quizzes.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(n) = limit {
            out.truncate(n);
        }
        out
    }

    // --- QuizAttempt ---

    #[instrument(level = "debug", skip(self, attempt), fields(id = %attempt.id, score = attempt.score))]
    pub async fn insert_attempt(&self, attempt: QuizAttempt) {
        self.attempts.write().await.insert(attempt.id.clone(), attempt);
    }

    pub async fn get_attempt(&self, id: &str) -> Option<QuizAttempt> {
        self.attempts.read().await.get(id).cloned()
    }

    /// Attempts owned by a student, newest first, optionally limited.
    pub async fn attempts_for_student(&self, student_id: &str, limit: Option<usize>) -> Vec<QuizAttempt> {
        let attempts = self.attempts.read().await;
        let mut out: Vec<QuizAttempt> = attempts
            .values()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(n) = limit {
            out.truncate(n);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn message_order_is_stable_by_seq() {
        let store = EntityStore::new();
        let s = store.create_session("stu-1", "forces", "Forces chat").await;
        for i in 0..5 {
            store.create_message(&s.id, Role::User, &format!("q{i}")).await;
            store.create_message(&s.id, Role::Assistant, &format!("a{i}")).await;
        }
        let msgs = store.messages_for_session(&s.id).await;
        assert_eq!(msgs.len(), 10);
        for pair in msgs.windows(2) {
            assert!(pair[0].seq < pair[1].seq, "messages reordered");
        }
        assert_eq!(msgs[0].content, "q0");
        assert_eq!(msgs[9].content, "a4");
    }

    #[tokio::test]
    async fn session_patch_updates_counters() {
        let store = EntityStore::new();
        let s = store.create_session("stu-1", "general", "New Conversation").await;
        assert_eq!(s.message_count, 0);
        store
            .update_session(&s.id, SessionPatch { last_message: "hi".into(), message_count: 2 })
            .await
            .expect("patch");
        let got = store.get_session(&s.id).await.expect("session");
        assert_eq!(got.message_count, 2);
        assert_eq!(got.last_message, "hi");
    }

    #[tokio::test]
    async fn updating_missing_session_fails() {
        let store = EntityStore::new();
        let err = store
            .update_session("nope", SessionPatch { last_message: String::new(), message_count: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::NotFound { kind: "session", .. }));
    }

    #[tokio::test]
    async fn student_filters_are_owner_scoped() {
        let store = EntityStore::new();
        store.create_session("a", "forces", "t").await;
        store.create_session("a", "energy", "t").await;
        store.create_session("b", "forces", "t").await;
        assert_eq!(store.sessions_for_student("a", None).await.len(), 2);
        assert_eq!(store.sessions_for_student("a", Some(1)).await.len(), 1);
        assert_eq!(store.sessions_for_student("c", None).await.len(), 0);
    }
}
