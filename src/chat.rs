//! Session orchestration: starting conversations and exchanging messages.
//!
//! Ordering guarantee: within one session, messages append strictly in call
//! order. A per-session async lock serializes exchanges, so a second send
//! cannot slot its user message between another call's user message and
//! assistant reply.

use tracing::{error, info, instrument};

use crate::config::{CONTEXT_WINDOW, LAST_MESSAGE_PREVIEW};
use crate::domain::{ChatMessage, ChatSession, Role};
use crate::error::TutorError;
use crate::state::AppState;
use crate::store::SessionPatch;
use crate::util::truncate_chars;

/// Create a session for a student. When a topic is given, a greeting is
/// generated and persisted as the first assistant message; greeting failure
/// is logged only and the session stays usable.
#[instrument(level = "info", skip(state), fields(%student_id, topic = topic.unwrap_or("general")))]
pub async fn start_session(
    state: &AppState,
    student_id: &str,
    topic: Option<&str>,
) -> Result<ChatSession, TutorError> {
    let (topic_key, title) = match topic {
        Some(t) => (t.to_string(), format!("Learning about {t}")),
        None => ("general".to_string(), "New Conversation".to_string()),
    };
    let session = state.store.create_session(student_id, &topic_key, &title).await;
    info!(target: "tutor", session_id = %session.id, topic = %topic_key, "Session started");

    if let Some(t) = topic {
        if let Some(ai) = &state.openai {
            match ai.greeting(&state.prompts, t).await {
                Ok(greeting) => {
                    state.store.create_message(&session.id, Role::Assistant, &greeting).await;
                }
                Err(e) => {
                    // Cosmetic: the chat works without an opening message.
                    error!(target: "tutor", session_id = %session.id, error = %e, "Greeting generation failed");
                }
            }
        }
    }

    Ok(session)
}

/// Persist the student's message, ask the tutor model with a bounded context
/// window, persist the reply, and refresh the session counters.
///
/// On any failure past the first write the user message stays persisted (no
/// rollback) and the caller gets a generic send error.
#[instrument(level = "info", skip(state, text), fields(%session_id, text_len = text.len()))]
pub async fn send_message(
    state: &AppState,
    session_id: &str,
    text: &str,
) -> Result<String, TutorError> {
    if state.store.get_session(session_id).await.is_none() {
        return Err(TutorError::NotFound { kind: "session", id: session_id.to_string() });
    }

    let lock = state.session_lock(session_id).await;
    let _guard = lock.lock().await;

    state.store.create_message(session_id, Role::User, text).await;

    let ai = state.openai.as_ref().ok_or(TutorError::AiUnavailable)?;

    let history = state.store.messages_for_session(session_id).await;
    let windowed = format_history(&history, CONTEXT_WINDOW);

    let reply = ai
        .tutor_reply(&state.prompts, &windowed, text)
        .await
        .map_err(TutorError::Generation)?;

    state.store.create_message(session_id, Role::Assistant, &reply).await;

    // Counter refresh is best-effort; an error here still returns the reply.
    let patch = SessionPatch {
        last_message: truncate_chars(text, LAST_MESSAGE_PREVIEW),
        message_count: (history.len() + 1) as u32,
    };
    if let Err(e) = state.store.update_session(session_id, patch).await {
        error!(target: "tutor", %session_id, error = %e, "Session counter update failed");
    }

    info!(target: "tutor", %session_id, reply_len = reply.len(), "Exchange completed");
    Ok(reply)
}

/// Render the last `window` messages as "Student:"/"Teacher:" lines for the
/// tutor prompt. Older messages never enter the prompt.
fn format_history(messages: &[ChatMessage], window: usize) -> String {
    let start = messages.len().saturating_sub(window);
    messages[start..]
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "Student",
                Role::Assistant => "Teacher",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use chrono::Utc;

    fn msg(role: Role, content: &str, seq: u64) -> ChatMessage {
        ChatMessage {
            id: format!("m{seq}"),
            session_id: "s".into(),
            role,
            content: content.into(),
            seq,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn history_window_keeps_last_six() {
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                msg(role, &format!("m{i}"), i)
            })
            .collect();
        let rendered = format_history(&messages, 6);
        assert!(!rendered.contains("m3"));
        assert!(rendered.contains("m4"));
        assert!(rendered.contains("m9"));
        assert!(rendered.starts_with("Student: m4"));
    }

    #[test]
    fn history_window_tolerates_short_conversations() {
        let messages = vec![msg(Role::User, "hello", 0)];
        assert_eq!(format_history(&messages, 6), "Student: hello");
        assert_eq!(format_history(&[], 6), "");
    }

    #[tokio::test]
    async fn start_session_without_topic() {
        let state = AppState::for_tests();
        let s = start_session(&state, "stu-1", None).await.expect("session");
        assert_eq!(s.title, "New Conversation");
        assert_eq!(s.topic, "general");
        assert_eq!(s.message_count, 0);
    }

    #[tokio::test]
    async fn start_session_with_topic_survives_missing_ai() {
        let state = AppState::for_tests();
        let s = start_session(&state, "stu-1", Some("forces")).await.expect("session");
        assert_eq!(s.title, "Learning about forces");
        // No AI configured: greeting silently skipped, session still usable.
        assert!(state.store.messages_for_session(&s.id).await.is_empty());
    }

    #[tokio::test]
    async fn failed_send_keeps_user_message() {
        let state = AppState::for_tests();
        let s = start_session(&state, "stu-1", None).await.expect("session");
        let err = send_message(&state, &s.id, "what is a force?").await.unwrap_err();
        assert!(matches!(err, TutorError::AiUnavailable));
        let msgs = state.store.messages_for_session(&s.id).await;
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].role, Role::User);
        // Counters untouched on a failed exchange.
        let session = state.store.get_session(&s.id).await.expect("session");
        assert_eq!(session.message_count, 0);
    }

    #[tokio::test]
    async fn concurrent_exchanges_do_not_interleave() {
        use std::sync::Arc;

        let state = Arc::new(AppState::for_tests());
        let s = start_session(&state, "stu-1", None).await.expect("session");

        // Two tasks race through the same exchange critical section that
        // send_message uses; yielding between the two writes gives the other
        // task every chance to interleave if the lock were broken.
        async fn exchange(state: Arc<AppState>, session_id: String, n: usize) {
            let lock = state.session_lock(&session_id).await;
            let _guard = lock.lock().await;
            state.store.create_message(&session_id, Role::User, &format!("question {n}")).await;
            tokio::task::yield_now().await;
            state.store.create_message(&session_id, Role::Assistant, &format!("answer {n}")).await;
        }

        let (a, b) = tokio::join!(
            tokio::spawn(exchange(state.clone(), s.id.clone(), 1)),
            tokio::spawn(exchange(state.clone(), s.id.clone(), 2)),
        );
        a.expect("task");
        b.expect("task");

        let msgs = state.store.messages_for_session(&s.id).await;
        assert_eq!(msgs.len(), 4);
        for pair in msgs.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            let n = pair[0].content.strip_prefix("question ").expect("user message first");
            assert_eq!(pair[1].content, format!("answer {n}"), "reply split from its question");
        }
    }

    #[tokio::test]
    async fn send_to_unknown_session_is_not_found() {
        let state = AppState::for_tests();
        let err = send_message(&state, "missing", "hi").await.unwrap_err();
        assert!(matches!(err, TutorError::NotFound { kind: "session", .. }));
    }
}
