//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to the orchestration layer. We reply with one JSON message per
//! request; errors come back as `{"type":"error"}` rather than closing.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::catalogue::{NESA_OUTCOMES, TOPICS};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::quiz::AttemptResult;
use crate::state::AppState;
use crate::{chat, progress, quiz, resources};

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(target: "sciencespark_backend", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!(target: "sciencespark_backend", "WebSocket connected");
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(txt) => {
                // Parse, dispatch, serialize response.
                let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
                    Ok(incoming) => {
                        debug!(target: "sciencespark_backend", "WS received: {:?}", &incoming);
                        handle_client_ws(incoming, &state).await
                    }
                    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
                };

                let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
                    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
                        .to_string()
                });

                if let Err(e) = socket.send(Message::Text(out)).await {
                    error!(target: "sciencespark_backend", error = %e, "WS send error");
                    break;
                }
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    info!(target: "sciencespark_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
    match msg {
        ClientWsMessage::Ping => ServerWsMessage::Pong,

        ClientWsMessage::ListTopics => ServerWsMessage::Topics { topics: TOPICS.to_vec() },

        ClientWsMessage::GetCurrentTopic => {
            ServerWsMessage::CurrentTopic { topic_id: state.cache.current_topic() }
        }

        ClientWsMessage::SetCurrentTopic { topic_id } => {
            state.cache.set_current_topic(topic_id.as_deref());
            ServerWsMessage::CurrentTopic { topic_id }
        }

        ClientWsMessage::ListSessions { student_id, limit } => ServerWsMessage::Sessions {
            sessions: state.store.sessions_for_student(&student_id, limit).await,
        },

        ClientWsMessage::GetMessages { session_id } => ServerWsMessage::Messages {
            messages: state.store.messages_for_session(&session_id).await,
        },

        ClientWsMessage::ListQuizzes { limit } => {
            ServerWsMessage::Quizzes { quizzes: state.store.list_quizzes(limit).await }
        }

        ClientWsMessage::StartSession { student_id, topic } => {
            match chat::start_session(state, &student_id, topic.as_deref()).await {
                Ok(session) => {
                    info!(target: "tutor", session_id = %session.id, "WS session started");
                    ServerWsMessage::Session { session }
                }
                Err(e) => ServerWsMessage::Error { message: e.to_string() },
            }
        }

        ClientWsMessage::SendMessage { session_id, text } => {
            match chat::send_message(state, &session_id, &text).await {
                Ok(reply) => ServerWsMessage::Reply { text: reply },
                Err(e) => ServerWsMessage::Error { message: e.to_string() },
            }
        }

        ClientWsMessage::GenerateQuiz { topic_id, difficulty, question_count } => {
            match quiz::generate_quiz(state, &topic_id, difficulty, question_count).await {
                Ok(q) => {
                    info!(target: "quiz", quiz_id = %q.id, "WS quiz generated");
                    ServerWsMessage::Quiz { quiz: q }
                }
                Err(e) => ServerWsMessage::Error { message: e.to_string() },
            }
        }

        ClientWsMessage::SubmitQuiz { student_id, quiz_id, answers } => {
            let Some(q) = state.store.get_quiz(&quiz_id).await else {
                return ServerWsMessage::Error { message: format!("unknown quiz: {quiz_id}") };
            };
            let map = answers.iter().copied().enumerate().collect();
            match quiz::submit_attempt(state, &student_id, &q, &map).await {
                Ok(result) => ServerWsMessage::AttemptResult { result },
                Err(e) => ServerWsMessage::Error { message: e.to_string() },
            }
        }

        ClientWsMessage::Feedback { attempt_id } => {
            let Some(attempt) = state.store.get_attempt(&attempt_id).await else {
                return ServerWsMessage::Error { message: format!("unknown attempt: {attempt_id}") };
            };
            let Some(q) = state.store.get_quiz(&attempt.quiz_id).await else {
                return ServerWsMessage::Error { message: format!("unknown quiz: {}", attempt.quiz_id) };
            };
            let result = AttemptResult {
                attempt_id: attempt.id.clone(),
                quiz: q,
                results: attempt.answers.clone(),
                score: attempt.score,
                passed: attempt.passed,
            };
            ServerWsMessage::Feedback { text: quiz::generate_feedback(state, &result).await }
        }

        ClientWsMessage::GetResources { topic } => {
            let bundle = resources::get_resources(state, &topic);
            ServerWsMessage::Resources { topic, bundle }
        }

        ClientWsMessage::GenerateResources { topic, outcomes, level } => {
            let level = level.as_deref().unwrap_or("intermediate");
            match resources::generate_and_cache(state, &topic, &outcomes, level).await {
                Ok(bundle) => ServerWsMessage::Resources { topic, bundle: Some(bundle) },
                Err(e) => ServerWsMessage::Error { message: e.to_string() },
            }
        }

        ClientWsMessage::DashboardStats { student_id } => {
            let sessions = state.store.sessions_for_student(&student_id, None).await;
            let attempts = state.store.attempts_for_student(&student_id, None).await;
            ServerWsMessage::Stats { stats: progress::dashboard_stats(&sessions, &attempts) }
        }

        ClientWsMessage::OutcomeProgress { student_id } => {
            let attempts = state.store.attempts_for_student(&student_id, None).await;
            ServerWsMessage::Outcomes {
                outcomes: progress::outcome_progress(&attempts, NESA_OUTCOMES),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[tokio::test]
    async fn topic_state_round_trips_over_ws() {
        let state = AppState::for_tests();

        match handle_client_ws(ClientWsMessage::ListTopics, &state).await {
            ServerWsMessage::Topics { topics } => assert_eq!(topics.len(), TOPICS.len()),
            other => panic!("unexpected reply: {other:?}"),
        }

        let reply = handle_client_ws(
            ClientWsMessage::SetCurrentTopic { topic_id: Some("forces".into()) },
            &state,
        )
        .await;
        assert!(matches!(reply, ServerWsMessage::CurrentTopic { .. }));

        match handle_client_ws(ClientWsMessage::GetCurrentTopic, &state).await {
            ServerWsMessage::CurrentTopic { topic_id } => {
                assert_eq!(topic_id.as_deref(), Some("forces"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn message_history_and_outcomes_are_served_over_ws() {
        let state = AppState::for_tests();
        let s = state.store.create_session("stu-1", "forces", "Forces chat").await;
        state.store.create_message(&s.id, Role::User, "what is a force?").await;

        match handle_client_ws(ClientWsMessage::GetMessages { session_id: s.id.clone() }, &state).await {
            ServerWsMessage::Messages { messages } => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].content, "what is a force?");
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        match handle_client_ws(
            ClientWsMessage::ListSessions { student_id: "stu-1".into(), limit: None },
            &state,
        )
        .await
        {
            ServerWsMessage::Sessions { sessions } => assert_eq!(sessions.len(), 1),
            other => panic!("unexpected reply: {other:?}"),
        }

        match handle_client_ws(
            ClientWsMessage::OutcomeProgress { student_id: "stu-1".into() },
            &state,
        )
        .await
        {
            ServerWsMessage::Outcomes { outcomes } => {
                assert_eq!(outcomes.len(), NESA_OUTCOMES.len());
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
