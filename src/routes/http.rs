//! HTTP endpoint handlers. Thin wrappers that forward to the orchestration
//! layer; each is instrumented and logs parameters plus basic result info.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::catalogue::{NESA_OUTCOMES, TOPICS};
use crate::error::TutorError;
use crate::protocol::*;
use crate::quiz::AttemptResult;
use crate::state::AppState;
use crate::{chat, progress, quiz, resources};

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_list_topics() -> impl IntoResponse {
    Json(TOPICS)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_current_topic(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CurrentTopicOut { topic_id: state.cache.current_topic() })
}

#[instrument(level = "info", skip(state, body), fields(topic_id = ?body.topic_id))]
pub async fn http_set_current_topic(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CurrentTopicIn>,
) -> impl IntoResponse {
    state.cache.set_current_topic(body.topic_id.as_deref());
    Json(CurrentTopicOut { topic_id: body.topic_id })
}

#[instrument(level = "info", skip(state), fields(%q.student_id))]
pub async fn http_list_sessions(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> impl IntoResponse {
    let sessions = state.store.sessions_for_student(&q.student_id, q.limit).await;
    Json(SessionsOut { sessions })
}

#[instrument(level = "info", skip(state, body), fields(%body.student_id, topic = ?body.topic))]
pub async fn http_start_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSessionIn>,
) -> Result<impl IntoResponse, TutorError> {
    let session = chat::start_session(&state, &body.student_id, body.topic.as_deref()).await?;
    info!(target: "tutor", session_id = %session.id, "HTTP session started");
    Ok(Json(session))
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_list_messages(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MessagesQuery>,
) -> impl IntoResponse {
    let messages = state.store.messages_for_session(&q.session_id).await;
    Json(MessagesOut { messages })
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, text_len = body.text.len()))]
pub async fn http_send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageIn>,
) -> Result<impl IntoResponse, TutorError> {
    let reply = chat::send_message(&state, &body.session_id, &body.text).await?;
    Ok(Json(SendMessageOut { reply }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_quizzes(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> impl IntoResponse {
    let quizzes = state.store.list_quizzes(q.limit).await;
    Json(QuizzesOut { quizzes })
}

#[instrument(level = "info", skip(state, body), fields(%body.topic_id, question_count = body.question_count))]
pub async fn http_generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateQuizIn>,
) -> Result<impl IntoResponse, TutorError> {
    let quiz = quiz::generate_quiz(&state, &body.topic_id, body.difficulty, body.question_count).await?;
    info!(target: "quiz", quiz_id = %quiz.id, "HTTP quiz generated");
    Ok(Json(quiz))
}

#[instrument(level = "info", skip(state, body), fields(%body.student_id, %body.quiz_id))]
pub async fn http_submit_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitQuizIn>,
) -> Result<impl IntoResponse, TutorError> {
    let quiz = state.store.get_quiz(&body.quiz_id).await.ok_or_else(|| TutorError::NotFound {
        kind: "quiz",
        id: body.quiz_id.clone(),
    })?;
    let answers = body.answers.iter().copied().enumerate().collect();
    let result = quiz::submit_attempt(&state, &body.student_id, &quiz, &answers).await?;
    info!(target: "quiz", attempt_id = %result.attempt_id, score = result.score, "HTTP attempt submitted");
    Ok(Json(result))
}

#[instrument(level = "info", skip(state, body), fields(%body.attempt_id))]
pub async fn http_quiz_feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackIn>,
) -> Result<impl IntoResponse, TutorError> {
    let attempt = state.store.get_attempt(&body.attempt_id).await.ok_or_else(|| {
        TutorError::NotFound { kind: "attempt", id: body.attempt_id.clone() }
    })?;
    let quiz = state.store.get_quiz(&attempt.quiz_id).await.ok_or_else(|| {
        TutorError::NotFound { kind: "quiz", id: attempt.quiz_id.clone() }
    })?;
    let result = AttemptResult {
        attempt_id: attempt.id.clone(),
        quiz,
        results: attempt.answers.clone(),
        score: attempt.score,
        passed: attempt.passed,
    };
    let text = quiz::generate_feedback(&state, &result).await;
    Ok(Json(FeedbackOut { text }))
}

#[instrument(level = "info", skip(state), fields(%q.topic))]
pub async fn http_get_resources(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ResourcesQuery>,
) -> impl IntoResponse {
    let bundle = resources::get_resources(&state, &q.topic);
    Json(ResourcesOut { topic: q.topic, bundle })
}

#[instrument(level = "info", skip(state, body), fields(%body.topic))]
pub async fn http_generate_resources(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateResourcesIn>,
) -> Result<impl IntoResponse, TutorError> {
    let level = body.level.as_deref().unwrap_or("intermediate");
    let bundle = resources::generate_and_cache(&state, &body.topic, &body.outcomes, level).await?;
    Ok(Json(ResourcesOut { topic: body.topic, bundle: Some(bundle) }))
}

#[instrument(level = "info", skip(state), fields(%q.student_id))]
pub async fn http_dashboard(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> impl IntoResponse {
    let sessions = state.store.sessions_for_student(&q.student_id, q.limit).await;
    let attempts = state.store.attempts_for_student(&q.student_id, q.limit).await;
    Json(progress::dashboard_stats(&sessions, &attempts))
}

#[instrument(level = "info", skip(state), fields(%q.student_id))]
pub async fn http_outcomes(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> impl IntoResponse {
    let attempts = state.store.attempts_for_student(&q.student_id, None).await;
    Json(OutcomesOut { outcomes: progress::outcome_progress(&attempts, NESA_OUTCOMES) })
}
