//! Domain records: chat sessions/messages, quizzes, attempts, and resource bundles.
//!
//! Sessions and attempts are owned by the student that created them; quizzes
//! are shared read-only once generated; messages are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Quiz difficulty requested at generation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// One tutoring conversation. `last_message` and `message_count` are
/// best-effort denormalized fields refreshed after every exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub student_id: String,
    pub topic: String,
    pub title: String,
    pub last_message: String,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A single chat message. Immutable once created; ordered within a session
/// by `seq` (store-assigned, monotonic, survives equal timestamps).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

/// One multiple-choice question: exactly 4 options, one correct index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

/// A generated quiz. Immutable after creation; shared by all students.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub topic: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub nesa_outcomes: Vec<String>,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Per-question outcome of a submitted attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub selected: usize,
    pub correct: usize,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub explanation: String,
}

/// A completed quiz attempt. Immutable; `answers.len()` always equals the
/// quiz's question count. `nesa_outcomes` is copied from the quiz at creation
/// so progress can be filtered per outcome without a quiz lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: String,
    pub student_id: String,
    pub quiz_id: String,
    pub answers: Vec<AnswerRecord>,
    pub score: u32,
    pub passed: bool,
    pub nesa_outcomes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Static catalogue entry; not persisted, read-only reference data.
#[derive(Clone, Debug, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub stage: u8,
    pub difficulty: Difficulty,
    pub outcomes: &'static [&'static str],
}

// --- Resource recommendation bundle ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceVideo {
    pub title: String,
    pub description: String,
    pub channel: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceSimulation {
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceReading {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceActivity {
    pub title: String,
    pub description: String,
    pub materials: String,
}

/// The structured learning-resource guide generated per topic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceBundle {
    #[serde(default)]
    pub videos: Vec<ResourceVideo>,
    #[serde(default)]
    pub simulations: Vec<ResourceSimulation>,
    #[serde(default)]
    pub readings: Vec<ResourceReading>,
    #[serde(default)]
    pub activities: Vec<ResourceActivity>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub australian_connection: String,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Intermediate
    }
}
