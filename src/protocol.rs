//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ChatSession, Difficulty, Quiz, ResourceBundle, Topic};
use crate::progress::{DashboardStats, OutcomeProgress};
use crate::quiz::AttemptResult;

/// Messages the client can send over WebSocket. Identity travels in the
/// message; there is no ambient current-user state on the connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        #[serde(rename = "studentId")]
        student_id: String,
        topic: Option<String>,
    },
    SendMessage {
        #[serde(rename = "sessionId")]
        session_id: String,
        text: String,
    },
    GenerateQuiz {
        #[serde(rename = "topicId")]
        topic_id: String,
        difficulty: Difficulty,
        #[serde(rename = "questionCount")]
        question_count: usize,
    },
    SubmitQuiz {
        #[serde(rename = "studentId")]
        student_id: String,
        #[serde(rename = "quizId")]
        quiz_id: String,
        answers: Vec<usize>,
    },
    Feedback {
        #[serde(rename = "attemptId")]
        attempt_id: String,
    },
    ListTopics,
    GetCurrentTopic,
    SetCurrentTopic {
        #[serde(rename = "topicId")]
        topic_id: Option<String>,
    },
    ListSessions {
        #[serde(rename = "studentId")]
        student_id: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    GetMessages {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    ListQuizzes {
        #[serde(default)]
        limit: Option<usize>,
    },
    GetResources {
        topic: String,
    },
    GenerateResources {
        topic: String,
        #[serde(default)]
        outcomes: Vec<String>,
        #[serde(default)]
        level: Option<String>,
    },
    DashboardStats {
        #[serde(rename = "studentId")]
        student_id: String,
    },
    OutcomeProgress {
        #[serde(rename = "studentId")]
        student_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Topics { topics: Vec<Topic> },
    CurrentTopic {
        #[serde(rename = "topicId")]
        topic_id: Option<String>,
    },
    Session { session: ChatSession },
    Sessions { sessions: Vec<ChatSession> },
    Messages { messages: Vec<ChatMessage> },
    Reply { text: String },
    Quiz { quiz: Quiz },
    Quizzes { quizzes: Vec<Quiz> },
    AttemptResult { result: AttemptResult },
    Feedback { text: String },
    Resources { topic: String, bundle: Option<ResourceBundle> },
    Stats { stats: DashboardStats },
    Outcomes { outcomes: Vec<OutcomeProgress> },
    Error { message: String },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartSessionIn {
    #[serde(rename = "studentId")]
    pub student_id: String,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub text: String,
}
#[derive(Serialize)]
pub struct SendMessageOut {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    #[serde(rename = "studentId")]
    pub student_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuizIn {
    #[serde(rename = "topicId")]
    pub topic_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(rename = "questionCount")]
    pub question_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizIn {
    #[serde(rename = "studentId")]
    pub student_id: String,
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    pub answers: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackIn {
    #[serde(rename = "attemptId")]
    pub attempt_id: String,
}
#[derive(Serialize)]
pub struct FeedbackOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ResourcesQuery {
    pub topic: String,
}
#[derive(Serialize)]
pub struct ResourcesOut {
    pub topic: String,
    pub bundle: Option<ResourceBundle>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResourcesIn {
    pub topic: String,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentTopicIn {
    #[serde(rename = "topicId")]
    pub topic_id: Option<String>,
}
#[derive(Serialize)]
pub struct CurrentTopicOut {
    #[serde(rename = "topicId")]
    pub topic_id: Option<String>,
}

#[derive(Serialize)]
pub struct MessagesOut {
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct SessionsOut {
    pub sessions: Vec<ChatSession>,
}

#[derive(Serialize)]
pub struct QuizzesOut {
    pub quizzes: Vec<Quiz>,
}

#[derive(Serialize)]
pub struct OutcomesOut {
    pub outcomes: Vec<OutcomeProgress>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ws_messages_parse_with_camel_case_keys() {
        let m: ClientWsMessage = serde_json::from_str(
            r#"{"type":"send_message","sessionId":"s1","text":"what is a force?"}"#,
        )
        .expect("parse");
        assert!(matches!(m, ClientWsMessage::SendMessage { .. }));

        let m: ClientWsMessage = serde_json::from_str(
            r#"{"type":"generate_quiz","topicId":"forces","difficulty":"beginner","questionCount":5}"#,
        )
        .expect("parse");
        match m {
            ClientWsMessage::GenerateQuiz { topic_id, difficulty, question_count } => {
                assert_eq!(topic_id, "forces");
                assert_eq!(difficulty, Difficulty::Beginner);
                assert_eq!(question_count, 5);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn browser_state_messages_parse() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"list_topics"}"#).expect("parse");
        assert!(matches!(m, ClientWsMessage::ListTopics));

        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"set_current_topic","topicId":"forces"}"#).expect("parse");
        match m {
            ClientWsMessage::SetCurrentTopic { topic_id } => {
                assert_eq!(topic_id.as_deref(), Some("forces"));
            }
            other => panic!("unexpected message: {other:?}"),
        }

        // Clearing the selection sends an explicit null.
        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"set_current_topic","topicId":null}"#).expect("parse");
        assert!(matches!(m, ClientWsMessage::SetCurrentTopic { topic_id: None }));
    }

    #[test]
    fn server_error_serializes_with_type_tag() {
        let out = serde_json::to_string(&ServerWsMessage::Error { message: "boom".into() })
            .expect("serialize");
        assert!(out.contains(r#""type":"error""#));
        assert!(out.contains("boom"));
    }
}
