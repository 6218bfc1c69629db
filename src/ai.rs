//! Minimal OpenAI-compatible client for our use-cases.
//!
//! We only call chat.completions and request either plain text or a strict
//! JSON object, optionally with provider-side web search enabled. Calls are
//! instrumented and log model names, latencies, and token usage (not contents).
//!
//! Transient failures (transport errors, HTTP 5xx) get exactly one retry with
//! a short backoff; everything else is terminal for that request.
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{QuizQuestion, ResourceBundle};
use crate::util::fill_template;

const RETRY_BACKOFF: Duration = Duration::from_millis(400);

#[derive(Clone)]
pub struct OpenAI {
    pub client: reqwest::Client,
    pub api_key: String,
    pub base_url: String,
    pub fast_model: String,
    pub strong_model: String,
}

/// Shape of the quiz-generation JSON payload.
#[derive(Deserialize)]
pub struct QuizGen {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

impl OpenAI {
    /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let fast_model =
            std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let strong_model =
            std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .ok()?;

        Some(Self { client, api_key, base_url, fast_model, strong_model })
    }

    async fn send(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse, String> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut attempt = 0u8;
        loop {
            attempt += 1;
            let outcome = self
                .client
                .post(&url)
                .header(USER_AGENT, "sciencespark-backend/0.1")
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                .json(req)
                .send()
                .await;

            let retryable_err = match outcome {
                Ok(res) if res.status().is_success() => {
                    let body: ChatCompletionResponse =
                        res.json().await.map_err(|e| e.to_string())?;
                    if let Some(usage) = &body.usage {
                        info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "AI provider usage");
                    }
                    return Ok(body);
                }
                Ok(res) => {
                    let status = res.status();
                    let body = res.text().await.unwrap_or_default();
                    let msg = extract_provider_error(&body).unwrap_or(body);
                    let err = format!("AI provider HTTP {}: {}", status, msg);
                    if status.is_server_error() {
                        err
                    } else {
                        return Err(err);
                    }
                }
                Err(e) => format!("AI provider transport error: {}", e),
            };

            if attempt >= 2 {
                return Err(retryable_err);
            }
            warn!(error = %retryable_err, "Transient AI provider failure; retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    /// Plain-text chat completion. Used for greetings, tutor replies, feedback.
    #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
    async fn chat_plain(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, String> {
        let req = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessageReq { role: "system".into(), content: system.into() },
                ChatMessageReq { role: "user".into(), content: user.into() },
            ],
            temperature,
            response_format: None,
            web_search_options: None,
        };

        let body = self.send(&req).await?;
        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
            .trim()
            .to_string();
        Ok(text)
    }

    /// JSON-object chat completion. Generic over the target type T.
    /// `use_web_context` turns on provider-side web search augmentation.
    #[instrument(level = "info", skip(self, system, user), fields(model = %model, use_web_context = use_web_context))]
    async fn chat_json<T: for<'a> Deserialize<'a>>(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        use_web_context: bool,
    ) -> Result<T, String> {
        let req = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessageReq { role: "system".into(), content: system.into() },
                ChatMessageReq { role: "user".into(), content: user.into() },
            ],
            temperature,
            response_format: Some(ResponseFormat { r#type: "json_object".into() }),
            web_search_options: use_web_context.then(|| serde_json::json!({})),
        };

        let body = self.send(&req).await?;
        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
    }

    // --- High-level helpers (domain-specialized) ---

    /// Topic greeting for a fresh session. Cosmetic; callers swallow errors.
    #[instrument(level = "info", skip(self, prompts), fields(%topic, model = %self.fast_model))]
    pub async fn greeting(&self, prompts: &Prompts, topic: &str) -> Result<String, String> {
        let user = fill_template(&prompts.greeting_user_template, &[("topic", topic)]);
        self.chat_plain(&self.fast_model, &prompts.tutor_persona, &user, 0.7).await
    }

    /// Tutoring reply given the windowed conversation history.
    #[instrument(level = "info", skip(self, prompts, history, question),
                 fields(history_len = history.len(), question_len = question.len(), model = %self.strong_model))]
    pub async fn tutor_reply(
        &self,
        prompts: &Prompts,
        history: &str,
        question: &str,
    ) -> Result<String, String> {
        let user = fill_template(
            &prompts.reply_user_template,
            &[("history", history), ("question", question)],
        );
        self.chat_plain(&self.strong_model, &prompts.tutor_persona, &user, 0.7).await
    }

    /// Quiz payload generation. Structural validation happens in the caller.
    #[instrument(level = "info", skip(self, prompts, topic, stage),
                 fields(%topic, %difficulty, question_count = question_count, model = %self.strong_model))]
    pub async fn generate_quiz_payload(
        &self,
        prompts: &Prompts,
        topic: &str,
        stage: &str,
        difficulty: &str,
        question_count: usize,
    ) -> Result<QuizGen, String> {
        let user = fill_template(
            &prompts.quiz_user_template,
            &[
                ("topic", topic),
                ("stage", stage),
                ("difficulty", difficulty),
                ("question_count", &question_count.to_string()),
            ],
        );
        let start = std::time::Instant::now();
        let result = self
            .chat_json::<QuizGen>(&self.strong_model, &prompts.quiz_system, &user, 0.8, false)
            .await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => info!(?elapsed, "Quiz payload received"),
            Err(e) => error!(?elapsed, error = %e, "Model call failed during quiz generation"),
        }
        result
    }

    /// Post-attempt feedback text. Cosmetic; callers fall back on error.
    #[instrument(level = "info", skip(self, prompts, topic, missed), fields(%topic, score = score, model = %self.fast_model))]
    pub async fn attempt_feedback(
        &self,
        prompts: &Prompts,
        topic: &str,
        score: u32,
        correct: usize,
        total: usize,
        missed: &str,
    ) -> Result<String, String> {
        let user = fill_template(
            &prompts.feedback_user_template,
            &[
                ("topic", topic),
                ("score", &score.to_string()),
                ("correct", &correct.to_string()),
                ("total", &total.to_string()),
                ("missed", missed),
            ],
        );
        self.chat_plain(&self.fast_model, &prompts.tutor_persona, &user, 0.6).await
    }

    /// Structured resource bundle, generated with web context enabled.
    #[instrument(level = "info", skip(self, prompts, outcomes), fields(%topic, %level, model = %self.strong_model))]
    pub async fn generate_resources(
        &self,
        prompts: &Prompts,
        topic: &str,
        outcomes: &[String],
        level: &str,
    ) -> Result<ResourceBundle, String> {
        let user = fill_template(
            &prompts.resources_user_template,
            &[("topic", topic), ("outcomes", &outcomes.join(", ")), ("level", level)],
        );
        self.chat_json::<ResourceBundle>(&self.strong_model, &prompts.resources_system, &user, 0.7, true)
            .await
    }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_search_options: Option<serde_json::Value>,
}
#[derive(Serialize)]
struct ChatMessageReq {
    role: String,
    content: String,
}
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    r#type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
    content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

/// Try to extract a clean error message from a provider error body.
fn extract_provider_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct EWrap {
        error: EObj,
    }
    #[derive(Deserialize)]
    struct EObj {
        message: String,
    }
    serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_extraction() {
        let body = r#"{"error":{"message":"rate limited","type":"requests"}}"#;
        assert_eq!(extract_provider_error(body).as_deref(), Some("rate limited"));
        assert!(extract_provider_error("not json").is_none());
    }

    #[test]
    fn quiz_gen_parses_expected_shape() {
        let json = r#"{"title":"Forces Basics","questions":[{"question":"q","options":["a","b","c","d"],"correct_answer":2,"explanation":"e"}]}"#;
        let gen: QuizGen = serde_json::from_str(json).expect("parse");
        assert_eq!(gen.title, "Forces Basics");
        assert_eq!(gen.questions.len(), 1);
        assert_eq!(gen.questions[0].correct_answer, 2);
    }
}
