//! Loading agent configuration (prompt overrides) from TOML.
//!
//! Defaults are embedded and tuned for the NSW Science 7-10 (2023) syllabus;
//! `AGENT_CONFIG_PATH` may point at a TOML file overriding any of them.

use serde::Deserialize;
use tracing::{error, info};

/// Number of trailing messages re-read as conversational context per turn.
/// The context window is deliberately bounded; history never grows the prompt.
pub const CONTEXT_WINDOW: usize = 6;

/// `last_message` preview length on a session, in characters.
pub const LAST_MESSAGE_PREVIEW: usize = 100;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub prompts: Prompts,
}

/// Prompts used by the AI gateway. Override in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Fixed domain-expert persona prepended to every tutoring call.
    pub tutor_persona: String,
    // Chat
    pub greeting_user_template: String,
    pub reply_user_template: String,
    // Quiz generation + feedback
    pub quiz_system: String,
    pub quiz_user_template: String,
    pub feedback_user_template: String,
    pub feedback_fallback: String,
    // Resource recommendations
    pub resources_system: String,
    pub resources_user_template: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            tutor_persona: "You are an expert NSW Science teacher for Years 7-10 students (Stage 4 and Stage 5), teaching the NSW Science 7-10 (2023) syllabus. \
Stage 4 focus areas: Working Scientifically (SC4-WS-01 to SC4-WS-08), Observing the Universe, Forces, Cells and Classification, Solutions and Mixtures, Living Systems, Periodic Table and Atomic Structure, Change, Data Science 1. \
Stage 5 focus areas: Working Scientifically (SC5-WS-01 to SC5-WS-08), Energy, Disease, Materials, Environmental Sustainability, Genetics and Evolutionary Change, Reactions, Waves and Motion, Data Science 2. \
Teaching style: friendly, encouraging and age-appropriate (12-16 years old); use Australian examples and context; include Aboriginal and Torres Strait Islander perspectives when relevant; break down complex concepts simply; mention relevant NESA outcomes when appropriate; use emojis occasionally; emphasise working scientifically skills.".into(),
            greeting_user_template: "A student just started learning about: {topic}\n\nWrite a warm, engaging greeting (2-3 sentences) to:\n1. Welcome them enthusiastically\n2. Briefly mention why this topic is interesting and relevant to NSW students\n3. Ask what specific aspect they'd like to explore first\n\nBe friendly, encouraging and mention any relevant real-world Australian connections!".into(),
            reply_user_template: "Conversation so far:\n{history}\n\nStudent's latest question: \"{question}\"\n\nProvide a helpful, educational response that:\n- Answers their question clearly using NSW syllabus content\n- Uses Year 7-10 appropriate language\n- Includes Australian examples when relevant\n- Relates to working scientifically skills when appropriate\n- Mentions relevant NESA outcome codes if directly applicable\n\nKeep response concise (3-5 paragraphs max). Be warm and encouraging.".into(),
            quiz_system: "You are creating a science quiz for NSW students following the NSW Science 7-10 (2023) syllabus. Respond ONLY with strict JSON.".into(),
            quiz_user_template: "Topic: {topic}\nStage: {stage}\nDifficulty: {difficulty}\nNumber of questions: {question_count}\n\nCreate a quiz with {question_count} multiple-choice questions (4 options each, only one correct).\n\nRequirements:\n- Align questions with NSW Science 7-10 (2023) syllabus content\n- Use age-appropriate language for {stage}\n- Include Australian context and examples where relevant\n- Cover different aspects of the topic (concepts, applications, analysis)\n- Provide clear, educational explanations\n\nDifficulty guidelines:\n- Beginner: Basic recall and understanding\n- Intermediate: Application and analysis\n- Advanced: Synthesis, evaluation, and complex problem-solving\n\nReturn ONLY valid JSON in this exact format:\n{\"title\": \"Quiz title\", \"questions\": [{\"question\": \"Question text\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct_answer\": 0, \"explanation\": \"Why this answer is correct\"}]}".into(),
            feedback_user_template: "You are a supportive NSW Science teacher providing personalized feedback to a student.\n\nQuiz Details:\n- Topic: {topic}\n- Score: {score}%\n- Questions Correct: {correct}/{total}\n- Questions Missed: {missed}\n\nProvide encouraging, personalized feedback: celebrate what they did well, name 2-3 specific concepts to review based on missed questions, suggest practical next steps, and end with a motivating message. Keep it warm, age-appropriate, and under 300 words. Use Australian English. Do NOT include a signature or placeholder name at the end.".into(),
            feedback_fallback: "Great effort on this quiz! Keep practicing and you'll continue to improve. 🌟".into(),
            resources_system: "You are an expert NSW Science educator recommending free learning resources for Year 7-10 students. Verify links lead to real content. Respond ONLY with strict JSON.".into(),
            resources_user_template: "Generate personalized FREE learning resources for a Year 7-10 student.\n\nTopic: {topic}\nNESA Outcomes: {outcomes}\nStudent Level: {level}\n\nInclude:\n1. 4 recommended YouTube videos (mix Australian channels like ABC Education, CSIRO, Questacon with quality international channels)\n2. 3 free interactive simulations or educational pages (PhET, LabXchange, CK-12, BioInteractive, The Physics Classroom) with direct links\n3. 2-3 free reading resources (OpenStax, OER Commons, CK-12 FlexBooks) specific to the topic\n4. 2 hands-on activities using common household materials\n5. 3 key concepts aligned with the NESA outcomes\n6. A real-world Australian connection\n\nReturn ONLY valid JSON in this format:\n{\"videos\": [{\"title\": \"\", \"description\": \"\", \"channel\": \"\"}], \"simulations\": [{\"title\": \"\", \"description\": \"\", \"url\": \"\"}], \"readings\": [{\"title\": \"\", \"description\": \"\", \"url\": \"\", \"source\": \"\"}], \"activities\": [{\"title\": \"\", \"description\": \"\", \"materials\": \"\"}], \"key_concepts\": [\"\"], \"australian_connection\": \"\"}".into(),
        }
    }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO
/// error, returns None and the embedded defaults stay in effect.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
    let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
    match std::fs::read_to_string(&path) {
        Ok(s) => match toml::from_str::<AgentConfig>(&s) {
            Ok(cfg) => {
                info!(target: "sciencespark_backend", %path, "Loaded agent config (TOML)");
                Some(cfg)
            }
            Err(e) => {
                error!(target: "sciencespark_backend", %path, error = %e, "Failed to parse TOML config");
                None
            }
        },
        Err(e) => {
            error!(target: "sciencespark_backend", %path, error = %e, "Failed to read TOML config file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompts_carry_template_keys() {
        let p = Prompts::default();
        assert!(p.greeting_user_template.contains("{topic}"));
        assert!(p.reply_user_template.contains("{history}"));
        assert!(p.reply_user_template.contains("{question}"));
        for key in ["{topic}", "{stage}", "{difficulty}", "{question_count}"] {
            assert!(p.quiz_user_template.contains(key), "quiz template missing {key}");
        }
        for key in ["{topic}", "{score}", "{correct}", "{total}", "{missed}"] {
            assert!(p.feedback_user_template.contains(key), "feedback template missing {key}");
        }
        for key in ["{topic}", "{outcomes}", "{level}"] {
            assert!(p.resources_user_template.contains(key), "resources template missing {key}");
        }
    }

    #[test]
    fn partial_toml_override_keeps_defaults() {
        let cfg: AgentConfig =
            toml::from_str("[prompts]\nfeedback_fallback = \"Nice try!\"\n").expect("toml");
        assert_eq!(cfg.prompts.feedback_fallback, "Nice try!");
        assert!(cfg.prompts.tutor_persona.contains("NSW Science"));
    }
}
