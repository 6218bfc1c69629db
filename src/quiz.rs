//! Quiz lifecycle: AI generation, per-question administration, scoring, and
//! post-attempt feedback.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::catalogue::{stage_label, topic_by_id};
use crate::domain::{AnswerRecord, Difficulty, Quiz, QuizAttempt};
use crate::error::TutorError;
use crate::state::AppState;

/// Score at or above which an attempt passes.
pub const PASS_MARK: u32 = 70;

pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 10;

/// Everything the caller needs after submission.
#[derive(Clone, Debug, Serialize)]
pub struct AttemptResult {
    pub attempt_id: String,
    pub quiz: Quiz,
    pub results: Vec<AnswerRecord>,
    pub score: u32,
    pub passed: bool,
}

/// Generate a quiz for a catalogue topic and persist it.
///
/// The payload is validated structurally before anything is stored: non-empty
/// title, the requested number of questions is not enforced but at least one
/// must be present, and every question needs exactly 4 options with an
/// in-range correct index.
#[instrument(level = "info", skip(state), fields(%topic_id, difficulty = ?difficulty, question_count = question_count))]
pub async fn generate_quiz(
    state: &AppState,
    topic_id: &str,
    difficulty: Difficulty,
    question_count: usize,
) -> Result<Quiz, TutorError> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
        return Err(TutorError::Validation(format!(
            "question count must be between {MIN_QUESTIONS} and {MAX_QUESTIONS}, got {question_count}"
        )));
    }
    let topic = topic_by_id(topic_id)
        .ok_or_else(|| TutorError::NotFound { kind: "topic", id: topic_id.to_string() })?;

    let ai = state.openai.as_ref().ok_or(TutorError::AiUnavailable)?;
    let payload = ai
        .generate_quiz_payload(
            &state.prompts,
            topic.title,
            &stage_label(topic.stage),
            difficulty.as_str(),
            question_count,
        )
        .await
        .map_err(TutorError::Generation)?;

    if payload.title.trim().is_empty() || payload.questions.is_empty() {
        return Err(TutorError::Generation("quiz payload missing title or questions".into()));
    }
    for (i, q) in payload.questions.iter().enumerate() {
        if q.options.len() != 4 {
            return Err(TutorError::Generation(format!(
                "question {i} has {} options, expected 4",
                q.options.len()
            )));
        }
        if q.correct_answer >= q.options.len() {
            return Err(TutorError::Generation(format!(
                "question {i} has out-of-range correct index {}",
                q.correct_answer
            )));
        }
    }

    let quiz = Quiz {
        id: Uuid::new_v4().to_string(),
        topic: topic.id.to_string(),
        title: payload.title,
        difficulty,
        // One synthetic working-scientifically outcome derived from the stage.
        nesa_outcomes: vec![format!("SC{}-WS-01", topic.stage)],
        questions: payload.questions,
        created_at: Utc::now(),
    };
    state.store.insert_quiz(quiz.clone()).await;
    info!(target: "quiz", quiz_id = %quiz.id, topic = %quiz.topic, questions = quiz.questions.len(), "Quiz generated");
    Ok(quiz)
}

/// Compare every selected answer against the quiz, compute the score, and
/// persist the attempt. The answer map must cover every question index.
#[instrument(level = "info", skip(state, quiz, answers), fields(%student_id, quiz_id = %quiz.id))]
pub async fn submit_attempt(
    state: &AppState,
    student_id: &str,
    quiz: &Quiz,
    answers: &HashMap<usize, usize>,
) -> Result<AttemptResult, TutorError> {
    let (results, score, passed) = score_answers(quiz, answers)?;

    let attempt = QuizAttempt {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        quiz_id: quiz.id.clone(),
        answers: results.clone(),
        score,
        passed,
        nesa_outcomes: quiz.nesa_outcomes.clone(),
        created_at: Utc::now(),
    };
    state.store.insert_attempt(attempt.clone()).await;
    info!(target: "quiz", attempt_id = %attempt.id, score, passed, "Attempt submitted");

    Ok(AttemptResult { attempt_id: attempt.id, quiz: quiz.clone(), results, score, passed })
}

/// Pure scoring: `score = round(100 × correct / total)`, pass at 70.
pub fn score_answers(
    quiz: &Quiz,
    answers: &HashMap<usize, usize>,
) -> Result<(Vec<AnswerRecord>, u32, bool), TutorError> {
    let total = quiz.questions.len();
    if answers.len() != total {
        return Err(TutorError::Validation(format!(
            "expected {total} answers, got {}",
            answers.len()
        )));
    }

    let mut results = Vec::with_capacity(total);
    for (i, q) in quiz.questions.iter().enumerate() {
        let selected = *answers.get(&i).ok_or_else(|| {
            TutorError::Validation(format!("missing answer for question {i}"))
        })?;
        results.push(AnswerRecord {
            question: q.question.clone(),
            selected,
            correct: q.correct_answer,
            is_correct: selected == q.correct_answer,
            explanation: q.explanation.clone(),
        });
    }

    let correct = results.iter().filter(|r| r.is_correct).count();
    let score = ((correct as f64 / total as f64) * 100.0).round() as u32;
    Ok((results, score, score >= PASS_MARK))
}

/// Encouraging post-attempt feedback. Cosmetic: any failure degrades to a
/// fixed fallback string, never an error.
#[instrument(level = "info", skip(state, result), fields(score = result.score))]
pub async fn generate_feedback(state: &AppState, result: &AttemptResult) -> String {
    let correct = result.results.iter().filter(|r| r.is_correct).count();
    let missed: Vec<&str> = result
        .results
        .iter()
        .filter(|r| !r.is_correct)
        .map(|r| r.question.as_str())
        .collect();

    if let Some(ai) = &state.openai {
        match ai
            .attempt_feedback(
                &state.prompts,
                &result.quiz.topic,
                result.score,
                correct,
                result.results.len(),
                &missed.join("; "),
            )
            .await
        {
            Ok(text) => return text,
            Err(e) => {
                error!(target: "quiz", error = %e, "Feedback generation failed; using fallback");
            }
        }
    }
    state.prompts.feedback_fallback.clone()
}

/// Per-attempt administration state: `Selecting → Answering(i) → Submitted`.
///
/// Moving forward requires the current question to be answered; submission
/// requires every question answered. Backward navigation is always allowed.
/// `Submitted` is terminal.
#[derive(Debug)]
pub struct QuizRun {
    question_count: usize,
    current: usize,
    answers: HashMap<usize, usize>,
    submitted: bool,
}

impl QuizRun {
    pub fn new(question_count: usize) -> Self {
        Self { question_count, current: 0, answers: HashMap::new(), submitted: false }
    }

    pub fn current_question(&self) -> usize {
        self.current
    }

    pub fn answers(&self) -> &HashMap<usize, usize> {
        &self.answers
    }

    /// Record (or change) the answer for the current question.
    pub fn select(&mut self, option: usize) -> Result<(), TutorError> {
        if self.submitted {
            return Err(TutorError::Validation("attempt already submitted".into()));
        }
        if option >= 4 {
            return Err(TutorError::Validation(format!("option index {option} out of range")));
        }
        self.answers.insert(self.current, option);
        Ok(())
    }

    /// Advance; refused when the current question has no answer yet.
    pub fn next(&mut self) -> bool {
        if self.submitted
            || self.current + 1 >= self.question_count
            || !self.answers.contains_key(&self.current)
        {
            return false;
        }
        self.current += 1;
        true
    }

    /// Revisit the previous question; always allowed before submission.
    pub fn previous(&mut self) -> bool {
        if self.submitted || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn all_answered(&self) -> bool {
        (0..self.question_count).all(|i| self.answers.contains_key(&i))
    }

    /// Terminal transition; only legal once every question is answered.
    pub fn submit(&mut self) -> Result<(), TutorError> {
        if self.submitted {
            return Err(TutorError::Validation("attempt already submitted".into()));
        }
        if !self.all_answered() {
            return Err(TutorError::Validation("every question needs an answer before submitting".into()));
        }
        self.submitted = true;
        Ok(())
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuizQuestion;

    fn quiz_with_correct(correct: &[usize]) -> Quiz {
        Quiz {
            id: "q1".into(),
            topic: "forces".into(),
            title: "Forces".into(),
            difficulty: Difficulty::Intermediate,
            nesa_outcomes: vec!["SC4-WS-01".into()],
            questions: correct
                .iter()
                .enumerate()
                .map(|(i, &c)| QuizQuestion {
                    question: format!("Q{i}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: c,
                    explanation: format!("E{i}"),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    fn answer_map(selected: &[usize]) -> HashMap<usize, usize> {
        selected.iter().copied().enumerate().collect()
    }

    #[test]
    fn four_of_five_scores_eighty_and_passes() {
        let quiz = quiz_with_correct(&[0, 1, 2, 3, 0]);
        let (results, score, passed) =
            score_answers(&quiz, &answer_map(&[0, 1, 2, 3, 1])).expect("scored");
        assert_eq!(score, 80);
        assert!(passed);
        assert_eq!(results.iter().filter(|r| r.is_correct).count(), 4);
        assert!(!results[4].is_correct);
        assert_eq!(results[4].selected, 1);
        assert_eq!(results[4].correct, 0);
    }

    #[test]
    fn pass_mark_is_seventy_exactly() {
        // 10 questions at k correct gives score 10k; sweep the boundary.
        for k in 0..=10usize {
            let correct: Vec<usize> = vec![0; 10];
            let quiz = quiz_with_correct(&correct);
            let selected: Vec<usize> = (0..10).map(|i| if i < k { 0 } else { 1 }).collect();
            let (_, score, passed) = score_answers(&quiz, &answer_map(&selected)).expect("scored");
            assert_eq!(score as usize, k * 10);
            assert_eq!(passed, score >= 70, "k={k} score={score}");
        }
    }

    #[test]
    fn score_rounds_to_nearest_integer() {
        let quiz = quiz_with_correct(&[0, 0, 0]);
        let (_, score, _) = score_answers(&quiz, &answer_map(&[0, 1, 1])).expect("scored");
        assert_eq!(score, 33);
        let (_, score, _) = score_answers(&quiz, &answer_map(&[0, 0, 1])).expect("scored");
        assert_eq!(score, 67);
    }

    #[test]
    fn incomplete_answer_maps_are_rejected() {
        let quiz = quiz_with_correct(&[0, 1, 2]);
        let err = score_answers(&quiz, &answer_map(&[0, 1])).unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));

        // Right size but not covering every index.
        let mut skewed = HashMap::new();
        skewed.insert(0, 0);
        skewed.insert(1, 1);
        skewed.insert(5, 2);
        let err = score_answers(&quiz, &skewed).unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));
    }

    #[test]
    fn run_requires_answers_to_advance_and_submit() {
        let mut run = QuizRun::new(3);
        assert!(!run.next(), "cannot advance unanswered");
        run.select(2).expect("select");
        assert!(run.next());
        assert_eq!(run.current_question(), 1);

        // Backward is free, and earlier answers can be revised.
        assert!(run.previous());
        run.select(3).expect("revise");
        assert!(run.next());

        assert!(run.submit().is_err(), "cannot submit with gaps");
        run.select(0).expect("select");
        assert!(run.next());
        run.select(1).expect("select");
        assert!(!run.next(), "no question past the last");
        run.submit().expect("all answered");

        // Submitted is terminal.
        assert!(run.is_submitted());
        assert!(run.select(0).is_err());
        assert!(!run.next());
        assert!(!run.previous());
        assert!(run.submit().is_err());
    }

    #[test]
    fn run_rejects_out_of_range_options() {
        let mut run = QuizRun::new(1);
        assert!(run.select(4).is_err());
        run.select(3).expect("in range");
    }

    #[tokio::test]
    async fn submit_attempt_persists_for_student() {
        let state = crate::state::AppState::for_tests();
        let quiz = quiz_with_correct(&[0, 1, 2, 3, 0]);
        state.store.insert_quiz(quiz.clone()).await;
        let result = submit_attempt(&state, "stu-1", &quiz, &answer_map(&[0, 1, 2, 3, 1]))
            .await
            .expect("submitted");
        assert_eq!(result.score, 80);
        let attempts = state.store.attempts_for_student("stu-1", None).await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].answers.len(), 5);
        assert_eq!(attempts[0].nesa_outcomes, vec!["SC4-WS-01".to_string()]);
    }

    #[tokio::test]
    async fn feedback_falls_back_without_ai() {
        let state = crate::state::AppState::for_tests();
        let quiz = quiz_with_correct(&[0]);
        let (results, score, passed) = score_answers(&quiz, &answer_map(&[1])).expect("scored");
        let result = AttemptResult { attempt_id: "a".into(), quiz, results, score, passed };
        let text = generate_feedback(&state, &result).await;
        assert_eq!(text, state.prompts.feedback_fallback);
    }

    #[tokio::test]
    async fn generation_validates_count_and_topic_before_any_call() {
        let state = crate::state::AppState::for_tests();
        let err = generate_quiz(&state, "forces", Difficulty::Beginner, 2).await.unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));
        let err = generate_quiz(&state, "forces", Difficulty::Beginner, 11).await.unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));
        let err = generate_quiz(&state, "not-a-topic", Difficulty::Beginner, 5).await.unwrap_err();
        assert!(matches!(err, TutorError::NotFound { kind: "topic", .. }));
    }
}
