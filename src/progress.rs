//! Client-side progress aggregation: dashboard stats and per-outcome
//! progress, computed purely by reduction over the student's records.

use serde::Serialize;

use crate::domain::{ChatSession, QuizAttempt};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_chats: usize,
    pub quizzes_taken: usize,
    pub average_score: u32,
    /// Number of passed attempts.
    pub achievements: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct OutcomeProgress {
    pub code: String,
    pub name: String,
    /// Mean score across the attempts that exercised this outcome, 0-100.
    pub progress: u32,
    pub attempt_count: usize,
    pub stage: u8,
    pub category: &'static str,
}

/// Summary counters for the dashboard. Mean score rounds to the nearest
/// integer and is 0 when no attempts exist.
pub fn dashboard_stats(sessions: &[ChatSession], attempts: &[QuizAttempt]) -> DashboardStats {
    DashboardStats {
        total_chats: sessions.len(),
        quizzes_taken: attempts.len(),
        average_score: mean_score(attempts),
        achievements: attempts.iter().filter(|a| a.passed).count(),
    }
}

/// Per-outcome progress over the catalogue. Attempts count toward an outcome
/// only when they carry its code; an outcome nobody has exercised reports
/// progress 0 with no attempts.
pub fn outcome_progress(
    attempts: &[QuizAttempt],
    catalogue: &[(&str, &str)],
) -> Vec<OutcomeProgress> {
    catalogue
        .iter()
        .map(|&(code, name)| {
            let relevant: Vec<&QuizAttempt> = attempts
                .iter()
                .filter(|a| a.nesa_outcomes.iter().any(|c| c == code))
                .collect();
            let progress = if relevant.is_empty() {
                0
            } else {
                let sum: u32 = relevant.iter().map(|a| a.score).sum();
                ((sum as f64) / (relevant.len() as f64)).round() as u32
            };
            OutcomeProgress {
                code: code.to_string(),
                name: name.to_string(),
                progress,
                attempt_count: relevant.len(),
                stage: if code.starts_with("SC4") { 4 } else { 5 },
                category: if code.contains("-WS-") {
                    "Working Scientifically"
                } else {
                    "Content Focus Area"
                },
            }
        })
        .collect()
}

fn mean_score(attempts: &[QuizAttempt]) -> u32 {
    if attempts.is_empty() {
        return 0;
    }
    let sum: u32 = attempts.iter().map(|a| a.score).sum();
    ((sum as f64) / (attempts.len() as f64)).round() as u32
}
