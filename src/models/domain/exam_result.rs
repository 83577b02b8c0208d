use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubjectScore {
    pub correct: usize,
    pub attempted: usize,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamResult {
    pub id: String,
    pub user_id: String,
    pub exam_session_id: String,
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub score: f64,
    pub percentage: f64,
    pub subject_wise_score: HashMap<String, SubjectScore>,
    pub time_taken_minutes: i64,
    pub submitted_at: DateTime<Utc>,
}

impl ExamResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        exam_session_id: &str,
        total_questions: usize,
        attempted: usize,
        correct: usize,
        incorrect: usize,
        score: f64,
        percentage: f64,
        subject_wise_score: HashMap<String, SubjectScore>,
        time_taken_minutes: i64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        ExamResult {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            exam_session_id: exam_session_id.to_string(),
            total_questions,
            attempted,
            correct,
            incorrect,
            score,
            percentage,
            subject_wise_score,
            time_taken_minutes,
            submitted_at,
        }
    }
}
